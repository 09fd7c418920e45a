//! Formant quality: mean F1-F3 and the F2/F1 vowel-space ratio, compared
//! over the overlapping interior of both signals.

use super::{support, FeatureOutcome};
use crate::acoustic::{AcousticAnalyzer, FormantTracks};
use crate::types::Waveform;

/// Formants requested from the provider; only the first three are scored.
const TRACKED_FORMANTS: usize = 5;
const CEILING_HZ: f64 = 5_500.0;
const WINDOW_SECONDS: f64 = 0.025;
const STEP_SECONDS: f64 = 0.01;
/// Trimmed from each end to avoid boundary artifacts.
const EDGE_SECONDS: f64 = 0.1;

const F1_WEIGHT: f64 = 0.3;
const F2_WEIGHT: f64 = 0.3;
const F3_WEIGHT: f64 = 0.2;
const RATIO_WEIGHT: f64 = 0.2;

pub(crate) fn compare(
    reference: &Waveform,
    learner: &Waveform,
    analyzer: &dyn AcousticAnalyzer,
) -> FeatureOutcome {
    let overlap = reference.duration().min(learner.duration());
    if overlap <= 2.0 * EDGE_SECONDS {
        return FeatureOutcome::failed("signals too short for trimmed formant comparison");
    }

    let reference_tracks = match analyzer.track_formants(
        reference,
        TRACKED_FORMANTS,
        CEILING_HZ,
        WINDOW_SECONDS,
        STEP_SECONDS,
    ) {
        Ok(tracks) => tracks,
        Err(err) => return FeatureOutcome::failed(format!("reference formants: {err:#}")),
    };
    let learner_tracks = match analyzer.track_formants(
        learner,
        TRACKED_FORMANTS,
        CEILING_HZ,
        WINDOW_SECONDS,
        STEP_SECONDS,
    ) {
        Ok(tracks) => tracks,
        Err(err) => return FeatureOutcome::failed(format!("learner formants: {err:#}")),
    };

    let reference_means = match mean_formants(&reference_tracks, overlap) {
        Some(means) => means,
        None => return FeatureOutcome::failed("reference formant trace is empty"),
    };
    let learner_means = match mean_formants(&learner_tracks, overlap) {
        Some(means) => means,
        None => return FeatureOutcome::failed("learner formant trace is empty"),
    };

    let reference_ratio = reference_means[1] / reference_means[0].max(support::EPSILON);
    let learner_ratio = learner_means[1] / learner_means[0].max(support::EPSILON);

    let penalty = F1_WEIGHT * support::rel_diff(learner_means[0], reference_means[0])
        + F2_WEIGHT * support::rel_diff(learner_means[1], reference_means[1])
        + F3_WEIGHT * support::rel_diff(learner_means[2], reference_means[2])
        + RATIO_WEIGHT * support::rel_diff(learner_ratio, reference_ratio);
    FeatureOutcome::from_raw(100.0 * (1.0 - penalty))
}

/// Mean F1..F3 over the trimmed overlap, or `None` if any track has no
/// defined samples there.
fn mean_formants(tracks: &FormantTracks, overlap: f64) -> Option<[f64; 3]> {
    let mut means = [0.0; 3];
    for (index, mean) in means.iter_mut().enumerate() {
        let mut values = Vec::new();
        let mut t = EDGE_SECONDS;
        while t < overlap - EDGE_SECONDS {
            if let Some(value) = tracks.value_at(index + 1, t) {
                values.push(value);
            }
            t += STEP_SECONDS;
        }
        if values.is_empty() {
            return None;
        }
        *mean = support::mean(&values);
    }
    Some(means)
}
