//! Intonation: normalized pitch contour shape compared under DTW, plus a
//! contour-change-magnitude term.

use super::{support, FeatureOutcome};
use crate::acoustic::{AcousticAnalyzer, PitchTrace};
use crate::align;
use crate::types::Waveform;

const MIN_HZ: f64 = 75.0;
const MAX_HZ: f64 = 600.0;
const TRACE_STEP_SECONDS: f64 = 0.01;
/// Sampling points across each signal's interior.
const CONTOUR_POINTS: usize = 100;
/// Trimmed from each end before sampling.
const EDGE_SECONDS: f64 = 0.1;
const RANGE_EPSILON: f64 = 1e-6;

const SHAPE_WEIGHT: f64 = 0.7;
const CHANGE_WEIGHT: f64 = 0.3;

pub(crate) fn compare(
    reference: &Waveform,
    learner: &Waveform,
    analyzer: &dyn AcousticAnalyzer,
) -> FeatureOutcome {
    let reference_contour = match contour(reference, analyzer) {
        Ok(contour) => contour,
        Err(reason) => return FeatureOutcome::failed(format!("reference contour: {reason}")),
    };
    let learner_contour = match contour(learner, analyzer) {
        Ok(contour) => contour,
        Err(reason) => return FeatureOutcome::failed(format!("learner contour: {reason}")),
    };

    let common_len = reference_contour.len().min(learner_contour.len());
    if common_len < 2 {
        return FeatureOutcome::failed("contour overlap shorter than two points");
    }
    let reference_contour = &reference_contour[..common_len];
    let learner_contour = &learner_contour[..common_len];

    let alignment = match align::align_series(reference_contour, learner_contour) {
        Ok(alignment) => alignment,
        Err(err) => return FeatureOutcome::failed(format!("contour alignment: {err:#}")),
    };

    let reference_change = support::std_dev(&support::first_differences(reference_contour));
    let learner_change = support::std_dev(&support::first_differences(learner_contour));
    let change_penalty =
        (reference_change - learner_change).abs() / reference_change.max(RANGE_EPSILON);

    let penalty =
        SHAPE_WEIGHT * alignment.normalized().min(1.0) + CHANGE_WEIGHT * change_penalty;
    FeatureOutcome::from_raw(100.0 * (1.0 - penalty))
}

/// Min-max scaled pitch contour over the signal interior. Unvoiced
/// sampling points are dropped before scaling, mirroring how the trace
/// statistics treat undefined frames.
fn contour(wave: &Waveform, analyzer: &dyn AcousticAnalyzer) -> Result<Vec<f64>, String> {
    let duration = wave.duration();
    if duration <= 2.0 * EDGE_SECONDS {
        return Err("signal too short for a trimmed contour".to_string());
    }
    let trace: PitchTrace = analyzer
        .track_pitch(wave, MIN_HZ, MAX_HZ, TRACE_STEP_SECONDS)
        .map_err(|err| format!("pitch tracking: {err:#}"))?;

    let start = EDGE_SECONDS;
    let end = duration - EDGE_SECONDS;
    let mut values = Vec::with_capacity(CONTOUR_POINTS);
    for i in 0..CONTOUR_POINTS {
        let t = start + (end - start) * i as f64 / (CONTOUR_POINTS - 1) as f64;
        if let Some(value) = trace.value_at(t) {
            values.push(value);
        }
    }
    if values.len() < 2 {
        return Err("fewer than two voiced contour points".to_string());
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let range = support::value_range(&values);
    Ok(values
        .iter()
        .map(|v| (v - min) / (range + RANGE_EPSILON))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acoustic::SyntheticAnalyzer;
    use approx::assert_relative_eq;

    fn wave(seconds: f64) -> Waveform {
        Waveform::new(vec![0.2; (16_000.0 * seconds) as usize], 16_000).unwrap()
    }

    fn rising(from: f64, to: f64, frames: usize) -> Vec<Option<f64>> {
        (0..frames)
            .map(|i| Some(from + (to - from) * i as f64 / (frames - 1) as f64))
            .collect()
    }

    #[test]
    fn identical_contours_score_one_hundred() {
        let analyzer = SyntheticAnalyzer::new().with_pitch(1.0, rising(120.0, 240.0, 100));
        let outcome = compare(&wave(1.0), &wave(1.0), &analyzer);
        assert_relative_eq!(outcome.score(), 100.0, epsilon = 1e-6);
    }

    #[test]
    fn same_shape_at_an_octave_still_matches() {
        // Min-max scaling removes register, keeping only contour shape.
        let analyzer = SyntheticAnalyzer::new()
            .with_pitch(1.0, rising(120.0, 240.0, 100))
            .with_pitch(2.0, rising(240.0, 480.0, 200));
        let outcome = compare(&wave(1.0), &wave(2.0), &analyzer);
        assert!(outcome.score() > 95.0, "score {}", outcome.score());
    }

    #[test]
    fn opposite_contour_is_penalized() {
        let analyzer = SyntheticAnalyzer::new()
            .with_pitch(1.0, rising(120.0, 240.0, 100))
            .with_pitch(2.0, rising(240.0, 120.0, 200));
        let outcome = compare(&wave(1.0), &wave(2.0), &analyzer);
        assert!(outcome.score() < 90.0, "score {}", outcome.score());
    }

    #[test]
    fn unvoiced_signal_scores_zero() {
        let analyzer = SyntheticAnalyzer::new()
            .with_pitch(1.0, rising(120.0, 240.0, 100))
            .with_pitch(2.0, vec![None; 200]);
        let outcome = compare(&wave(1.0), &wave(2.0), &analyzer);
        assert_eq!(outcome.score(), 0.0);
        assert!(matches!(outcome, FeatureOutcome::Failed { .. }));
    }
}
