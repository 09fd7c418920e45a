//! Energy similarity: RMS envelope statistics plus an aligned envelope
//! distance.

use super::{support, FeatureOutcome};
use crate::align;
use crate::types::Waveform;

const WINDOW_SECONDS: f64 = 0.025;
const HOP_SECONDS: f64 = 0.010;

const MEAN_WEIGHT: f64 = 0.3;
const STD_WEIGHT: f64 = 0.3;
const SHAPE_WEIGHT: f64 = 0.4;
/// DTW distance saturates at this value before weighting.
const SHAPE_CEILING: f64 = 2.0;

pub(crate) fn compare(reference: &Waveform, learner: &Waveform) -> FeatureOutcome {
    let reference_envelope = support::rms_envelope(
        reference.samples(),
        reference.sample_rate(),
        WINDOW_SECONDS,
        HOP_SECONDS,
    );
    let learner_envelope = support::rms_envelope(
        learner.samples(),
        learner.sample_rate(),
        WINDOW_SECONDS,
        HOP_SECONDS,
    );

    let common_len = reference_envelope.len().min(learner_envelope.len());
    if common_len == 0 {
        return FeatureOutcome::failed("empty energy envelope");
    }

    let reference_mean = support::mean(&reference_envelope);
    let reference_std = support::std_dev(&reference_envelope);
    let learner_mean = support::mean(&learner_envelope);
    let learner_std = support::std_dev(&learner_envelope);

    // Bring both envelopes to the shorter length so the alignment cost is
    // about shape, not duration.
    let reference_resampled = support::interpolate_to_len(&reference_envelope, common_len);
    let learner_resampled = support::interpolate_to_len(&learner_envelope, common_len);

    let alignment = match align::align_series(&reference_resampled, &learner_resampled) {
        Ok(alignment) => alignment,
        Err(err) => return FeatureOutcome::failed(format!("envelope alignment: {err:#}")),
    };

    let penalty = MEAN_WEIGHT * support::rel_diff(learner_mean, reference_mean)
        + STD_WEIGHT * support::rel_diff(learner_std, reference_std)
        + SHAPE_WEIGHT * (alignment.normalized() / SHAPE_CEILING).min(1.0);
    FeatureOutcome::from_raw(100.0 * (1.0 - penalty))
}
