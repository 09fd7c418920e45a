//! Pitch statistics: mean, spread, and range of the voiced F0 trace.

use super::{support, FeatureOutcome};
use crate::acoustic::AcousticAnalyzer;
use crate::types::Waveform;

const MIN_HZ: f64 = 75.0;
const MAX_HZ: f64 = 600.0;
const STEP_SECONDS: f64 = 0.01;

const MEAN_WEIGHT: f64 = 0.4;
const STD_WEIGHT: f64 = 0.3;
const RANGE_WEIGHT: f64 = 0.3;

pub(crate) fn compare(
    reference: &Waveform,
    learner: &Waveform,
    analyzer: &dyn AcousticAnalyzer,
) -> FeatureOutcome {
    let reference_voiced = match analyzer.track_pitch(reference, MIN_HZ, MAX_HZ, STEP_SECONDS) {
        Ok(trace) => trace.voiced(),
        Err(err) => return FeatureOutcome::failed(format!("reference pitch tracking: {err:#}")),
    };
    let learner_voiced = match analyzer.track_pitch(learner, MIN_HZ, MAX_HZ, STEP_SECONDS) {
        Ok(trace) => trace.voiced(),
        Err(err) => return FeatureOutcome::failed(format!("learner pitch tracking: {err:#}")),
    };

    if reference_voiced.is_empty() {
        return FeatureOutcome::failed("reference has no voiced frames");
    }
    if learner_voiced.is_empty() {
        return FeatureOutcome::failed("learner has no voiced frames");
    }

    let penalty = MEAN_WEIGHT
        * support::rel_diff(
            support::mean(&learner_voiced),
            support::mean(&reference_voiced),
        )
        + STD_WEIGHT
            * support::rel_diff(
                support::std_dev(&learner_voiced),
                support::std_dev(&reference_voiced),
            )
        + RANGE_WEIGHT
            * support::rel_diff(
                support::value_range(&learner_voiced),
                support::value_range(&reference_voiced),
            );
    FeatureOutcome::from_raw(100.0 * (1.0 - penalty))
}
