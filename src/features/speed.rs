//! Speech rate: syllable-nucleus proxy peaks per second.

use super::{support, FeatureOutcome};
use crate::types::Waveform;

/// Envelope smoothing window, seconds.
const SMOOTH_SECONDS: f64 = 0.02;
/// Minimum envelope height for a peak to count as a nucleus.
const MIN_PEAK_HEIGHT: f64 = 0.05;
/// Minimum spacing between nuclei, seconds.
const MIN_PEAK_SPACING: f64 = 0.05;

pub(crate) fn compare(reference: &Waveform, learner: &Waveform) -> FeatureOutcome {
    let reference_rate = syllable_rate(reference);
    let learner_rate = syllable_rate(learner);
    if reference_rate <= 0.0 {
        return FeatureOutcome::failed("no syllable nuclei detected in reference");
    }
    let penalty = ((reference_rate - learner_rate).abs() / reference_rate).min(1.0);
    FeatureOutcome::from_raw(100.0 * (1.0 - penalty))
}

/// Detected nuclei per second.
fn syllable_rate(wave: &Waveform) -> f64 {
    let magnitude: Vec<f64> = wave.samples().iter().map(|&s| s.abs() as f64).collect();
    let window = ((SMOOTH_SECONDS * wave.sample_rate() as f64) as usize).max(1);
    let envelope = support::moving_average(&magnitude, window);
    let spacing = ((MIN_PEAK_SPACING * wave.sample_rate() as f64) as usize).max(1);
    let peaks = support::find_peaks(&envelope, Some(MIN_PEAK_HEIGHT), spacing);
    peaks.len() as f64 / wave.duration()
}
