//! Rhythm: periodicity of the energy envelope, compared through envelope
//! autocorrelation shape and inter-peak spacing consistency.

use super::{support, FeatureOutcome};
use crate::types::Waveform;

const WINDOW_SECONDS: f64 = 0.025;
const HOP_SECONDS: f64 = 0.010;
/// Minimum autocorrelation peak spacing, in envelope frames.
const PEAK_SPACING_FRAMES: usize = 10;

const SHAPE_WEIGHT: f64 = 0.6;
const CONSISTENCY_WEIGHT: f64 = 0.4;

pub(crate) fn compare(reference: &Waveform, learner: &Waveform) -> FeatureOutcome {
    let reference_ac = match envelope_autocorrelation(reference) {
        Some(ac) => ac,
        None => return FeatureOutcome::failed("reference envelope is silent"),
    };
    let learner_ac = match envelope_autocorrelation(learner) {
        Some(ac) => ac,
        None => return FeatureOutcome::failed("learner envelope is silent"),
    };

    let common_len = reference_ac.len().min(learner_ac.len());
    if common_len == 0 {
        return FeatureOutcome::failed("empty autocorrelation overlap");
    }
    let reference_ac = &reference_ac[..common_len];
    let learner_ac = &learner_ac[..common_len];

    let similarity = match support::cosine_similarity(reference_ac, learner_ac) {
        Some(similarity) => similarity.clamp(0.0, 1.0),
        None => return FeatureOutcome::failed("degenerate autocorrelation vector"),
    };

    let consistency_gap =
        (spacing_variation(reference_ac) - spacing_variation(learner_ac)).abs();
    let raw = 100.0
        * (SHAPE_WEIGHT * similarity + CONSISTENCY_WEIGHT * (1.0 - consistency_gap.min(1.0)));
    FeatureOutcome::from_raw(raw)
}

/// Non-negative-lag autocorrelation of the peak-normalized RMS envelope;
/// `None` when the signal is silent.
fn envelope_autocorrelation(wave: &Waveform) -> Option<Vec<f64>> {
    let envelope = support::rms_envelope(
        wave.samples(),
        wave.sample_rate(),
        WINDOW_SECONDS,
        HOP_SECONDS,
    );
    let peak = envelope.iter().cloned().fold(0.0_f64, f64::max);
    if peak <= support::EPSILON {
        return None;
    }
    let normalized: Vec<f64> = envelope.iter().map(|v| v / peak).collect();
    Some(support::autocorrelation(&normalized))
}

/// Coefficient of variation of inter-peak spacing. Fewer than two peaks
/// means there is no rhythmic period to speak of: maximally inconsistent
/// by definition, not an error.
fn spacing_variation(autocorrelation: &[f64]) -> f64 {
    let peaks = support::find_peaks(autocorrelation, None, PEAK_SPACING_FRAMES);
    if peaks.len() < 2 {
        return 1.0;
    }
    let spacings: Vec<f64> = peaks
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) as f64)
        .collect();
    support::std_dev(&spacings) / support::mean(&spacings).max(support::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulsed_wave(pulse_hz: f64, seconds: f64) -> Waveform {
        let rate = 16_000;
        let n = (rate as f64 * seconds) as usize;
        let samples: Vec<f32> = (0..n)
            .map(|i| {
                let t = i as f64 / rate as f64;
                let gate = if (2.0 * std::f64::consts::PI * pulse_hz * t).sin() > 0.0 {
                    1.0
                } else {
                    0.0
                };
                ((2.0 * std::f64::consts::PI * 220.0 * t).sin() * gate * 0.5) as f32
            })
            .collect();
        Waveform::new(samples, rate).unwrap()
    }

    #[test]
    fn identical_rhythm_scores_one_hundred() {
        let wave = pulsed_wave(4.0, 2.0);
        let outcome = compare(&wave, &wave);
        assert!((outcome.score() - 100.0).abs() < 1e-9, "{outcome:?}");
    }

    #[test]
    fn unpulsed_learner_scores_lower() {
        let reference = pulsed_wave(4.0, 2.0);
        // A steady tone has no envelope periodicity at all.
        let steady: Vec<f32> = (0..32_000)
            .map(|i| ((2.0 * std::f64::consts::PI * 220.0 * i as f64 / 16_000.0).sin() * 0.5) as f32)
            .collect();
        let learner = Waveform::new(steady, 16_000).unwrap();
        let outcome = compare(&reference, &learner);
        assert!(outcome.score() < 90.0, "score {}", outcome.score());
    }

    #[test]
    fn silent_learner_degrades() {
        let reference = pulsed_wave(4.0, 2.0);
        let learner = Waveform::new(vec![0.0; 32_000], 16_000).unwrap();
        assert!(matches!(
            compare(&reference, &learner),
            FeatureOutcome::Failed { .. }
        ));
    }

    #[test]
    fn sparse_peaks_mean_maximal_inconsistency() {
        assert_eq!(spacing_variation(&[1.0, 0.5, 0.2]), 1.0);
    }
}
