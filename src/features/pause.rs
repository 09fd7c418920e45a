//! Pause pattern: count, total share, and mean length of low-power runs.

use super::{support, FeatureOutcome};
use crate::config::AnalysisConfig;
use crate::types::Waveform;

const WINDOW_SECONDS: f64 = 0.025;
const HOP_SECONDS: f64 = 0.010;

const COUNT_WEIGHT: f64 = 0.4;
const SHARE_WEIGHT: f64 = 0.3;
const LENGTH_WEIGHT: f64 = 0.3;

/// A contiguous low-power interval, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Pause {
    pub start: f64,
    pub end: f64,
}

impl Pause {
    fn length(&self) -> f64 {
        self.end - self.start
    }
}

pub(crate) fn compare(
    reference: &Waveform,
    learner: &Waveform,
    config: &AnalysisConfig,
) -> FeatureOutcome {
    let reference_pauses = match detect_pauses(reference, config) {
        Some(pauses) => pauses,
        None => return FeatureOutcome::failed("reference signal is silent"),
    };
    let learner_pauses = match detect_pauses(learner, config) {
        Some(pauses) => pauses,
        None => return FeatureOutcome::failed("learner signal is silent"),
    };

    let count_similarity = if reference_pauses.is_empty() || learner_pauses.is_empty() {
        0.0
    } else {
        let (smaller, larger) = if reference_pauses.len() <= learner_pauses.len() {
            (reference_pauses.len(), learner_pauses.len())
        } else {
            (learner_pauses.len(), reference_pauses.len())
        };
        smaller as f64 / larger as f64
    };

    let reference_share = total_length(&reference_pauses) / reference.duration();
    let learner_share = total_length(&learner_pauses) / learner.duration();
    let share_gap = (reference_share - learner_share).abs();

    let length_gap = (mean_length(&reference_pauses) - mean_length(&learner_pauses)).abs();

    let raw = 100.0
        * (COUNT_WEIGHT * count_similarity
            + SHARE_WEIGHT * (1.0 - share_gap.min(1.0))
            + LENGTH_WEIGHT * (1.0 - length_gap.min(1.0)));
    FeatureOutcome::from_raw(raw)
}

/// Pauses: runs of frames below the silence floor (dB relative to the
/// signal's peak frame) lasting at least the configured minimum. Runs
/// touching either edge count. `None` when the whole signal is silent.
pub(crate) fn detect_pauses(wave: &Waveform, config: &AnalysisConfig) -> Option<Vec<Pause>> {
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

    let mut pauses = Vec::new();
    let mut run_start: Option<usize> = None;
    for (index, &value) in envelope.iter().enumerate() {
        let level_db = 20.0 * (value.max(f64::MIN_POSITIVE) / peak).log10();
        if level_db < config.silence_floor_db {
            run_start.get_or_insert(index);
        } else if let Some(start) = run_start.take() {
            push_if_long_enough(&mut pauses, start, index, config.min_pause_seconds);
        }
    }
    if let Some(start) = run_start {
        push_if_long_enough(&mut pauses, start, envelope.len(), config.min_pause_seconds);
    }
    Some(pauses)
}

fn push_if_long_enough(pauses: &mut Vec<Pause>, start: usize, end: usize, min_seconds: f64) {
    let pause = Pause {
        start: start as f64 * HOP_SECONDS,
        end: end as f64 * HOP_SECONDS,
    };
    if pause.length() >= min_seconds {
        pauses.push(pause);
    }
}

fn total_length(pauses: &[Pause]) -> f64 {
    pauses.iter().map(Pause::length).sum()
}

fn mean_length(pauses: &[Pause]) -> f64 {
    if pauses.is_empty() {
        return 0.0;
    }
    total_length(pauses) / pauses.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tone with silent gaps at the given spans (seconds).
    fn gapped_wave(seconds: f64, gaps: &[(f64, f64)]) -> Waveform {
        let rate = 16_000;
        let n = (rate as f64 * seconds) as usize;
        let samples: Vec<f32> = (0..n)
            .map(|i| {
                let t = i as f64 / rate as f64;
                if gaps.iter().any(|&(start, end)| t >= start && t < end) {
                    0.0
                } else {
                    ((2.0 * std::f64::consts::PI * 200.0 * t).sin() * 0.5) as f32
                }
            })
            .collect();
        Waveform::new(samples, rate).unwrap()
    }

    #[test]
    fn detects_a_mid_signal_pause() {
        let wave = gapped_wave(2.0, &[(0.9, 1.3)]);
        let pauses = detect_pauses(&wave, &AnalysisConfig::default()).unwrap();
        assert_eq!(pauses.len(), 1);
        assert!((pauses[0].start - 0.9).abs() < 0.05);
        assert!((pauses[0].end - 1.3).abs() < 0.05);
    }

    #[test]
    fn short_gaps_are_not_pauses() {
        let wave = gapped_wave(2.0, &[(1.0, 1.1)]);
        let pauses = detect_pauses(&wave, &AnalysisConfig::default()).unwrap();
        assert!(pauses.is_empty());
    }

    #[test]
    fn identical_pause_patterns_score_one_hundred() {
        let wave = gapped_wave(2.0, &[(0.9, 1.2)]);
        let outcome = compare(&wave, &wave, &AnalysisConfig::default());
        assert!((outcome.score() - 100.0).abs() < 1e-9, "{outcome:?}");
    }

    #[test]
    fn missing_pause_costs_the_count_term() {
        let reference = gapped_wave(2.0, &[(0.9, 1.2)]);
        let learner = gapped_wave(2.0, &[]);
        let outcome = compare(&reference, &learner, &AnalysisConfig::default());
        assert!(outcome.score() < 100.0);
        // No pauses on one side zeroes the count term entirely.
        assert!(outcome.score() <= 60.0 + 1e-9, "score {}", outcome.score());
    }

    #[test]
    fn silent_signal_degrades() {
        let silence = Waveform::new(vec![0.0; 32_000], 16_000).unwrap();
        let speech = gapped_wave(2.0, &[]);
        assert!(matches!(
            compare(&speech, &silence, &AnalysisConfig::default()),
            FeatureOutcome::Failed { .. }
        ));
    }
}
