//! End-to-end scoring scenarios over synthetic utterances.
//!
//! The fixture is a voiced, syllable-structured signal defined
//! analytically, so the same utterance can be rendered at any sample rate
//! or tempo. Denoising is off throughout: these tests pin exact scoring
//! behavior, and identity comparisons should be bit-exact.

use accentor::features::Feature;
use accentor::{AnalysisConfig, AudioData, Engine, NoiseReduction};

const HARMONIC_AMPS: [f64; 4] = [1.0, 0.6, 0.4, 0.25];

/// Syllable-structured harmonic utterance. With `with_pause`, a long
/// silent gap follows the fourth syllable; the inter-syllable gaps are
/// otherwise too short to register as pauses. `stretch` scales time
/// without changing pitch.
fn utterance(rate: u32, stretch: f64, with_pause: bool) -> AudioData {
    let mut syllables = vec![
        (0.10, 0.22),
        (0.35, 0.47),
        (0.60, 0.72),
        (0.85, 0.97),
    ];
    let shift = if with_pause { 0.0 } else { -0.27 };
    syllables.push((1.37 + shift, 1.49 + shift));
    syllables.push((1.62 + shift, 1.74 + shift));
    let seconds = if with_pause { 1.9 } else { 1.63 };

    let n = (rate as f64 * seconds * stretch) as usize;
    let dt = 1.0 / rate as f64;
    let mut phases = [0.0_f64; 4];
    let mut samples = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as f64 * dt;
        let u = t / stretch; // unstretched time drives pitch and envelope

        let envelope = syllables
            .iter()
            .find(|&&(start, end)| u >= start && u < end)
            .map(|&(start, end)| (std::f64::consts::PI * (u - start) / (end - start)).sin())
            .unwrap_or(0.0);

        let f0 = 115.0 + 25.0 * (2.0 * std::f64::consts::PI * 0.7 * u).sin();
        let mut voiced = 0.0;
        for (k, phase) in phases.iter_mut().enumerate() {
            *phase += 2.0 * std::f64::consts::PI * (k + 1) as f64 * f0 * dt;
            voiced += HARMONIC_AMPS[k] * phase.sin();
        }
        // Faint deterministic aspiration so the spectrum is not a bare
        // line spectrum.
        let state = (i as u64)
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let aspiration = ((state >> 33) as f64 / (1u64 << 31) as f64 - 0.5) * 0.06;

        samples.push(((voiced + aspiration) * envelope * 0.35) as f32);
    }
    AudioData {
        samples,
        sample_rate: rate,
    }
}

fn silence(rate: u32, seconds: f64) -> AudioData {
    AudioData {
        samples: vec![0.0; (rate as f64 * seconds) as usize],
        sample_rate: rate,
    }
}

fn engine() -> Engine {
    Engine::new(AnalysisConfig {
        noise_reduction: NoiseReduction::Off,
        ..AnalysisConfig::default()
    })
}

#[test]
fn identical_recordings_score_near_perfect() {
    let result = engine()
        .analyze(utterance(16_000, 1.0, true), utterance(16_000, 1.0, true))
        .unwrap();
    for feature in Feature::ALL {
        let score = result.scores.get(feature);
        assert!(
            score > 99.0,
            "{} scored {score:.2} on identical input: {:?}",
            feature.name(),
            result.degraded
        );
    }
    assert!(result.composite > 99.0, "composite {}", result.composite);
}

#[test]
fn all_scores_stay_in_bounds() {
    let result = engine()
        .analyze(utterance(16_000, 1.0, true), utterance(16_000, 1.4, false))
        .unwrap();
    for feature in Feature::ALL {
        let score = result.scores.get(feature);
        assert!((0.0..=100.0).contains(&score), "{feature:?} = {score}");
    }
    assert!((0.0..=100.0).contains(&result.composite));
}

#[test]
fn silent_learner_zeroes_the_voice_dependent_dimensions() {
    let result = engine()
        .analyze(utterance(16_000, 1.0, true), silence(16_000, 1.9))
        .unwrap();
    assert_eq!(result.scores.pitch, 0.0, "pitch: {:?}", result.degraded);
    assert_eq!(result.scores.formant, 0.0, "formant: {:?}", result.degraded);
    assert!(
        result.composite < 20.0,
        "composite {} too generous for silence",
        result.composite
    );
    assert!(!result.degraded.is_empty());
}

#[test]
fn time_stretched_learner_loses_speech_rate_but_not_everything() {
    let result = engine()
        .analyze(
            utterance(16_000, 1.0, true),
            utterance(16_000, 1.5, true),
        )
        .unwrap();
    assert!(
        result.scores.speed < 80.0,
        "speed {} should reflect the 1.5x tempo gap",
        result.scores.speed
    );
    // Alignment-based dimensions degrade gracefully rather than collapsing.
    assert!(result.scores.mfcc > 40.0, "mfcc {}", result.scores.mfcc);
    assert!(result.scores.energy > 40.0, "energy {}", result.scores.energy);
    assert!(
        result.composite > 40.0 && result.composite < 100.0,
        "composite {}",
        result.composite
    );
}

#[test]
fn missing_pause_lowers_the_pause_score_only() {
    let reference = utterance(16_000, 1.0, true);
    let learner = utterance(16_000, 1.0, false);
    let result = engine().analyze(reference, learner).unwrap();
    assert!(
        result.scores.pause <= 61.0,
        "pause {} should drop without the long gap",
        result.scores.pause
    );
    assert!(result.scores.pitch > 90.0, "pitch {}", result.scores.pitch);
    assert!(
        result.scores.formant > 85.0,
        "formant {}",
        result.scores.formant
    );
}

#[test]
fn sample_rate_differences_wash_out_in_preprocessing() {
    let same_rate = engine()
        .analyze(utterance(16_000, 1.0, true), utterance(16_000, 1.0, true))
        .unwrap();
    let cross_rate = engine()
        .analyze(utterance(16_000, 1.0, true), utterance(44_100, 1.0, true))
        .unwrap();
    let gap = (same_rate.composite - cross_rate.composite).abs();
    assert!(
        gap < 2.0,
        "composites diverged by {gap:.2} across sample rates"
    );
}

#[test]
fn swapping_reference_and_learner_is_not_symmetric() {
    let a = utterance(16_000, 1.0, true);
    let b = utterance(16_000, 1.5, true);
    let forward = engine().analyze(a.clone(), b.clone()).unwrap();
    let reverse = engine().analyze(b, a).unwrap();
    // Several formulas normalize against the reference's own statistics,
    // so direction matters; the speed term makes this visible.
    assert!(
        (forward.scores.speed - reverse.scores.speed).abs() > 1.0,
        "speed {} vs {}",
        forward.scores.speed,
        reverse.scores.speed
    );
}

#[test]
fn zero_length_reference_is_fatal() {
    let err = engine()
        .analyze(silence(16_000, 0.0), utterance(16_000, 1.0, true))
        .unwrap_err();
    assert!(err.to_string().contains("reference"));
}
