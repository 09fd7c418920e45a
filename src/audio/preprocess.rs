//! The preprocessor: turns a raw (reference, learner) pair into two
//! immutable waveforms at a common sample rate, optionally high-pass
//! filtered and denoised. Everything downstream assumes its output.

use tracing::debug;

use crate::audio::{denoise, filter, resample};
use crate::config::{AnalysisConfig, NoiseReduction};
use crate::types::{AudioData, InvalidAudioError, Waveform};

/// Preprocess the pair. The learner is resampled to the reference rate
/// when the rates differ; both signals then receive the same filter and
/// denoise passes. Empty or unusable input is fatal.
pub fn prepare(
    reference: AudioData,
    learner: AudioData,
    config: &AnalysisConfig,
) -> Result<(Waveform, Waveform), InvalidAudioError> {
    validate(&reference, "reference")?;
    validate(&learner, "learner")?;

    let target_rate = reference.sample_rate;
    let learner_samples = if learner.sample_rate != target_rate {
        debug!(
            from = learner.sample_rate,
            to = target_rate,
            "resampling learner to reference rate"
        );
        resample::linear_resample(&learner.samples, learner.sample_rate, target_rate)
            .map_err(|err| InvalidAudioError::new(format!("resampling failed: {err}")))?
    } else {
        learner.samples
    };

    let reference_samples = condition(reference.samples, target_rate, config);
    let learner_samples = condition(learner_samples, target_rate, config);

    let reference = Waveform::new(reference_samples, target_rate)?;
    let learner = Waveform::new(learner_samples, target_rate)?;
    debug!(
        reference_seconds = reference.duration(),
        learner_seconds = learner.duration(),
        rate = target_rate,
        "preprocessing complete"
    );
    Ok((reference, learner))
}

fn validate(audio: &AudioData, label: &str) -> Result<(), InvalidAudioError> {
    if audio.sample_rate == 0 {
        return Err(InvalidAudioError::new(format!(
            "{label} audio reports a zero sample rate"
        )));
    }
    if audio.samples.is_empty() {
        return Err(InvalidAudioError::new(format!(
            "{label} audio is empty"
        )));
    }
    Ok(())
}

fn condition(samples: Vec<f32>, sample_rate: u32, config: &AnalysisConfig) -> Vec<f32> {
    let samples = match config.high_pass_hz {
        Some(cutoff) => {
            debug!(cutoff, "applying high-pass filter");
            filter::high_pass(&samples, sample_rate, cutoff)
        }
        None => samples,
    };
    match config.noise_reduction {
        NoiseReduction::Off => samples,
        NoiseReduction::Wiener => denoise::wiener(&samples),
        NoiseReduction::NoiseGate => denoise::noise_gate(&samples, sample_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(samples: Vec<f32>, sample_rate: u32) -> AudioData {
        AudioData {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn empty_learner_is_fatal() {
        let config = AnalysisConfig::default();
        let err = prepare(
            audio(vec![0.1; 1_000], 16_000),
            audio(Vec::new(), 16_000),
            &config,
        )
        .unwrap_err();
        assert!(err.to_string().contains("learner"));
    }

    #[test]
    fn mismatched_rates_converge_on_reference_rate() {
        let config = AnalysisConfig {
            noise_reduction: NoiseReduction::Off,
            ..AnalysisConfig::default()
        };
        let (reference, learner) = prepare(
            audio(vec![0.1; 16_000], 16_000),
            audio(vec![0.1; 44_100], 44_100),
            &config,
        )
        .unwrap();
        assert_eq!(reference.sample_rate(), 16_000);
        assert_eq!(learner.sample_rate(), 16_000);
        assert!((learner.duration() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn disabled_denoising_is_identity() {
        let config = AnalysisConfig {
            noise_reduction: NoiseReduction::Off,
            ..AnalysisConfig::default()
        };
        let samples: Vec<f32> = (0..4_000).map(|i| (i as f32 * 0.01).sin() * 0.3).collect();
        let (reference, _) = prepare(
            audio(samples.clone(), 16_000),
            audio(samples.clone(), 16_000),
            &config,
        )
        .unwrap();
        assert_eq!(reference.samples(), samples.as_slice());
    }
}
