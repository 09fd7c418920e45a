//! Production F0 tracking: pYIN estimation at a fixed analysis rate,
//! resampled onto the caller's uniform step grid.

use anyhow::{ensure, Result};
use aus::analysis;

use super::PitchTrace;
use crate::audio::resample;
use crate::types::Waveform;

const ANALYSIS_RATE: u32 = 16_000;
const WINDOW_MS: usize = 25;

pub fn track(wave: &Waveform, min_hz: f64, max_hz: f64, step_seconds: f64) -> Result<PitchTrace> {
    ensure!(step_seconds > 0.0, "pitch step must be positive");
    ensure!(
        min_hz > 0.0 && max_hz > min_hz,
        "pitch search range must satisfy 0 < min < max"
    );

    let samples = ensure_analysis_rate(wave)?;
    if samples.iter().all(|s| s.abs() < 1e-6) {
        // No excitation: the whole trace is unvoiced.
        return Ok(unvoiced_trace(wave.duration(), step_seconds));
    }
    let audio: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
    let frame_len = (ANALYSIS_RATE as usize * WINDOW_MS / 1000).max(1);

    let (_timestamps, pitches, voiced_flags, _confidence) =
        analysis::pyin_pitch_estimator(&audio, ANALYSIS_RATE, min_hz, max_hz, frame_len);

    let raw: Vec<Option<f64>> = pitches
        .iter()
        .zip(voiced_flags.iter())
        .map(|(&pitch, &voiced)| (voiced && pitch.is_finite() && pitch > 0.0).then_some(pitch))
        .collect();

    // The estimator frames tile the clip at a fixed hop; spread them
    // evenly over the duration rather than trusting hop internals, then
    // resample onto the requested step.
    let duration = wave.duration();
    let raw_times: Vec<f64> = (0..raw.len())
        .map(|i| duration * i as f64 / raw.len().max(1) as f64)
        .collect();

    let mut times = Vec::new();
    let mut values = Vec::new();
    let mut t = 0.0;
    while t < duration {
        times.push(t);
        values.push(super::sample_series(&raw_times, &raw, t));
        t += step_seconds;
    }
    Ok(PitchTrace::new(times, values))
}

fn unvoiced_trace(duration: f64, step_seconds: f64) -> PitchTrace {
    let mut times = Vec::new();
    let mut t = 0.0;
    while t < duration {
        times.push(t);
        t += step_seconds;
    }
    let values = vec![None; times.len()];
    PitchTrace::new(times, values)
}

fn ensure_analysis_rate(wave: &Waveform) -> Result<Vec<f32>> {
    if wave.sample_rate() == ANALYSIS_RATE {
        Ok(wave.samples().to_vec())
    } else {
        resample::linear_resample(wave.samples(), wave.sample_rate(), ANALYSIS_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f64, seconds: f64, rate: u32) -> Waveform {
        let n = (rate as f64 * seconds) as usize;
        let samples: Vec<f32> = (0..n)
            .map(|i| {
                let t = i as f64 / rate as f64;
                ((2.0 * std::f64::consts::PI * freq * t).sin() * 0.5) as f32
            })
            .collect();
        Waveform::new(samples, rate).unwrap()
    }

    #[test]
    fn tracks_a_steady_tone_near_its_frequency() {
        let wave = tone(150.0, 1.0, 16_000);
        let trace = track(&wave, 75.0, 600.0, 0.01).unwrap();
        let voiced = trace.voiced();
        assert!(!voiced.is_empty(), "steady tone should be voiced");
        let mean = voiced.iter().sum::<f64>() / voiced.len() as f64;
        assert!(
            (mean - 150.0).abs() < 15.0,
            "expected ~150 Hz, estimated {mean:.1}"
        );
    }

    #[test]
    fn silence_has_no_voiced_frames() {
        let wave = Waveform::new(vec![0.0; 16_000], 16_000).unwrap();
        let trace = track(&wave, 75.0, 600.0, 0.01).unwrap();
        assert!(trace.voiced().is_empty());
    }

    #[test]
    fn rejects_degenerate_search_range() {
        let wave = tone(150.0, 0.5, 16_000);
        assert!(track(&wave, 600.0, 75.0, 0.01).is_err());
        assert!(track(&wave, 75.0, 600.0, 0.0).is_err());
    }
}
