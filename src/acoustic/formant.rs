//! Production formant tracking: Burg LPC over pre-emphasized,
//! Gaussian-windowed frames at twice the formant ceiling, with polynomial
//! roots converted to resonance frequencies.

use anyhow::{ensure, Result};
use num_complex::Complex64;

use super::FormantTracks;
use crate::audio::resample;
use crate::types::Waveform;

/// Pre-emphasis reference frequency (Hz).
const PRE_EMPHASIS_HZ: f64 = 50.0;
/// Formants closer than this to zero or to the ceiling are discarded as
/// filter artifacts.
const EDGE_MARGIN_HZ: f64 = 50.0;
const ROOT_ITERATIONS: usize = 160;
const ROOT_TOLERANCE: f64 = 1e-10;

pub fn track(
    wave: &Waveform,
    formant_count: usize,
    ceiling_hz: f64,
    window_seconds: f64,
    step_seconds: f64,
) -> Result<FormantTracks> {
    ensure!(formant_count >= 1, "formant count must be at least 1");
    ensure!(ceiling_hz > 2.0 * EDGE_MARGIN_HZ, "formant ceiling too low");
    ensure!(
        window_seconds > 0.0 && step_seconds > 0.0,
        "window and step must be positive"
    );

    // Analyze at twice the ceiling so the ceiling sits at Nyquist.
    let analysis_rate = (2.0 * ceiling_hz).round() as u32;
    let samples = resample::linear_resample(wave.samples(), wave.sample_rate(), analysis_rate)?;
    let mut audio: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
    pre_emphasize(&mut audio, analysis_rate as f64);

    // The nominal window setting covers half the frame actually analyzed.
    let frame_len = ((2.0 * window_seconds * analysis_rate as f64).round() as usize).max(8);
    let half_frame = frame_len / 2;
    let window = gaussian_window(frame_len);
    let order = 2 * formant_count;
    let duration = audio.len() as f64 / analysis_rate as f64;

    let mut times = Vec::new();
    let mut tracks: Vec<Vec<Option<f64>>> = vec![Vec::new(); formant_count];

    let mut t = window_seconds;
    while t <= duration - window_seconds {
        let center = (t * analysis_rate as f64).round() as isize;
        let frame = windowed_frame(&audio, center, half_frame, &window);
        let coefficients = burg_lpc(&frame, order);
        let formants = frame_formants(&coefficients, analysis_rate as f64, ceiling_hz);
        for (n, track) in tracks.iter_mut().enumerate() {
            track.push(formants.get(n).copied());
        }
        times.push(t);
        t += step_seconds;
    }

    Ok(FormantTracks::new(times, tracks))
}

/// First-order pre-emphasis from `PRE_EMPHASIS_HZ` upward.
fn pre_emphasize(audio: &mut [f64], sample_rate: f64) {
    let alpha = (-2.0 * std::f64::consts::PI * PRE_EMPHASIS_HZ / sample_rate).exp();
    for i in (1..audio.len()).rev() {
        audio[i] -= alpha * audio[i - 1];
    }
}

fn gaussian_window(n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![1.0];
    }
    let mid = (n - 1) as f64 / 2.0;
    (0..n)
        .map(|i| {
            let x = (i as f64 - mid) / mid;
            (-12.0 * x * x).exp()
        })
        .collect()
}

fn windowed_frame(audio: &[f64], center: isize, half: usize, window: &[f64]) -> Vec<f64> {
    let len = window.len();
    let start = center - half as isize;
    (0..len)
        .map(|i| {
            let index = start + i as isize;
            if index < 0 || index >= audio.len() as isize {
                0.0
            } else {
                audio[index as usize] * window[i]
            }
        })
        .collect()
}

/// Burg's method: LPC coefficients a[0..=order], a[0] = 1.
fn burg_lpc(frame: &[f64], order: usize) -> Vec<f64> {
    let n = frame.len();
    let mut a = vec![0.0; order + 1];
    a[0] = 1.0;
    if n <= order {
        return a;
    }

    let mut forward = frame.to_vec();
    let mut backward = frame.to_vec();

    for k in 1..=order {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for i in k..n {
            numerator += forward[i] * backward[i - 1];
            denominator += forward[i] * forward[i] + backward[i - 1] * backward[i - 1];
        }
        if denominator < 1e-30 {
            break;
        }
        let reflection = -2.0 * numerator / denominator;

        for i in (k..n).rev() {
            let f = forward[i];
            let b = backward[i - 1];
            forward[i] = f + reflection * b;
            backward[i] = b + reflection * f;
        }

        let mut next = a.clone();
        for i in 1..k {
            next[i] = a[i] + reflection * a[k - i];
        }
        next[k] = reflection;
        a = next;
    }

    a
}

/// Roots of the monic LPC polynomial via Durand-Kerner iteration.
fn polynomial_roots(a: &[f64]) -> Vec<Complex64> {
    let order = a.len() - 1;
    if order == 0 || a[1..].iter().all(|c| c.abs() < 1e-12) {
        return Vec::new();
    }

    let mut roots: Vec<Complex64> = (0..order)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * (i as f64 + 0.25) / order as f64;
            Complex64::from_polar(0.9, angle)
        })
        .collect();

    for _ in 0..ROOT_ITERATIONS {
        let mut largest_step = 0.0_f64;
        for i in 0..order {
            let z = roots[i];
            let mut denominator = Complex64::new(1.0, 0.0);
            for (j, &other) in roots.iter().enumerate() {
                if j != i {
                    denominator *= z - other;
                }
            }
            if denominator.norm() < 1e-30 {
                continue;
            }
            let step = eval_monic(a, z) / denominator;
            roots[i] = z - step;
            largest_step = largest_step.max(step.norm());
        }
        if largest_step < ROOT_TOLERANCE {
            break;
        }
    }

    // Resonances must sit inside the unit circle; reflect any that don't.
    for root in roots.iter_mut() {
        let radius = root.norm();
        if radius > 1.0 {
            *root = root.conj() / (radius * radius);
        }
    }
    roots
}

/// Evaluate z^p + a[1] z^(p-1) + ... + a[p] by Horner's rule.
fn eval_monic(a: &[f64], z: Complex64) -> Complex64 {
    let mut value = Complex64::new(1.0, 0.0);
    for &coefficient in &a[1..] {
        value = value * z + coefficient;
    }
    value
}

/// Convert stable upper-half-plane roots to formant frequencies within
/// the usable band, sorted ascending.
fn frame_formants(a: &[f64], sample_rate: f64, ceiling_hz: f64) -> Vec<f64> {
    let mut formants: Vec<f64> = polynomial_roots(a)
        .into_iter()
        .filter(|root| root.im > 0.0)
        .filter_map(|root| {
            let frequency = root.arg() * sample_rate / (2.0 * std::f64::consts::PI);
            let radius = root.norm();
            let bandwidth = if radius > 0.0 {
                -radius.ln() * sample_rate / std::f64::consts::PI
            } else {
                f64::INFINITY
            };
            (frequency >= EDGE_MARGIN_HZ
                && frequency <= ceiling_hz - EDGE_MARGIN_HZ
                && bandwidth.is_finite()
                && bandwidth > 0.0)
                .then_some(frequency)
        })
        .collect();
    formants.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
    formants
}
