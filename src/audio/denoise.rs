//! Noise reduction passes for the preprocessor.
//!
//! Two deterministic strategies: a Wiener filter (local mean/variance
//! estimator, noise power taken as the mean local variance) and a soft
//! noise gate whose floor is profiled from the leading segment of the
//! signal.

/// Local window for the Wiener mean/variance estimate.
const WIENER_WINDOW: usize = 3;

/// Leading segment used to profile the noise floor, in seconds.
const PROFILE_SECONDS: f64 = 0.3;

/// Envelope smoothing window for the gate, in seconds.
const GATE_WINDOW_SECONDS: f64 = 0.02;

/// Gate threshold as a multiple of the profiled noise RMS.
const GATE_FLOOR_FACTOR: f64 = 2.0;

/// Wiener-filter the signal: each sample is pulled toward its local mean
/// in proportion to how much its local variance exceeds the noise power.
pub fn wiener(samples: &[f32]) -> Vec<f32> {
    let n = samples.len();
    if n < WIENER_WINDOW {
        return samples.to_vec();
    }

    let x: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
    let local_mean = windowed_mean(&x, WIENER_WINDOW);
    let local_sq_mean = {
        let squared: Vec<f64> = x.iter().map(|v| v * v).collect();
        windowed_mean(&squared, WIENER_WINDOW)
    };
    let local_var: Vec<f64> = local_sq_mean
        .iter()
        .zip(local_mean.iter())
        .map(|(sq, mean)| (sq - mean * mean).max(0.0))
        .collect();
    let noise = local_var.iter().sum::<f64>() / n as f64;

    x.iter()
        .enumerate()
        .map(|(i, &value)| {
            let gain = (local_var[i] - noise).max(0.0) / local_var[i].max(noise).max(f64::MIN_POSITIVE);
            (local_mean[i] + gain * (value - local_mean[i])) as f32
        })
        .collect()
}

/// Attenuate low-envelope stretches using a noise floor estimated from the
/// first `PROFILE_SECONDS` of the signal.
pub fn noise_gate(samples: &[f32], sample_rate: u32) -> Vec<f32> {
    if samples.is_empty() || sample_rate == 0 {
        return samples.to_vec();
    }
    let profile_len = ((PROFILE_SECONDS * sample_rate as f64) as usize)
        .clamp(1, samples.len());
    let noise_rms = rms(&samples[..profile_len]);
    let floor = noise_rms * GATE_FLOOR_FACTOR;
    if floor <= f64::MIN_POSITIVE {
        return samples.to_vec();
    }

    let window = ((GATE_WINDOW_SECONDS * sample_rate as f64) as usize).max(1);
    let magnitude: Vec<f64> = samples.iter().map(|&s| s.abs() as f64).collect();
    let envelope = windowed_mean(&magnitude, window);

    samples
        .iter()
        .zip(envelope.iter())
        .map(|(&sample, &env)| {
            let gain = env / (env + floor);
            (sample as f64 * gain) as f32
        })
        .collect()
}

/// Centered moving average, edges shrunk to the available span.
fn windowed_mean(values: &[f64], window: usize) -> Vec<f64> {
    let radius = window / 2;
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let start = i.saturating_sub(radius);
        let end = (i + radius + 1).min(values.len());
        let sum: f64 = values[start..end].iter().sum();
        out.push(sum / (end - start) as f64);
    }
    out
}

fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt()
}
