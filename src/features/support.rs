//! Shared numeric helpers for the feature extractors: envelopes, peak
//! picking, autocorrelation, and the guarded statistics the score
//! formulas lean on.

pub(crate) const EPSILON: f64 = 1e-9;

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let center = mean(values);
    let variance = values
        .iter()
        .map(|v| (v - center) * (v - center))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// max - min; 0 for an empty slice.
pub(crate) fn value_range(values: &[f64]) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() {
        max - min
    } else {
        0.0
    }
}

/// Relative difference of `observed` against `reference`, with the
/// denominator floored so a near-zero reference degrades the score
/// instead of producing a non-finite value.
pub(crate) fn rel_diff(observed: f64, reference: f64) -> f64 {
    (reference - observed).abs() / reference.abs().max(EPSILON)
}

pub(crate) fn first_differences(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

/// Frame-wise RMS energy envelope.
pub(crate) fn rms_envelope(
    samples: &[f32],
    sample_rate: u32,
    window_seconds: f64,
    hop_seconds: f64,
) -> Vec<f64> {
    if samples.is_empty() || sample_rate == 0 {
        return Vec::new();
    }
    let window = ((window_seconds * sample_rate as f64) as usize).max(1);
    let hop = ((hop_seconds * sample_rate as f64) as usize).max(1);
    let mut envelope = Vec::new();
    let mut start = 0;
    while start < samples.len() {
        let end = (start + window).min(samples.len());
        let frame = &samples[start..end];
        let power: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
        envelope.push((power / frame.len() as f64).sqrt());
        start += hop;
    }
    envelope
}

/// Centered moving average; edges shrink to the available span.
pub(crate) fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if values.is_empty() || window < 2 {
        return values.to_vec();
    }
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

/// Local maxima above `min_height`, thinned so no two survivors are
/// within `min_distance` of each other (taller peaks win). Indices are
/// returned in ascending order.
pub(crate) fn find_peaks(
    values: &[f64],
    min_height: Option<f64>,
    min_distance: usize,
) -> Vec<usize> {
    let mut candidates: Vec<usize> = (1..values.len().saturating_sub(1))
        .filter(|&i| values[i] > values[i - 1] && values[i] > values[i + 1])
        .filter(|&i| min_height.is_none_or(|h| values[i] >= h))
        .collect();
    if min_distance > 1 {
        candidates.sort_by(|&a, &b| {
            values[b]
                .partial_cmp(&values[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut kept: Vec<usize> = Vec::new();
        for candidate in candidates {
            if kept
                .iter()
                .all(|&peak| peak.abs_diff(candidate) >= min_distance)
            {
                kept.push(candidate);
            }
        }
        kept.sort_unstable();
        kept
    } else {
        candidates
    }
}

/// Non-negative-lag autocorrelation (raw products, not normalized).
pub(crate) fn autocorrelation(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    (0..n)
        .map(|lag| {
            values[..n - lag]
                .iter()
                .zip(values[lag..].iter())
                .map(|(a, b)| a * b)
                .sum()
        })
        .collect()
}

/// Cosine similarity; `None` when either vector has (near-)zero norm.
pub(crate) fn cosine_similarity(a: &[f64], b: &[f64]) -> Option<f64> {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a < EPSILON || norm_b < EPSILON {
        return None;
    }
    Some(dot / (norm_a * norm_b))
}

/// Linearly interpolate a series onto `target_len` evenly spaced points.
pub(crate) fn interpolate_to_len(series: &[f64], target_len: usize) -> Vec<f64> {
    match (target_len, series.len()) {
        (0, _) => Vec::new(),
        (_, 0) => vec![0.0; target_len],
        (count, len) if count == len => series.to_vec(),
        (count, len) => {
            let mut out = Vec::with_capacity(count);
            let denominator = (count - 1).max(1) as f64;
            for i in 0..count {
                let position = i as f64 * (len - 1) as f64 / denominator;
                let lower = position.floor() as usize;
                let upper = position.ceil() as usize;
                if lower == upper {
                    out.push(series[lower]);
                } else {
                    let weight = position - lower as f64;
                    out.push(series[lower] * (1.0 - weight) + series[upper] * weight);
                }
            }
            out
        }
    }
}
