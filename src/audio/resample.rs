use anyhow::{ensure, Result};

/// Linearly resample `samples` from `source_rate` to `target_rate`.
pub fn linear_resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    ensure!(source_rate > 0, "source sample rate must be positive");
    ensure!(target_rate > 0, "target sample rate must be positive");
    if samples.is_empty() || source_rate == target_rate {
        return Ok(samples.to_vec());
    }
    let ratio = target_rate as f32 / source_rate as f32;
    let output_len = ((samples.len() as f32) * ratio).ceil().max(1.0) as usize;
    let mut output = Vec::with_capacity(output_len);
    let last_index = samples.len() - 1;
    for i in 0..output_len {
        let position = i as f32 / ratio;
        let left = (position.floor() as usize).min(last_index);
        let right = (left + 1).min(last_index);
        let t = position - left as f32;
        let sample = samples[left] * (1.0 - t) + samples[right] * t;
        output.push(sample);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::linear_resample;

    #[test]
    fn preserves_constant_signal_after_resample() {
        let input = vec![0.5; 480];
        let resampled = linear_resample(&input, 48_000, 16_000).unwrap();
        let expected_len = ((input.len() as f32) * 16_000_f32 / 48_000_f32).ceil() as usize;
        assert_eq!(resampled.len(), expected_len);
        assert!(resampled.iter().all(|&sample| (sample - 0.5).abs() < 1e-6));
    }

    #[test]
    fn upsampling_tracks_a_slow_sine() {
        let source_rate = 16_000;
        let target_rate = 44_100;
        let input: Vec<f32> = (0..source_rate)
            .map(|i| (2.0 * std::f32::consts::PI * 100.0 * i as f32 / source_rate as f32).sin())
            .collect();
        let resampled = linear_resample(&input, source_rate, target_rate).unwrap();
        for (i, &sample) in resampled.iter().enumerate().step_by(441) {
            let t = i as f32 / target_rate as f32;
            let expected = (2.0 * std::f32::consts::PI * 100.0 * t).sin();
            assert!(
                (sample - expected).abs() < 0.01,
                "sample {i} drifted: {sample} vs {expected}"
            );
        }
    }

    #[test]
    fn identical_rates_round_trip_unchanged() {
        let input = vec![0.1, -0.2, 0.3];
        assert_eq!(linear_resample(&input, 8_000, 8_000).unwrap(), input);
    }
}
