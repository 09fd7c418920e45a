//! Spectral (timbre) similarity: MFCC matrices compared under DTW.

use anyhow::{Context, Result};
use aus::analysis;
use aus::analysis::mel::MelFilterbank;
use aus::spectrum;
use aus::WindowType;
use ndarray::{Array2, Axis};

use super::FeatureOutcome;
use crate::align;
use crate::audio::resample;
use crate::types::Waveform;

const ANALYSIS_RATE: u32 = 16_000;
const WINDOW_MS: usize = 25;
const HOP_MS: usize = 10;
const MEL_BANDS: usize = 80;
const MIN_FREQ: f64 = 20.0;
const MFCC_COUNT: usize = 13;
const CMVN_EPSILON: f64 = 1e-8;
/// Saturating-curve constant: moderate DTW distance degrades the score
/// gracefully instead of linearly collapsing it.
const DISTANCE_KNEE: f64 = 1.8;

pub(crate) fn compare(reference: &Waveform, learner: &Waveform) -> FeatureOutcome {
    // A flat signal has no spectral shape to compare; CMVN would turn it
    // into pure normalization noise.
    if is_flat(reference) {
        return FeatureOutcome::failed("reference signal is silent");
    }
    if is_flat(learner) {
        return FeatureOutcome::failed("learner signal is silent");
    }

    let reference_mfcc = match mfcc_matrix(reference) {
        Ok(matrix) => matrix,
        Err(err) => return FeatureOutcome::failed(format!("reference cepstrum: {err:#}")),
    };
    let learner_mfcc = match mfcc_matrix(learner) {
        Ok(matrix) => matrix,
        Err(err) => return FeatureOutcome::failed(format!("learner cepstrum: {err:#}")),
    };

    let frames = reference_mfcc.nrows().min(learner_mfcc.nrows());
    if frames == 0 {
        return FeatureOutcome::failed("no analysis frames in one of the signals");
    }
    let reference_view = reference_mfcc.slice(ndarray::s![..frames, ..]);
    let learner_view = learner_mfcc.slice(ndarray::s![..frames, ..]);

    let alignment = match align::align(reference_view, learner_view) {
        Ok(alignment) => alignment,
        Err(err) => return FeatureOutcome::failed(format!("alignment: {err:#}")),
    };

    let norm = alignment.distance / (frames * MFCC_COUNT) as f64;
    FeatureOutcome::from_raw(100.0 * (1.0 - norm / (norm + DISTANCE_KNEE)))
}

fn is_flat(wave: &Waveform) -> bool {
    wave.samples().iter().all(|s| s.abs() < 1e-6)
}

/// Mean/variance-normalized MFCC matrix (frames x coefficients).
fn mfcc_matrix(wave: &Waveform) -> Result<Array2<f64>> {
    let mono = ensure_analysis_rate(wave)?;
    let audio: Vec<f64> = mono.iter().map(|&s| s as f64).collect();

    let fft_size = ((ANALYSIS_RATE as usize * WINDOW_MS) / 1000).max(1);
    let hop_size = ((ANALYSIS_RATE as usize * HOP_MS) / 1000).max(1);

    let stft = spectrum::rstft(&audio, fft_size, hop_size, WindowType::Hanning);
    let (magnitude, _) = spectrum::complex_to_polar_rstft(&stft);
    let power = analysis::make_power_spectrogram(&magnitude);

    let freqs = spectrum::rfftfreq(fft_size, ANALYSIS_RATE);
    let filterbank = MelFilterbank::new(
        MIN_FREQ,
        (ANALYSIS_RATE as f64) / 2.0,
        MEL_BANDS,
        &freqs,
        true,
    );
    let mel = analysis::mel::make_mel_spectrogram(&power, &filterbank);
    let mfcc_raw = analysis::mel::mfcc_spectrogram(&mel, MFCC_COUNT, None);

    let matrix = array_from_rows(&mfcc_raw)?;
    if matrix.iter().any(|v| !v.is_finite()) {
        anyhow::bail!("cepstral features are not finite (silent or degenerate signal)");
    }
    Ok(normalize_coefficients(matrix))
}

fn ensure_analysis_rate(wave: &Waveform) -> Result<Vec<f32>> {
    if wave.sample_rate() == ANALYSIS_RATE {
        Ok(wave.samples().to_vec())
    } else {
        resample::linear_resample(wave.samples(), wave.sample_rate(), ANALYSIS_RATE)
            .with_context(|| {
                format!(
                    "failed to resample from {} Hz to {} Hz",
                    wave.sample_rate(),
                    ANALYSIS_RATE
                )
            })
    }
}

fn array_from_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    if rows.is_empty() {
        return Ok(Array2::zeros((0, 0)));
    }
    let cols = rows[0].len();
    let mut flat = Vec::with_capacity(rows.len() * cols);
    for row in rows {
        anyhow::ensure!(row.len() == cols, "ragged cepstral matrix");
        flat.extend_from_slice(row);
    }
    Ok(Array2::from_shape_vec((rows.len(), cols), flat)?)
}

/// Per-coefficient mean/variance normalization across time.
fn normalize_coefficients(mut matrix: Array2<f64>) -> Array2<f64> {
    for mut column in matrix.axis_iter_mut(Axis(1)) {
        let mean = column.mean().unwrap_or(0.0);
        let variance =
            column.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / column.len().max(1) as f64;
        let std_dev = variance.sqrt() + CMVN_EPSILON;
        column.mapv_inplace(|v| (v - mean) / std_dev);
    }
    matrix
}
