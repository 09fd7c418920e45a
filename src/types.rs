//! Core types for the accentor comparison pipeline

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Raw audio data representation (mono, f32 samples)
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Audio samples, normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz (e.g., 44100)
    pub sample_rate: u32,
}

impl AudioData {
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// A normalized waveform as produced by the preprocessor.
///
/// Samples and rate are validated at construction and never mutated
/// afterwards; extractors only ever borrow the data.
#[derive(Debug, Clone)]
pub struct Waveform {
    samples: Arc<[f32]>,
    sample_rate: u32,
    duration: f64,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, InvalidAudioError> {
        if sample_rate == 0 {
            return Err(InvalidAudioError::new("sample rate must be positive"));
        }
        if samples.is_empty() {
            return Err(InvalidAudioError::new(
                "audio contains no samples after preprocessing",
            ));
        }
        let duration = samples.len() as f64 / sample_rate as f64;
        Ok(Self {
            samples: Arc::from(samples),
            sample_rate,
            duration,
        })
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds, always > 0.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.duration
    }
}

/// Fatal preprocessing error: undecodable, empty, or otherwise unusable
/// input audio. No partial analysis is possible once this is raised.
#[derive(Debug, Clone)]
pub struct InvalidAudioError {
    message: Arc<str>,
}

impl InvalidAudioError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Arc::from(message.into()),
        }
    }
}

impl Display for InvalidAudioError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid audio: {}", self.message)
    }
}

impl Error for InvalidAudioError {}
