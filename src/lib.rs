//! accentor: acoustic comparison and scoring of a learner recording
//! against a reference recording.
//!
//! The pipeline preprocesses both waveforms into a comparable form,
//! extracts eight independent acoustic features (spectral timbre, pitch
//! statistics, energy, speech rate, formant quality, intonation contour,
//! rhythm, pause pattern), and combines them under a fixed weight table
//! into one composite score in [0, 100].

pub mod acoustic;
pub mod aggregate;
pub mod align;
pub mod audio;
pub mod config;
pub mod engine;
pub mod features;
pub mod types;

pub use acoustic::{AcousticAnalyzer, SignalAnalyzer, SyntheticAnalyzer};
pub use aggregate::{AnalysisResult, FeatureScores, WeightTable};
pub use config::{AnalysisConfig, NoiseReduction};
pub use engine::Engine;
pub use types::{AudioData, InvalidAudioError, Waveform};
