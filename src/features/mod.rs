//! The eight feature extractors and their shared result model.
//!
//! Every extractor is a pure function of the two normalized waveforms
//! (some also consult the acoustic analysis provider). Failures inside an
//! extractor degrade that one dimension to a zero score with a retained
//! reason; they never abort the analysis.

pub mod energy;
pub mod formant;
pub mod intonation;
pub mod pause;
pub mod pitch;
pub mod rhythm;
pub mod spectral;
pub mod speed;
mod support;

use tracing::warn;

use crate::acoustic::AcousticAnalyzer;
use crate::config::AnalysisConfig;
use crate::types::Waveform;

/// The eight scored dimensions, in weight-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Mfcc,
    Pitch,
    Energy,
    Speed,
    Formant,
    Intonation,
    Rhythm,
    Pause,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::Mfcc,
        Feature::Pitch,
        Feature::Energy,
        Feature::Speed,
        Feature::Formant,
        Feature::Intonation,
        Feature::Rhythm,
        Feature::Pause,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::Mfcc => "mfcc",
            Feature::Pitch => "pitch",
            Feature::Energy => "energy",
            Feature::Speed => "speed",
            Feature::Formant => "formant",
            Feature::Intonation => "intonation",
            Feature::Rhythm => "rhythm",
            Feature::Pause => "pause",
        }
    }
}

/// One extractor's verdict: a bounded score, or a failure whose reason is
/// kept for diagnostics. A failed dimension scores zero.
#[derive(Debug, Clone)]
pub enum FeatureOutcome {
    Scored(f64),
    Failed { reason: String },
}

impl FeatureOutcome {
    /// Clamp a raw formula result into [0, 100]. A non-finite value is a
    /// bug in an upstream guard and is reported as a failure rather than
    /// being allowed anywhere near the composite.
    pub(crate) fn from_raw(raw: f64) -> Self {
        if raw.is_finite() {
            FeatureOutcome::Scored(raw.clamp(0.0, 100.0))
        } else {
            FeatureOutcome::Failed {
                reason: "score formula produced a non-finite value".to_string(),
            }
        }
    }

    pub(crate) fn failed(reason: impl Into<String>) -> Self {
        FeatureOutcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            FeatureOutcome::Scored(score) => *score,
            FeatureOutcome::Failed { .. } => 0.0,
        }
    }
}

/// Outcomes for all eight dimensions of one comparison.
#[derive(Debug, Clone)]
pub struct FeatureReport {
    pub mfcc: FeatureOutcome,
    pub pitch: FeatureOutcome,
    pub energy: FeatureOutcome,
    pub speed: FeatureOutcome,
    pub formant: FeatureOutcome,
    pub intonation: FeatureOutcome,
    pub rhythm: FeatureOutcome,
    pub pause: FeatureOutcome,
}

impl FeatureReport {
    pub fn outcome(&self, feature: Feature) -> &FeatureOutcome {
        match feature {
            Feature::Mfcc => &self.mfcc,
            Feature::Pitch => &self.pitch,
            Feature::Energy => &self.energy,
            Feature::Speed => &self.speed,
            Feature::Formant => &self.formant,
            Feature::Intonation => &self.intonation,
            Feature::Rhythm => &self.rhythm,
            Feature::Pause => &self.pause,
        }
    }
}

/// Run all eight extractors over a preprocessed pair.
pub fn extract_all(
    reference: &Waveform,
    learner: &Waveform,
    analyzer: &dyn AcousticAnalyzer,
    config: &AnalysisConfig,
) -> FeatureReport {
    let report = FeatureReport {
        mfcc: spectral::compare(reference, learner),
        pitch: pitch::compare(reference, learner, analyzer),
        energy: energy::compare(reference, learner),
        speed: speed::compare(reference, learner),
        formant: formant::compare(reference, learner, analyzer),
        intonation: intonation::compare(reference, learner, analyzer),
        rhythm: rhythm::compare(reference, learner),
        pause: pause::compare(reference, learner, config),
    };
    for feature in Feature::ALL {
        if let FeatureOutcome::Failed { reason } = report.outcome(feature) {
            warn!(
                feature = feature.name(),
                reason = %reason,
                "extractor degraded to zero"
            );
        }
    }
    report
}
