//! Fan-in: the fixed weight table and the composite analysis result.

use anyhow::{ensure, Result};
use serde::Serialize;
use tracing::warn;

use crate::features::{Feature, FeatureOutcome, FeatureReport};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Immutable per-feature weights. The default is the documented scoring
/// profile; overrides are validated, never mutated in place.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WeightTable {
    pub mfcc: f64,
    pub pitch: f64,
    pub energy: f64,
    pub speed: f64,
    pub formant: f64,
    pub intonation: f64,
    pub rhythm: f64,
    pub pause: f64,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            mfcc: 0.20,
            pitch: 0.15,
            energy: 0.10,
            speed: 0.10,
            formant: 0.15,
            intonation: 0.15,
            rhythm: 0.10,
            pause: 0.05,
        }
    }
}

impl WeightTable {
    /// Validate a custom weight profile: all weights positive, summing to
    /// one within tolerance.
    pub fn custom(weights: WeightTable) -> Result<WeightTable> {
        for feature in Feature::ALL {
            ensure!(
                weights.weight(feature) > 0.0,
                "weight for {} must be positive",
                feature.name()
            );
        }
        let sum: f64 = Feature::ALL.iter().map(|&f| weights.weight(f)).sum();
        ensure!(
            (sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE,
            "weights must sum to 1.0, got {sum}"
        );
        Ok(weights)
    }

    pub fn weight(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Mfcc => self.mfcc,
            Feature::Pitch => self.pitch,
            Feature::Energy => self.energy,
            Feature::Speed => self.speed,
            Feature::Formant => self.formant,
            Feature::Intonation => self.intonation,
            Feature::Rhythm => self.rhythm,
            Feature::Pause => self.pause,
        }
    }
}

/// The eight bounded scores.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeatureScores {
    pub mfcc: f64,
    pub pitch: f64,
    pub energy: f64,
    pub speed: f64,
    pub formant: f64,
    pub intonation: f64,
    pub rhythm: f64,
    pub pause: f64,
}

impl FeatureScores {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Mfcc => self.mfcc,
            Feature::Pitch => self.pitch,
            Feature::Energy => self.energy,
            Feature::Speed => self.speed,
            Feature::Formant => self.formant,
            Feature::Intonation => self.intonation,
            Feature::Rhythm => self.rhythm,
            Feature::Pause => self.pause,
        }
    }
}

/// A dimension that degraded to zero, with the reason it did.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureFailure {
    pub feature: &'static str,
    pub reason: String,
}

/// One comparison's full outcome: the eight scores, their weighted
/// composite, and any retained degradation diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub scores: FeatureScores,
    pub composite: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<FeatureFailure>,
}

/// Combines a feature report under an immutable weight table.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    weights: WeightTable,
}

impl Aggregator {
    pub fn new(weights: WeightTable) -> Self {
        Self { weights }
    }

    pub fn aggregate(&self, report: &FeatureReport) -> AnalysisResult {
        let mut degraded = Vec::new();
        let mut bounded = |feature: Feature| -> f64 {
            let outcome = report.outcome(feature);
            if let FeatureOutcome::Failed { reason } = outcome {
                degraded.push(FeatureFailure {
                    feature: feature.name(),
                    reason: reason.clone(),
                });
            }
            let score = outcome.score();
            if !score.is_finite() {
                warn!(feature = feature.name(), "non-finite score forced to zero");
                return 0.0;
            }
            score.clamp(0.0, 100.0)
        };

        let scores = FeatureScores {
            mfcc: bounded(Feature::Mfcc),
            pitch: bounded(Feature::Pitch),
            energy: bounded(Feature::Energy),
            speed: bounded(Feature::Speed),
            formant: bounded(Feature::Formant),
            intonation: bounded(Feature::Intonation),
            rhythm: bounded(Feature::Rhythm),
            pause: bounded(Feature::Pause),
        };

        let composite = Feature::ALL
            .iter()
            .map(|&feature| self.weights.weight(feature) * scores.get(feature))
            .sum();

        AnalysisResult {
            scores,
            composite,
            degraded,
        }
    }
}
