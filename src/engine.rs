//! Orchestration: preprocess the pair, fan out to the extractors, fan in
//! to the aggregator.

use tracing::debug;

use crate::acoustic::{AcousticAnalyzer, SignalAnalyzer};
use crate::aggregate::{Aggregator, AnalysisResult};
use crate::audio::preprocess;
use crate::config::AnalysisConfig;
use crate::features;
use crate::types::{AudioData, InvalidAudioError};

/// The comparison engine. One instance can serve any number of requests;
/// every analysis is an independent pure computation.
pub struct Engine<A = SignalAnalyzer> {
    analyzer: A,
    config: AnalysisConfig,
}

impl Engine<SignalAnalyzer> {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            analyzer: SignalAnalyzer::new(),
            config,
        }
    }
}

impl Default for Engine<SignalAnalyzer> {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl<A: AcousticAnalyzer> Engine<A> {
    /// Build an engine around a custom acoustic analysis provider.
    pub fn with_analyzer(config: AnalysisConfig, analyzer: A) -> Self {
        Self { analyzer, config }
    }

    /// Compare a learner recording against a reference recording.
    ///
    /// Preprocessing failures are fatal; individual extractor failures
    /// degrade their dimension to zero and the analysis still completes.
    pub fn analyze(
        &self,
        reference: AudioData,
        learner: AudioData,
    ) -> Result<AnalysisResult, InvalidAudioError> {
        let (reference, learner) = preprocess::prepare(reference, learner, &self.config)?;
        debug!(
            reference_seconds = reference.duration(),
            learner_seconds = learner.duration(),
            "running feature extractors"
        );
        let report = features::extract_all(&reference, &learner, &self.analyzer, &self.config);
        let result = Aggregator::new(self.config.weights).aggregate(&report);
        debug!(composite = result.composite, "analysis complete");
        Ok(result)
    }
}
