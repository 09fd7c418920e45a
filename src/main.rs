use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use accentor::audio::decoder;
use accentor::features::Feature;
use accentor::{AnalysisConfig, AnalysisResult, Engine, NoiseReduction};

/// accentor - pronunciation similarity scorer
///
/// Compares a learner recording against a reference recording and reports
/// eight per-dimension similarity scores plus a weighted overall score.
#[derive(Parser, Debug)]
#[command(name = "accentor")]
#[command(version)]
#[command(about = "Score a learner recording against a reference", long_about = None)]
struct Args {
    /// Reference audio file (MP3, OGG, FLAC, WAV, ...)
    #[arg(value_name = "REFERENCE")]
    reference: PathBuf,

    /// Learner audio file to score against the reference
    #[arg(value_name = "LEARNER")]
    learner: PathBuf,

    /// Emit the result as JSON instead of the score table
    #[arg(long)]
    json: bool,

    /// Skip the noise-reduction pass entirely
    #[arg(long, conflicts_with = "denoiser")]
    no_denoise: bool,

    /// Noise-reduction strategy
    #[arg(long, value_enum, default_value = "wiener")]
    denoiser: Denoiser,

    /// Optional high-pass cutoff in Hz for rumble removal
    #[arg(long, value_name = "HZ")]
    high_pass: Option<f64>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Denoiser {
    Wiener,
    Gate,
}

impl Args {
    fn validate(&self) -> Result<()> {
        for (label, path) in [("Reference", &self.reference), ("Learner", &self.learner)] {
            if !path.exists() {
                anyhow::bail!("{label} file does not exist: {path:?}");
            }
            if !path.is_file() {
                anyhow::bail!("{label} path is not a file: {path:?}");
            }
        }
        if let Some(cutoff) = self.high_pass {
            anyhow::ensure!(cutoff > 0.0, "High-pass cutoff must be positive, got {cutoff}");
        }
        Ok(())
    }

    fn analysis_config(&self) -> AnalysisConfig {
        let noise_reduction = if self.no_denoise {
            NoiseReduction::Off
        } else {
            match self.denoiser {
                Denoiser::Wiener => NoiseReduction::Wiener,
                Denoiser::Gate => NoiseReduction::NoiseGate,
            }
        };
        AnalysisConfig {
            noise_reduction,
            high_pass_hz: self.high_pass,
            ..AnalysisConfig::default()
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    args.validate()
        .context("Failed to validate command-line arguments")?;

    let reference = decoder::decode_audio(&args.reference)
        .with_context(|| format!("Failed to decode reference audio {:?}", args.reference))?;
    let learner = decoder::decode_audio(&args.learner)
        .with_context(|| format!("Failed to decode learner audio {:?}", args.learner))?;

    let engine = Engine::new(args.analysis_config());
    let result = engine
        .analyze(reference, learner)
        .context("Analysis failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_table(&result);
    }
    Ok(())
}

fn print_table(result: &AnalysisResult) {
    println!("\n--- Analysis Result ---");
    let labels = [
        (Feature::Mfcc, "MFCC"),
        (Feature::Pitch, "Pitch"),
        (Feature::Energy, "Energy"),
        (Feature::Speed, "Speech-rate"),
        (Feature::Formant, "Formant"),
        (Feature::Intonation, "Intonation"),
        (Feature::Rhythm, "Rhythm"),
        (Feature::Pause, "Pause"),
    ];
    for (feature, label) in labels {
        println!("{label:<12}: {:6.2}", result.scores.get(feature));
    }
    println!("{:<12}: {:6.2}", "Overall", result.composite);
    for failure in &result.degraded {
        println!("  ({} degraded: {})", failure.feature, failure.reason);
    }
}
