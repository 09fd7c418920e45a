use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

const RATE: u32 = 16_000;

/// Write a bursty voiced tone as a 16-bit WAV.
fn write_wav(path: &Path, seconds: f64, tone_hz: f64) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let n = (RATE as f64 * seconds) as usize;
    for i in 0..n {
        let t = i as f64 / RATE as f64;
        let gate = if (2.0 * std::f64::consts::PI * 2.0 * t).sin() > -0.2 {
            1.0
        } else {
            0.0
        };
        let sample = (2.0 * std::f64::consts::PI * tone_hz * t).sin()
            + 0.5 * (2.0 * std::f64::consts::PI * 2.0 * tone_hz * t).sin();
        let value = (sample * gate * 0.4 * 32767.0) as i16;
        writer.write_sample(value).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn prints_a_score_table() {
    let dir = tempfile::tempdir().unwrap();
    let reference = dir.path().join("reference.wav");
    let learner = dir.path().join("learner.wav");
    write_wav(&reference, 1.5, 150.0);
    write_wav(&learner, 1.5, 150.0);

    Command::cargo_bin("accentor")
        .unwrap()
        .arg(&reference)
        .arg(&learner)
        .arg("--no-denoise")
        .assert()
        .success()
        .stdout(predicate::str::contains("--- Analysis Result ---"))
        .stdout(predicate::str::contains("MFCC"))
        .stdout(predicate::str::contains("Overall"));
}

#[test]
fn json_output_carries_all_eight_scores() {
    let dir = tempfile::tempdir().unwrap();
    let reference = dir.path().join("reference.wav");
    let learner = dir.path().join("learner.wav");
    write_wav(&reference, 1.5, 150.0);
    write_wav(&learner, 1.5, 180.0);

    let output = Command::cargo_bin("accentor")
        .unwrap()
        .arg(&reference)
        .arg(&learner)
        .arg("--json")
        .arg("--no-denoise")
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let scores = &parsed["scores"];
    for key in [
        "mfcc",
        "pitch",
        "energy",
        "speed",
        "formant",
        "intonation",
        "rhythm",
        "pause",
    ] {
        let value = scores[key].as_f64().unwrap_or_else(|| panic!("missing {key}"));
        assert!((0.0..=100.0).contains(&value), "{key} = {value}");
    }
    let composite = parsed["composite"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&composite));
}

#[test]
fn missing_input_fails_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let learner = dir.path().join("learner.wav");
    write_wav(&learner, 0.5, 150.0);

    Command::cargo_bin("accentor")
        .unwrap()
        .arg(dir.path().join("absent.wav"))
        .arg(&learner)
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
