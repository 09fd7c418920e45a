//! Acoustic analysis provider: pitch and formant tracking primitives
//! behind a capability trait, so the scoring policy can be exercised with
//! fixed synthetic traces while production runs real estimators.

pub mod formant;
pub mod pitch;

use anyhow::{bail, Result};

use crate::types::Waveform;

/// A time-indexed fundamental-frequency trace. Entries are `None` where
/// the frame is unvoiced or the estimate is undefined.
#[derive(Debug, Clone)]
pub struct PitchTrace {
    times: Vec<f64>,
    values: Vec<Option<f64>>,
}

impl PitchTrace {
    pub fn new(times: Vec<f64>, values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(times.len(), values.len());
        Self { times, values }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The defined (voiced) frequency values, in time order.
    pub fn voiced(&self) -> Vec<f64> {
        self.values.iter().filter_map(|v| *v).collect()
    }

    /// Frequency at an arbitrary time, linearly interpolated between the
    /// surrounding frames; falls back to the nearer voiced neighbor when
    /// one side is unvoiced.
    pub fn value_at(&self, time: f64) -> Option<f64> {
        sample_series(&self.times, &self.values, time)
    }
}

/// Per-formant time-indexed frequency tracks (F1 first).
#[derive(Debug, Clone)]
pub struct FormantTracks {
    times: Vec<f64>,
    tracks: Vec<Vec<Option<f64>>>,
}

impl FormantTracks {
    pub fn new(times: Vec<f64>, tracks: Vec<Vec<Option<f64>>>) -> Self {
        debug_assert!(tracks.iter().all(|t| t.len() == times.len()));
        Self { times, tracks }
    }

    #[inline]
    pub fn formant_count(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.times.len()
    }

    /// Frequency of formant `n` (1-based, as in F1/F2/F3) at `time`.
    pub fn value_at(&self, n: usize, time: f64) -> Option<f64> {
        let track = self.tracks.get(n.checked_sub(1)?)?;
        sample_series(&self.times, track, time)
    }
}

/// Pitch and formant tracking capability consumed by the extractors.
///
/// Implementations are synchronous and safe to call concurrently on
/// independent waveforms.
pub trait AcousticAnalyzer {
    fn track_pitch(
        &self,
        wave: &Waveform,
        min_hz: f64,
        max_hz: f64,
        step_seconds: f64,
    ) -> Result<PitchTrace>;

    fn track_formants(
        &self,
        wave: &Waveform,
        formant_count: usize,
        ceiling_hz: f64,
        window_seconds: f64,
        step_seconds: f64,
    ) -> Result<FormantTracks>;
}

/// Production analyzer backed by real signal estimators: pYIN-based F0
/// tracking and Burg-LPC formant estimation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalAnalyzer;

impl SignalAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl AcousticAnalyzer for SignalAnalyzer {
    fn track_pitch(
        &self,
        wave: &Waveform,
        min_hz: f64,
        max_hz: f64,
        step_seconds: f64,
    ) -> Result<PitchTrace> {
        pitch::track(wave, min_hz, max_hz, step_seconds)
    }

    fn track_formants(
        &self,
        wave: &Waveform,
        formant_count: usize,
        ceiling_hz: f64,
        window_seconds: f64,
        step_seconds: f64,
    ) -> Result<FormantTracks> {
        formant::track(wave, formant_count, ceiling_hz, window_seconds, step_seconds)
    }
}

/// Test double returning pre-registered traces, keyed by waveform
/// duration. Lets scoring-policy tests pin exact provider output without
/// touching the estimators.
#[derive(Debug, Clone, Default)]
pub struct SyntheticAnalyzer {
    pitches: Vec<(f64, Vec<Option<f64>>)>,
    formants: Vec<(f64, Vec<Vec<Option<f64>>>)>,
}

impl SyntheticAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the pitch trace returned for waveforms of `duration`.
    pub fn with_pitch(mut self, duration: f64, values: Vec<Option<f64>>) -> Self {
        self.pitches.push((duration, values));
        self
    }

    /// Register the formant tracks returned for waveforms of `duration`.
    pub fn with_formants(mut self, duration: f64, tracks: Vec<Vec<Option<f64>>>) -> Self {
        self.formants.push((duration, tracks));
        self
    }

    fn spread_times(duration: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| duration * i as f64 / len.max(1) as f64)
            .collect()
    }
}

impl AcousticAnalyzer for SyntheticAnalyzer {
    fn track_pitch(
        &self,
        wave: &Waveform,
        _min_hz: f64,
        _max_hz: f64,
        _step_seconds: f64,
    ) -> Result<PitchTrace> {
        let duration = wave.duration();
        match self
            .pitches
            .iter()
            .find(|(d, _)| (d - duration).abs() < 1e-3)
        {
            Some((_, values)) => Ok(PitchTrace::new(
                Self::spread_times(duration, values.len()),
                values.clone(),
            )),
            None => bail!("no synthetic pitch trace registered for duration {duration:.3}"),
        }
    }

    fn track_formants(
        &self,
        wave: &Waveform,
        formant_count: usize,
        _ceiling_hz: f64,
        _window_seconds: f64,
        _step_seconds: f64,
    ) -> Result<FormantTracks> {
        let duration = wave.duration();
        match self
            .formants
            .iter()
            .find(|(d, _)| (d - duration).abs() < 1e-3)
        {
            Some((_, tracks)) => {
                let frame_count = tracks.first().map(|t| t.len()).unwrap_or(0);
                let mut tracks = tracks.clone();
                tracks.truncate(formant_count);
                Ok(FormantTracks::new(
                    Self::spread_times(duration, frame_count),
                    tracks,
                ))
            }
            None => bail!("no synthetic formant tracks registered for duration {duration:.3}"),
        }
    }
}

/// Sample a time-indexed optional series at `time`, assuming a uniform
/// grid. Linear interpolation when both neighbors are defined, the
/// defined neighbor otherwise, `None` outside the grid (with half a step
/// of slack at either edge).
fn sample_series(times: &[f64], values: &[Option<f64>], time: f64) -> Option<f64> {
    let first = *times.first()?;
    let last = *times.last()?;
    if times.len() == 1 {
        return values[0];
    }
    let step = (last - first) / (times.len() - 1) as f64;
    if step <= 0.0 {
        return values[0];
    }
    if time < first - 0.5 * step || time > last + 0.5 * step {
        return None;
    }
    let position = ((time - first) / step).clamp(0.0, (times.len() - 1) as f64);
    let lower = position.floor() as usize;
    let upper = (lower + 1).min(times.len() - 1);
    let frac = position - lower as f64;
    match (values[lower], values[upper]) {
        (Some(a), Some(b)) => Some(a * (1.0 - frac) + b * frac),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}
