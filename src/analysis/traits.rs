//! Analysis trait definitions

use crate::model::{MusicalKey, SampleBuffer};
use thiserror::Error;

/// Insufficient or unusable signal for an estimate. Fatal to one file only.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no samples found")]
    NoSamples,

    #[error("unknown sample rate")]
    UnknownSampleRate,

    #[error("not enough beats found")]
    NotEnoughBeats,

    #[error("analysis backend failed: {0}")]
    Backend(String),
}

/// Musical key estimation over mono samples
pub trait KeyDetector: Send + Sync {
    /// Estimate the key. `Ok(None)` means the detector ran but could not
    /// settle on a key.
    fn detect_key(
        &self,
        samples: &SampleBuffer,
        sample_rate: u32,
    ) -> Result<Option<MusicalKey>, AnalysisError>;

    /// Get the name of this detector (for logging)
    fn name(&self) -> &'static str;
}

/// Tempo estimation over mono samples
pub trait TempoDetector: Send + Sync {
    /// Estimate beats per minute; fails when fewer than two beats are found
    fn detect_tempo(&self, samples: &SampleBuffer, sample_rate: u32) -> Result<f32, AnalysisError>;

    /// Get the name of this detector (for logging)
    fn name(&self) -> &'static str;
}

/// Key and tempo of one track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackEstimate {
    pub key: Option<MusicalKey>,
    pub tempo_bpm: f32,
}

/// Everything a job needs from analysis, in one call per buffer.
///
/// Backends that derive key and tempo from the same pass implement this
/// directly; independent detectors are combined with [`DetectorPair`].
pub trait TrackAnalyzer: Send + Sync {
    fn analyze(&self, samples: &SampleBuffer, sample_rate: u32) -> Result<TrackEstimate, AnalysisError>;

    /// Get the name of this analyzer (for logging)
    fn name(&self) -> String;
}

/// A key detector and a tempo detector run one after the other
pub struct DetectorPair<K, T> {
    key: K,
    tempo: T,
}

impl<K: KeyDetector, T: TempoDetector> DetectorPair<K, T> {
    pub fn new(key: K, tempo: T) -> Self {
        Self { key, tempo }
    }
}

impl<K: KeyDetector, T: TempoDetector> TrackAnalyzer for DetectorPair<K, T> {
    fn analyze(&self, samples: &SampleBuffer, sample_rate: u32) -> Result<TrackEstimate, AnalysisError> {
        let key = self.key.detect_key(samples, sample_rate)?;
        let tempo_bpm = self.tempo.detect_tempo(samples, sample_rate)?;
        Ok(TrackEstimate { key, tempo_bpm })
    }

    fn name(&self) -> String {
        format!("key: {}, tempo: {}", self.key.name(), self.tempo.name())
    }
}
