#![allow(dead_code)]

use audio_batch_analyzer::analysis::{
    AnalysisError, DetectorPair, KeyDetector, TempoDetector, TrackAnalyzer,
};
use audio_batch_analyzer::model::{MusicalKey, SampleBuffer};
use std::fs;
use std::path::Path;

/// 16-bit mono PCM WAV file holding `samples`
pub fn mono_wav(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let data: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(&data);
    out
}

/// Write a two-second 8 kHz WAV whose samples all equal `level`
pub fn write_track(dir: &Path, name: &str, level: i16) {
    let samples = vec![level; 16_000];
    fs::write(dir.join(name), mono_wav(8000, &samples)).unwrap();
}

/// Always answers A minor
pub struct FixedKey;

impl KeyDetector for FixedKey {
    fn detect_key(
        &self,
        _samples: &SampleBuffer,
        _sample_rate: u32,
    ) -> Result<Option<MusicalKey>, AnalysisError> {
        Ok(Some(MusicalKey::AMinor))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Reports 128 BPM for tracks that start above zero, no beats otherwise
pub struct SignTempo;

impl TempoDetector for SignTempo {
    fn detect_tempo(&self, samples: &SampleBuffer, _sample_rate: u32) -> Result<f32, AnalysisError> {
        match samples.as_slice().first() {
            Some(&first) if first > 0.0 => Ok(128.0),
            _ => Err(AnalysisError::NotEnoughBeats),
        }
    }

    fn name(&self) -> &'static str {
        "sign"
    }
}

/// [`FixedKey`] and [`SignTempo`] behind the job's analyzer seam
pub fn stub_analyzer() -> Box<dyn TrackAnalyzer> {
    Box::new(DetectorPair::new(FixedKey, SignTempo))
}
