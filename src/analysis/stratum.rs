//! Key and tempo detection using stratum-dsp

use super::traits::{AnalysisError, KeyDetector, TempoDetector, TrackAnalyzer, TrackEstimate};
use crate::model::{MusicalKey, SampleBuffer, SampleScale};
use std::borrow::Cow;
use stratum_dsp::{analyze_audio, AnalysisConfig, AnalysisResult, Key};

/// Full scale of a widened 16-bit sample
const I16_FULL_SCALE: f32 = 32768.0;

/// Run stratum-dsp over a sample buffer.
///
/// stratum-dsp expects [-1.0, 1.0] input, so integer-scale buffers are
/// rescaled here rather than in the decoder.
fn run_stratum(samples: &SampleBuffer, sample_rate: u32) -> Result<AnalysisResult, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::NoSamples);
    }
    if sample_rate == 0 {
        return Err(AnalysisError::UnknownSampleRate);
    }

    let input: Cow<'_, [f32]> = match samples.scale() {
        SampleScale::Unit => Cow::Borrowed(samples.as_slice()),
        SampleScale::Int16 => Cow::Owned(
            samples
                .as_slice()
                .iter()
                .map(|s| s / I16_FULL_SCALE)
                .collect(),
        ),
    };

    analyze_audio(&input, sample_rate, AnalysisConfig::default())
        .map_err(|e| AnalysisError::Backend(format!("{}", e)))
}

/// Key and tempo detection using stratum-dsp.
///
/// Audio is analyzed once per buffer; key and tempo both come out of that
/// single pass. Optionally folds the tempo into a BPM range by doubling or
/// halving.
#[derive(Debug, Default)]
pub struct StratumAnalyzer {
    bpm_range: Option<(f32, f32)>,
}

impl StratumAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold detected tempos into `min..=max`
    pub fn with_bpm_range(mut self, min: f32, max: f32) -> Self {
        self.bpm_range = Some((min, max));
        self
    }

    fn key_of(&self, result: &AnalysisResult) -> Option<MusicalKey> {
        // stratum-dsp reports C major with zero confidence when it gives up
        if result.key_confidence <= 0.0 {
            log::debug!("Key undetermined");
            return None;
        }

        let key = match result.key {
            Key::Major(pitch_class) => MusicalKey::from_pitch_class(pitch_class as usize, false),
            Key::Minor(pitch_class) => MusicalKey::from_pitch_class(pitch_class as usize, true),
        };

        if key.is_none() {
            log::warn!("Could not map key: {:?}", result.key);
        }
        key
    }

    fn tempo_of(&self, result: &AnalysisResult) -> Result<f32, AnalysisError> {
        if result.bpm <= 0.0 || result.beat_grid.beats.len() < 2 {
            return Err(AnalysisError::NotEnoughBeats);
        }

        let bpm = match self.bpm_range {
            Some((min, max)) => fold_into_range(result.bpm, min, max),
            None => result.bpm,
        };

        log::debug!(
            "Detected BPM: {:.2} (confidence: {:.2})",
            bpm,
            result.bpm_confidence
        );
        Ok(bpm)
    }
}

impl TrackAnalyzer for StratumAnalyzer {
    fn analyze(&self, samples: &SampleBuffer, sample_rate: u32) -> Result<TrackEstimate, AnalysisError> {
        log::debug!(
            "Analyzing with stratum-dsp ({} samples, {}Hz)",
            samples.len(),
            sample_rate
        );

        let result = run_stratum(samples, sample_rate)?;
        Ok(TrackEstimate {
            key: self.key_of(&result),
            tempo_bpm: self.tempo_of(&result)?,
        })
    }

    fn name(&self) -> String {
        "stratum-dsp".to_string()
    }
}

impl KeyDetector for StratumAnalyzer {
    fn detect_key(
        &self,
        samples: &SampleBuffer,
        sample_rate: u32,
    ) -> Result<Option<MusicalKey>, AnalysisError> {
        let result = run_stratum(samples, sample_rate)?;
        Ok(self.key_of(&result))
    }

    fn name(&self) -> &'static str {
        "stratum-dsp"
    }
}

impl TempoDetector for StratumAnalyzer {
    fn detect_tempo(&self, samples: &SampleBuffer, sample_rate: u32) -> Result<f32, AnalysisError> {
        let result = run_stratum(samples, sample_rate)?;
        self.tempo_of(&result)
    }

    fn name(&self) -> &'static str {
        "stratum-dsp"
    }
}

fn fold_into_range(mut bpm: f32, min_bpm: f32, max_bpm: f32) -> f32 {
    if min_bpm <= 0.0 || max_bpm <= 0.0 || bpm <= 0.0 {
        return bpm;
    }
    // Double BPM if below minimum
    while bpm < min_bpm && bpm * 2.0 <= max_bpm {
        bpm *= 2.0;
    }
    // Halve BPM if above maximum
    while bpm > max_bpm && bpm / 2.0 >= min_bpm {
        bpm /= 2.0;
    }
    bpm
}
