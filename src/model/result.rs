use super::MusicalKey;

/// Successful analysis of one file
#[derive(Debug, Clone, PartialEq)]
pub struct TrackReport {
    /// File stem (name without directory or extension)
    pub file_name: String,

    /// Duration in whole seconds
    pub duration_secs: u64,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Detected key (None if undetermined)
    pub key: Option<MusicalKey>,

    /// Detected tempo in beats per minute
    pub tempo_bpm: f32,
}

impl TrackReport {
    pub fn key_label(&self) -> &'static str {
        self.key.map(|k| k.label()).unwrap_or("")
    }

    pub fn tempo_label(&self) -> String {
        format!("{:.2}", self.tempo_bpm)
    }
}

/// Outcome of one analysis job; exactly one is produced per submitted file
#[derive(Debug, Clone, PartialEq)]
pub enum JobResult {
    Success(TrackReport),
    Failure { file_name: String, message: String },
}

impl JobResult {
    pub fn file_name(&self) -> &str {
        match self {
            JobResult::Success(report) => &report.file_name,
            JobResult::Failure { file_name, .. } => file_name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobResult::Success(_))
    }
}
