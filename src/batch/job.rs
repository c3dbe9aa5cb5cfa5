//! Per-file analysis job: decode, estimate key and tempo, report

use super::pool::{panic_message, Job};
use super::report::ReportSink;
use crate::analysis::TrackAnalyzer;
use crate::decode::decode_audio;
use crate::model::{JobResult, TrackReport};
use anyhow::Result;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Collaborators shared by every job of a run
pub struct JobContext {
    sink: ReportSink,
    analyzer: Box<dyn TrackAnalyzer>,
}

impl JobContext {
    pub fn new(sink: ReportSink, analyzer: Box<dyn TrackAnalyzer>) -> Self {
        Self { sink, analyzer }
    }

    pub fn sink(&self) -> &ReportSink {
        &self.sink
    }
}

/// Lifecycle of one job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Decoding,
    Analyzing,
    Reported,
    Failed,
}

/// One file's compressed bytes and the work to turn them into a report row
pub struct AnalysisJob {
    file_name: String,
    compressed: Vec<u8>,
    state: JobState,
    context: Arc<JobContext>,
}

impl AnalysisJob {
    pub fn new(file_name: String, compressed: Vec<u8>, context: Arc<JobContext>) -> Self {
        Self {
            file_name,
            compressed,
            state: JobState::Pending,
            context,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Run the job to completion and write its result.
    ///
    /// Every failure, including a panic inside a collaborator, ends up as a
    /// [`JobResult::Failure`] line in the failure log.
    pub fn execute(mut self) -> (JobState, JobResult) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.analyze()));

        let result = match outcome {
            Ok(Ok(report)) => JobResult::Success(report),
            Ok(Err(e)) => JobResult::Failure {
                file_name: self.file_name.clone(),
                message: format!("{:#}", e),
            },
            Err(payload) => JobResult::Failure {
                file_name: self.file_name.clone(),
                message: format!("analysis panicked: {}", panic_message(payload.as_ref())),
            },
        };

        self.transition(if result.is_success() {
            JobState::Reported
        } else {
            JobState::Failed
        });

        if let JobResult::Failure { message, .. } = &result {
            log::warn!("Failed to analyze {}: {}", result.file_name(), message);
        }

        if let Err(e) = self.context.sink.record(&result) {
            log::error!("Result for {} was lost: {:#}", self.file_name, e);
        }

        (self.state, result)
    }

    fn analyze(&mut self) -> Result<TrackReport> {
        self.transition(JobState::Decoding);
        let decoded = decode_audio(std::mem::take(&mut self.compressed))?;

        self.transition(JobState::Analyzing);
        let estimate = self
            .context
            .analyzer
            .analyze(&decoded.samples, decoded.sample_rate)?;

        log::debug!(
            "{}: key={}, tempo={:.2} BPM, {}s at {}Hz",
            self.file_name,
            estimate.key.map(|k| k.name()).unwrap_or("unknown"),
            estimate.tempo_bpm,
            decoded.duration_secs(),
            decoded.sample_rate
        );

        Ok(TrackReport {
            file_name: self.file_name.clone(),
            duration_secs: decoded.duration_secs(),
            sample_rate: decoded.sample_rate,
            key: estimate.key,
            tempo_bpm: estimate.tempo_bpm,
        })
    }

    fn transition(&mut self, next: JobState) {
        log::debug!("{}: {:?} -> {:?}", self.file_name, self.state, next);
        self.state = next;
    }
}

impl Job for AnalysisJob {
    fn run(self) {
        self.execute();
    }
}
