//! Serialized CSV report + failure log shared by all jobs

use crate::model::{JobResult, TrackReport};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const CSV_HEADER: [&str; 5] = ["File Name", "Duration", "Frequency", "Key", "Tempo"];

#[derive(Serialize)]
struct CsvRow<'a> {
    file_name: &'a str,
    duration: u64,
    frequency: u32,
    key: &'static str,
    tempo: String,
}

impl<'a> From<&'a TrackReport> for CsvRow<'a> {
    fn from(report: &'a TrackReport) -> Self {
        Self {
            file_name: &report.file_name,
            duration: report.duration_secs,
            frequency: report.sample_rate,
            key: report.key_label(),
            tempo: report.tempo_label(),
        }
    }
}

struct ReportState {
    csv: csv::Writer<File>,
    error_log_path: PathBuf,
    error_log: Option<File>,
    rows: u64,
    failures: u64,
}

/// Output shared by every job.
///
/// One lock covers both files and is held for a single row write only.
/// Rows land in completion order, not submission order.
pub struct ReportSink {
    state: Mutex<ReportState>,
}

impl ReportSink {
    /// Create the CSV file (writing its header) and remember where failures go.
    ///
    /// The failure log is opened in append mode on first use.
    pub fn create(csv_path: &Path, error_log_path: &Path) -> Result<Self> {
        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(csv_path)
            .with_context(|| format!("Failed to create CSV report: {:?}", csv_path))?;

        csv.write_record(CSV_HEADER)
            .with_context(|| format!("Failed to write CSV header: {:?}", csv_path))?;
        csv.flush()
            .with_context(|| format!("Failed to write CSV header: {:?}", csv_path))?;

        Ok(Self {
            state: Mutex::new(ReportState {
                csv,
                error_log_path: error_log_path.to_path_buf(),
                error_log: None,
                rows: 0,
                failures: 0,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, ReportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write a job's result: a CSV row on success, a failure line otherwise.
    ///
    /// A row that cannot be written is logged as a failure instead, so every
    /// file still leaves exactly one trace.
    pub fn record(&self, result: &JobResult) -> Result<()> {
        match result {
            JobResult::Success(report) => self.write_row(report).or_else(|e| {
                log::warn!("Could not write CSV row for {}: {:#}", report.file_name, e);
                self.log_failure(&report.file_name, &format!("cannot write report row: {:#}", e))
            }),
            JobResult::Failure { file_name, message } => self.log_failure(file_name, message),
        }
    }

    /// Append one CSV row and flush it
    pub fn write_row(&self, report: &TrackReport) -> Result<()> {
        let mut state = self.lock();
        state
            .csv
            .serialize(CsvRow::from(report))
            .context("Failed to write CSV row")?;
        state.csv.flush().context("Failed to flush CSV report")?;
        state.rows += 1;
        Ok(())
    }

    /// Append `<file name>: <message>` to the failure log
    pub fn log_failure(&self, file_name: &str, message: &str) -> Result<()> {
        let mut state = self.lock();
        let state = &mut *state;

        let file = match state.error_log.take() {
            Some(file) => file,
            None => OpenOptions::new()
                .create(true)
                .append(true)
                .open(&state.error_log_path)
                .with_context(|| format!("Failed to open failure log: {:?}", state.error_log_path))?,
        };
        let log = state.error_log.insert(file);

        writeln!(log, "{}: {}", file_name, message).context("Failed to write failure log")?;
        state.failures += 1;
        Ok(())
    }

    /// (rows written, failures logged) so far
    pub fn counts(&self) -> (u64, u64) {
        let state = self.lock();
        (state.rows, state.failures)
    }
}
