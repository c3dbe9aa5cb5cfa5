//! Whole-run orchestration: scan, submit, show progress, summarize

use super::config::RunConfig;
use super::job::{AnalysisJob, JobContext};
use super::pool::{PoolError, WorkerPool};
use super::report::ReportSink;
use crate::analysis::TrackAnalyzer;
use crate::discovery::{read_file, scan_folder};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::thread;

/// Outcome of a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Jobs handed to the pool
    pub submitted: usize,
    /// Jobs finished (successfully or not)
    pub completed: usize,
    /// Rows written to the CSV report
    pub succeeded: u64,
    /// Lines written to the failure log, including unreadable files
    pub failed: u64,
    /// First infrastructure fault raised by the pool, if any
    pub fault: Option<PoolError>,
}

fn progress_bar(config: &RunConfig) -> ProgressBar {
    if !config.show_progress {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}%") {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

/// Record a file that could not be read; the run carries on either way
fn report_unreadable(sink: &ReportSink, file_name: &str, error: &anyhow::Error) {
    log::warn!("{:#}", error);
    if let Err(e) = sink.log_failure(file_name, &format!("{:#}", error)) {
        log::error!("Could not log failure for {}: {:#}", file_name, e);
    }
}

/// Analyze every file in the input folder.
///
/// Per-file failures never abort the run; they end up in the failure log.
/// Rows appear in completion order. Only setup problems (unwritable report,
/// missing folder, a worker that cannot start) are returned as errors.
pub fn run_batch(config: &RunConfig, analyzer: Box<dyn TrackAnalyzer>) -> Result<RunSummary> {
    log::info!(
        "Analyzing {:?} -> {:?} ({})",
        config.input_dir,
        config.csv_path,
        analyzer.name()
    );

    let sink = ReportSink::create(&config.csv_path, &config.error_log_path)?;
    let context = Arc::new(JobContext::new(sink, analyzer));

    let files = scan_folder(&config.input_dir, config.recursive)?;

    let pool: WorkerPool<AnalysisJob> =
        WorkerPool::new(config.worker_count()).context("Failed to start worker pool")?;
    log::info!("Using {} worker thread(s)", pool.capacity());

    let pb = progress_bar(config);

    for file in files {
        if config.show_progress {
            pb.println(file.path.display().to_string());
        }

        match read_file(&file.path) {
            Ok(bytes) => pool.submit(AnalysisJob::new(file.stem, bytes, Arc::clone(&context))),
            Err(e) => report_unreadable(context.sink(), &file.stem, &e),
        }
    }

    // Everything is queued, so from here the percentage only climbs
    while !pool.is_idle() {
        pb.set_position(u64::from(pool.progress_percent()));
        thread::sleep(config.progress_interval);
    }
    pb.set_position(u64::from(pool.progress_percent()));
    pb.finish_and_clear();

    let submitted = pool.total_submitted();
    let completed = pool.total_completed();
    let fault = pool.shutdown().err();

    let (succeeded, failed) = context.sink().counts();
    log::info!(
        "Run finished: {} succeeded, {} failed, {} of {} job(s) completed",
        succeeded,
        failed,
        completed,
        submitted
    );

    Ok(RunSummary {
        submitted,
        completed,
        succeeded,
        failed,
        fault,
    })
}
