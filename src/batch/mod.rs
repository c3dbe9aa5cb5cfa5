//! Batch orchestration: one decode-analyze-report job per file on a
//! fixed worker pool

pub mod config;
pub mod job;
pub mod pool;
pub mod report;
pub mod runner;

pub use config::RunConfig;
pub use job::{AnalysisJob, JobContext, JobState};
pub use pool::{default_worker_count, Job, PoolError, PoolSummary, WorkerPool};
pub use report::ReportSink;
pub use runner::{run_batch, RunSummary};
