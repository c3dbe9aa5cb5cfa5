//! Audio Batch Analyzer - key, tempo and duration reports for a folder of audio files
//!
//! Each file is read into memory, decoded from that buffer to mono PCM,
//! run through key and tempo detection, and reported as one CSV row (or one
//! line in the failure log). Files are processed concurrently on a fixed
//! worker pool.

pub mod analysis;
pub mod batch;
pub mod decode;
pub mod discovery;
pub mod model;

pub use batch::config::RunConfig;
pub use batch::runner::{run_batch, RunSummary};
