//! Run configuration

use std::path::PathBuf;
use std::time::Duration;

/// Side file that collects `<file name>: <error>` lines
pub const DEFAULT_ERROR_LOG: &str = "bad.txt";

/// Configuration for one batch run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Folder holding the audio files
    pub input_dir: PathBuf,

    /// CSV report destination (truncated at start)
    pub csv_path: PathBuf,

    /// Failure log (appended, never cleared)
    pub error_log_path: PathBuf,

    /// Worker thread count (None = hardware parallelism minus one)
    pub threads: Option<usize>,

    /// Descend into subfolders
    pub recursive: bool,

    /// How often the progress indicator is refreshed
    pub progress_interval: Duration,

    /// Draw the progress bar and per-file lines on the terminal
    pub show_progress: bool,
}

impl RunConfig {
    /// Create a new run configuration
    pub fn new(input_dir: PathBuf, csv_path: PathBuf) -> Self {
        Self {
            input_dir,
            csv_path,
            error_log_path: PathBuf::from(DEFAULT_ERROR_LOG),
            threads: None,
            recursive: false,
            progress_interval: Duration::from_millis(250),
            show_progress: true,
        }
    }

    pub fn with_error_log(mut self, path: PathBuf) -> Self {
        self.error_log_path = path;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Effective worker count, never less than one
    pub fn worker_count(&self) -> usize {
        self.threads
            .unwrap_or_else(super::pool::default_worker_count)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::new(PathBuf::from("in"), PathBuf::from("out.csv"));
        assert_eq!(config.error_log_path, PathBuf::from("bad.txt"));
        assert!(!config.recursive);
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn test_zero_threads_clamped() {
        let config = RunConfig::new(PathBuf::from("in"), PathBuf::from("out.csv")).with_threads(0);
        assert_eq!(config.worker_count(), 1);
    }
}
