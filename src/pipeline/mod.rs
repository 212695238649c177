//! Per-file conversion pipeline and the directory watcher driving it.
//!
//! A created file goes through read → parse → validate → filter → emit.
//! Every step that gives up on a file logs why and returns a
//! [`FileOutcome`]; nothing a single file does can stop the watcher.

pub mod watcher;

#[cfg(test)]
pub mod tests;

pub use self::watcher::DirectoryWatcher;

use crate::config::WatcherConfig;
use crate::constants::DEFAULT_SETTLE_DELAY_MS;
use crate::emitter::JsonEmitter;
use crate::error::{Result, WatchError};
use crate::filter::{AllowList, ProgramFilter};
use crate::models::{FileOutcome, MeasurementRecord};
use crate::parser::parse_measurement;
use crate::reader::{RetryPolicy, read_lines_with_retry};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Converts one measurement file at a time
#[derive(Debug, Clone)]
pub struct WatchPipeline {
    filter: ProgramFilter,
    emitter: JsonEmitter,
    retry_policy: RetryPolicy,
    settle_delay: Duration,
}

impl WatchPipeline {
    /// Create a pipeline with default timing
    pub fn new(allow_list: AllowList, output_folder: PathBuf) -> Self {
        Self {
            filter: ProgramFilter::new(allow_list),
            emitter: JsonEmitter::new(output_folder),
            retry_policy: RetryPolicy::default(),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
        }
    }

    /// Create a pipeline from a validated configuration
    pub fn from_config(config: &WatcherConfig) -> Self {
        Self::new(config.allow_list.clone(), config.output_folder.clone())
            .with_retry_policy(config.retry_policy)
            .with_settle_delay(config.settle_delay)
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Run a newly created file through the whole pipeline
    pub async fn process_file(&self, path: &Path) -> FileOutcome {
        info!("Processing file: {}", path.display());

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        let record = match self.load_record(path).await {
            Ok(record) => record,
            Err(e @ WatchError::ParseIncomplete { .. }) => {
                warn!("{}", e);
                return FileOutcome::Incomplete;
            }
            Err(e) => {
                error!("{}", e);
                return FileOutcome::ReadFailed;
            }
        };

        if !self.filter.accept(record.program_number) {
            info!(
                "Program number {} is not in filter list {}, skipping {}",
                record.program_number,
                self.filter.allow_list(),
                path.display()
            );
            return FileOutcome::FilteredOut {
                program: record.program_number,
            };
        }

        match self.emitter.emit(&record).await {
            Ok(output) => {
                info!("Saved curve {} to {}", record.serial_number, output.display());
                FileOutcome::Emitted { output }
            }
            Err(e) => {
                error!("{}", e);
                FileOutcome::WriteFailed
            }
        }
    }

    /// Read and parse a file, rejecting records that cannot be emitted
    pub async fn load_record(&self, path: &Path) -> Result<MeasurementRecord> {
        let lines = read_lines_with_retry(path, &self.retry_policy).await?;
        let (record, summary) = parse_measurement(&lines);

        debug!(
            "Parsed {}: serial='{}', program={}, sentinel={}, rows accepted={}, skipped={}",
            path.display(),
            record.serial_number,
            record.program_number,
            summary.sentinel_seen,
            summary.rows_accepted,
            summary.rows_skipped
        );

        match record.incompleteness() {
            Some(reason) => Err(WatchError::ParseIncomplete {
                path: path.to_path_buf(),
                reason: reason.to_string(),
            }),
            None => Ok(record),
        }
    }
}
