//! Scenario tests for the conversion pipeline
//!
//! Exercise complete file passes against temporary watch/output directories.


use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pipeline::WatchPipeline;
use crate::reader::RetryPolicy;
use crate::filter::AllowList;

/// Reference file from the instrument documentation
pub const SN42_CSV: &str = "Part serial number;SN42\n\
                            Measuring program number;7\n\
                            s;mm;KN\n\
                            0;0.0;0.0;x\n\
                            1;1.5;3.2;x\n";

/// Pipeline without settle delay and with a short retry budget
pub fn fast_pipeline(programs: &[i32], output: &Path) -> WatchPipeline {
    WatchPipeline::new(AllowList::new(programs.iter().copied()), output.to_path_buf())
        .with_settle_delay(Duration::ZERO)
        .with_retry_policy(RetryPolicy {
            attempts: 3,
            delay: Duration::from_millis(5),
        })
}

/// JSON files currently in `dir`
pub fn json_outputs(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}
