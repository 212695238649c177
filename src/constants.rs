//! Application constants for the curve watcher
//!
//! Markers of the instrument's CSV dialect, timing policy for file access,
//! and default values for configuration.

use std::time::Duration;

// =============================================================================
// Input Format Markers
// =============================================================================

/// Header line carrying the tested part's serial number
pub const SERIAL_NUMBER_PREFIX: &str = "Part serial number;";

/// Header line carrying the measuring program number
pub const PROGRAM_NUMBER_PREFIX: &str = "Measuring program number;";

/// Column-header sentinel that starts the sample data section
pub const DATA_SECTION_SENTINEL: &str = "s;mm;KN";

/// Field delimiter used throughout the input files
pub const FIELD_DELIMITER: char = ';';

/// Minimum number of fields a data row needs to be considered
pub const MIN_DATA_FIELDS: usize = 4;

/// Field index of the x value (travel, mm) within a data row
pub const X_FIELD_INDEX: usize = 1;

/// Field index of the y value (force, kN) within a data row
pub const Y_FIELD_INDEX: usize = 2;

/// Program number assumed when the header is missing or unparseable
pub const DEFAULT_PROGRAM_NUMBER: i32 = 0;

// =============================================================================
// File Access Timing
// =============================================================================

/// Number of read attempts before a file is considered locked
pub const READ_RETRY_ATTEMPTS: u32 = 10;

/// Fixed pause between read attempts
pub const READ_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Default pause before the first read of a newly created file (ms)
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;

// =============================================================================
// Watching and Output
// =============================================================================

/// Default filename filter for watched files
pub const DEFAULT_FILE_PATTERN: &str = "*.csv";

/// Capacity of the queue between the watch callback and the consumer
pub const EVENT_QUEUE_CAPACITY: usize = 256;

/// Timestamp format appended to output file names (yyyyMMddHHmmss)
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Extension of emitted documents
pub const OUTPUT_EXTENSION: &str = "json";

/// Characters replaced with `_` when a serial number becomes a file name
pub const INVALID_FILE_NAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

// =============================================================================
// Configuration Lookup
// =============================================================================

/// Application name used for the user config directory
pub const APP_NAME: &str = "curve-watcher";

/// Configuration file name looked up beside the executable and in the config dir
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Date format of daily log file names
pub const LOG_FILE_DATE_FORMAT: &str = "%Y-%m-%d";
