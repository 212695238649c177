//! Error handling for curve watching operations.
//!
//! Provides error types with context for configuration, file access,
//! record validation and JSON output failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File watching error: {0}")]
    Watch(#[from] notify::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration file could not be parsed: {path} - {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("File is in use and could not be read after {attempts} attempts: {path}")]
    FileLocked { path: PathBuf, attempts: u32 },

    #[error("Incomplete measurement record in file: {path} - {reason}")]
    ParseIncomplete { path: PathBuf, reason: String },

    #[error("Failed to write JSON output: {path} - {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WatchError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;
