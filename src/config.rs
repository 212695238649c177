//! Configuration management and validation.
//!
//! Settings come from an optional TOML file and are overridden by command
//! line flags. The merged values are validated once at startup and turned
//! into an immutable [`WatcherConfig`].
//!
//! ```toml
//! [settings]
//! watch_folder = "D:/tester/export"
//! output_folder = "D:/tester/json"
//! filter = "7, 12"
//! ```

use crate::constants::{APP_NAME, CONFIG_FILE_NAME, DEFAULT_FILE_PATTERN, DEFAULT_SETTLE_DELAY_MS};
use crate::error::{Result, WatchError};
use crate::filter::AllowList;
use crate::reader::RetryPolicy;
use glob::{MatchOptions, Pattern};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// On-disk layout of the configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub settings: Settings,
}

/// Raw, unvalidated settings from either the config file or the command line
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory watched for new measurement files
    pub watch_folder: Option<PathBuf>,
    /// Directory JSON documents are written to
    pub output_folder: Option<PathBuf>,
    /// Comma-separated program numbers to convert
    pub filter: Option<String>,
    /// Glob matched against created file names
    pub file_pattern: Option<String>,
    /// Pause before the first read of a new file
    pub settle_delay_ms: Option<u64>,
    /// Directory for daily text log files
    pub log_dir: Option<PathBuf>,
}

impl Settings {
    /// Layer `overrides` on top of `self`; values present in `overrides` win
    pub fn merge(self, overrides: Settings) -> Settings {
        Settings {
            watch_folder: overrides.watch_folder.or(self.watch_folder),
            output_folder: overrides.output_folder.or(self.output_folder),
            filter: overrides.filter.or(self.filter),
            file_pattern: overrides.file_pattern.or(self.file_pattern),
            settle_delay_ms: overrides.settle_delay_ms.or(self.settle_delay_ms),
            log_dir: overrides.log_dir.or(self.log_dir),
        }
    }
}

/// Validated configuration the watcher runs with
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub watch_folder: PathBuf,
    pub output_folder: PathBuf,
    pub allow_list: AllowList,
    pub file_pattern: Pattern,
    pub settle_delay: Duration,
    pub retry_policy: RetryPolicy,
    pub log_dir: Option<PathBuf>,
}

impl WatcherConfig {
    /// Create a configuration with default timing and the `*.csv` filter
    pub fn new(watch_folder: PathBuf, output_folder: PathBuf, allow_list: AllowList) -> Self {
        Self {
            watch_folder,
            output_folder,
            allow_list,
            file_pattern: default_pattern(),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            retry_policy: RetryPolicy::default(),
            log_dir: None,
        }
    }

    /// Build from merged settings, failing on anything required that is missing
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let watch_folder = settings
            .watch_folder
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| WatchError::configuration("watch_folder is not configured"))?;
        let output_folder = settings
            .output_folder
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| WatchError::configuration("output_folder is not configured"))?;

        let allow_list: AllowList = match settings.filter {
            Some(filter) => filter.parse().unwrap_or_default(),
            None => AllowList::default(),
        };

        let mut config = Self::new(watch_folder, output_folder, allow_list);

        if let Some(pattern) = settings.file_pattern {
            config.file_pattern = Pattern::new(&pattern).map_err(|e| {
                WatchError::configuration(format!("invalid file_pattern '{}': {}", pattern, e))
            })?;
        }
        if let Some(delay_ms) = settings.settle_delay_ms {
            config.settle_delay = Duration::from_millis(delay_ms);
        }
        config.log_dir = settings.log_dir;

        Ok(config)
    }

    /// Set the pause before the first read
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the read retry policy
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Check that the watched directory exists
    pub fn validate(&self) -> Result<()> {
        if !self.watch_folder.is_dir() {
            return Err(WatchError::configuration(format!(
                "watch_folder does not exist or is not a directory: {}",
                self.watch_folder.display()
            )));
        }

        if self.allow_list.is_empty() {
            warn!("Program filter is empty; no files will be converted");
        }

        Ok(())
    }

    /// Create the output directory if it does not exist yet
    pub async fn prepare_directories(&self) -> Result<()> {
        if !self.output_folder.exists() {
            info!("Creating output folder: {}", self.output_folder.display());
        }
        tokio::fs::create_dir_all(&self.output_folder).await?;
        Ok(())
    }

    /// Whether a path's file name matches the configured filter
    pub fn matches_file(&self, path: &Path) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::default()
        };

        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.file_pattern.matches_with(name, options))
    }
}

fn default_pattern() -> Pattern {
    Pattern::new(DEFAULT_FILE_PATTERN).unwrap_or_default()
}

/// Resolve which configuration file to read
///
/// An explicit path is always used. Otherwise `config.toml` beside the
/// executable is preferred over the user config directory.
pub fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)));
    let user_config = dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE_NAME));

    [beside_exe, user_config]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.is_file())
}

/// Read settings from a TOML configuration file
pub fn load_settings_file(path: &Path) -> Result<Settings> {
    if !path.is_file() {
        return Err(WatchError::configuration(format!(
            "configuration file not found: {}",
            path.display()
        )));
    }

    let text = std::fs::read_to_string(path)?;
    let file: ConfigFile = toml::from_str(&text).map_err(|source| WatchError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(file.settings)
}
