//! Command-line interface components.

use crate::config::Settings;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "curve-watcher")]
#[command(about = "Watch a folder for tester CSV files and convert accepted curves to JSON")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Configuration file (TOML); defaults to config.toml beside the executable
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Folder watched for new measurement files
    #[arg(short, long, value_name = "PATH")]
    pub watch_folder: Option<PathBuf>,

    /// Folder JSON documents are written to (created if missing)
    #[arg(short, long, value_name = "PATH")]
    pub output_folder: Option<PathBuf>,

    /// Comma-separated measuring program numbers to convert, e.g. "7,12"
    #[arg(short, long, value_name = "LIST")]
    pub filter: Option<String>,

    /// File name pattern to react to
    #[arg(long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Pause before reading a newly created file, in milliseconds
    #[arg(long, value_name = "MS")]
    pub settle_delay_ms: Option<u64>,

    /// Folder for daily log files in addition to stderr
    #[arg(long, value_name = "PATH")]
    pub log_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Settings given on the command line, to be layered over the config file
    pub fn settings_overrides(&self) -> Settings {
        Settings {
            watch_folder: self.watch_folder.clone(),
            output_folder: self.output_folder.clone(),
            filter: self.filter.clone(),
            file_pattern: self.pattern.clone(),
            settle_delay_ms: self.settle_delay_ms,
            log_dir: self.log_dir.clone(),
        }
    }

    /// Log level derived from the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
