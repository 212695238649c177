//! Structured logging setup.
//!
//! Logs go to stderr, and optionally also to an append-only text file per
//! calendar day inside a log directory.

use crate::constants::LOG_FILE_DATE_FORMAT;
use crate::error::Result;
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;
use tracing_subscriber::fmt::MakeWriter;

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `level`.
pub fn setup_logging(level: &str, quiet: bool, log_dir: Option<&Path>) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("curve_watcher={}", level)));

    let file_layer = match log_dir {
        Some(dir) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(DailyLogWriter::new(dir)?),
        ),
        None => None,
    };

    if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", level);
    if let Some(dir) = log_dir {
        debug!("Appending daily logs to {}", dir.display());
    }
    Ok(())
}

/// Writer appending each log event to `<dir>/<yyyy-mm-dd>.log`
///
/// The date is taken from local time on every event, so a long-running
/// process moves on to a new file after midnight.
#[derive(Debug)]
pub struct DailyLogWriter {
    dir: PathBuf,
    current: Mutex<Option<(String, File)>>,
}

impl DailyLogWriter {
    /// Create the writer, creating `dir` if needed
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            current: Mutex::new(None),
        })
    }

    /// Append `buf` to the file for `date`, reopening when the date changed
    fn write_dated(&self, date: &str, buf: &[u8]) -> io::Result<()> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

        if current.as_ref().is_none_or(|(open_date, _)| open_date != date) {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.dir.join(daily_log_name(date)))?;
            *current = Some((date.to_string(), file));
        }

        match current.as_mut() {
            Some((_, file)) => file.write_all(buf),
            None => Ok(()),
        }
    }
}

/// Handle returned for each event by [`DailyLogWriter`]
pub struct DailyLogHandle<'a> {
    writer: &'a DailyLogWriter,
}

impl Write for DailyLogHandle<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let date = Local::now().format(LOG_FILE_DATE_FORMAT).to_string();
        self.writer.write_dated(&date, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for DailyLogWriter {
    type Writer = DailyLogHandle<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        DailyLogHandle { writer: self }
    }
}

fn daily_log_name(date: &str) -> String {
    format!("{}.log", date)
}
