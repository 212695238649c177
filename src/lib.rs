//! Curve Watcher Library
//!
//! Watches a directory for measurement files written by a tensile/compression
//! testing instrument and converts each accepted curve into a JSON document.
//!
//! This library provides tools for:
//! - Reading files that may still be held open by the instrument software
//! - Parsing the instrument's `;`-delimited header/data format
//! - Filtering curves by measuring program number
//! - Writing `CurveId` / `x_vals` / `y_vals` JSON documents
//! - Driving all of the above from directory creation events

pub mod cli;
pub mod config;
pub mod constants;
pub mod emitter;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod reader;

pub use config::WatcherConfig;
pub use error::{Result, WatchError};
pub use filter::{AllowList, ProgramFilter};
pub use models::{CurveDocument, FileOutcome, MeasurementRecord, ProcessingStats, Sample};
pub use pipeline::{DirectoryWatcher, WatchPipeline};
