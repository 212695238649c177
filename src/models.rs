//! Core data structures for curve processing.
//!
//! Defines the parsed measurement record, the JSON document shape written
//! for accepted records, per-file outcomes and run statistics.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One (x, y) point of a measured curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

/// Measurement extracted from a single instrument file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeasurementRecord {
    /// Serial number of the tested part; empty when the header was not found
    pub serial_number: String,
    /// Measuring program that produced the data
    pub program_number: i32,
    /// Samples in file order
    pub samples: Vec<Sample>,
}

impl MeasurementRecord {
    /// Whether the record carries enough data to be emitted
    pub fn is_usable(&self) -> bool {
        !self.serial_number.is_empty() && !self.samples.is_empty()
    }

    /// Explain why a record is not usable, if it isn't
    pub fn incompleteness(&self) -> Option<&'static str> {
        match (self.serial_number.is_empty(), self.samples.is_empty()) {
            (true, true) => Some("no serial number and no samples"),
            (true, false) => Some("no serial number"),
            (false, true) => Some("no samples"),
            (false, false) => None,
        }
    }

    pub fn x_values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.x).collect()
    }

    pub fn y_values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.y).collect()
    }
}

/// JSON shape of an emitted curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveDocument {
    #[serde(rename = "CurveId")]
    pub curve_id: String,
    pub x_vals: Vec<f64>,
    pub y_vals: Vec<f64>,
}

impl From<&MeasurementRecord> for CurveDocument {
    fn from(record: &MeasurementRecord) -> Self {
        Self {
            curve_id: record.serial_number.clone(),
            x_vals: record.x_values(),
            y_vals: record.y_values(),
        }
    }
}

/// Result of running one file through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// A JSON document was written
    Emitted { output: PathBuf },
    /// The file stayed locked for the whole retry budget
    ReadFailed,
    /// The record had no serial number or no samples
    Incomplete,
    /// The program number is not in the allow-list
    FilteredOut { program: i32 },
    /// The JSON document could not be written
    WriteFailed,
}

/// Counters accumulated over a watching session
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProcessingStats {
    pub files_seen: usize,
    pub files_emitted: usize,
    pub read_failures: usize,
    pub incomplete_records: usize,
    pub filtered_out: usize,
    pub write_failures: usize,
}

impl ProcessingStats {
    /// Account for the outcome of one file
    pub fn record(&mut self, outcome: &FileOutcome) {
        self.files_seen += 1;
        match outcome {
            FileOutcome::Emitted { .. } => self.files_emitted += 1,
            FileOutcome::ReadFailed => self.read_failures += 1,
            FileOutcome::Incomplete => self.incomplete_records += 1,
            FileOutcome::FilteredOut { .. } => self.filtered_out += 1,
            FileOutcome::WriteFailed => self.write_failures += 1,
        }
    }

    /// Files that were abandoned because of an error (filtering is not an error)
    pub fn files_failed(&self) -> usize {
        self.read_failures + self.incomplete_records + self.write_failures
    }
}
