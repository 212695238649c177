//! JSON output for accepted measurement records.
//!
//! Each record becomes its own document, a single-element array holding the
//! curve, named after the part serial number and the local time of writing.

use crate::constants::{INVALID_FILE_NAME_CHARS, OUTPUT_EXTENSION, OUTPUT_TIMESTAMP_FORMAT};
use crate::error::{Result, WatchError};
use crate::models::{CurveDocument, MeasurementRecord};
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// Writes curve documents into the output directory
#[derive(Debug, Clone)]
pub struct JsonEmitter {
    output_folder: PathBuf,
}

impl JsonEmitter {
    pub fn new(output_folder: PathBuf) -> Self {
        Self { output_folder }
    }

    /// Write the record stamped with the current local time
    pub async fn emit(&self, record: &MeasurementRecord) -> Result<PathBuf> {
        self.emit_at(record, Local::now()).await
    }

    /// Write the record stamped with `timestamp`
    ///
    /// An existing file with the same name is overwritten.
    pub async fn emit_at<Tz>(
        &self,
        record: &MeasurementRecord,
        timestamp: DateTime<Tz>,
    ) -> Result<PathBuf>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let json = render_document(record)?;
        let path = self
            .output_folder
            .join(output_file_name(&record.serial_number, &timestamp));

        debug!(
            "Writing {} samples for {} to {}",
            record.samples.len(),
            record.serial_number,
            path.display()
        );

        fs::write(&path, json)
            .await
            .map_err(|source| WatchError::WriteFailure {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}

/// Pretty-printed JSON text for one record
pub fn render_document(record: &MeasurementRecord) -> Result<String> {
    let documents = [CurveDocument::from(record)];
    Ok(serde_json::to_string_pretty(&documents)?)
}

/// `{serial}_{yyyyMMddHHmmss}.json`, with unsafe file name characters replaced
pub fn output_file_name<Tz>(serial_number: &str, timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{}_{}.{}",
        sanitize_file_stem(serial_number),
        timestamp.format(OUTPUT_TIMESTAMP_FORMAT),
        OUTPUT_EXTENSION
    )
}

fn sanitize_file_stem(stem: &str) -> String {
    stem.chars()
        .map(|c| {
            if c.is_control() || INVALID_FILE_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sample;
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(serial: &str, samples: &[(f64, f64)]) -> MeasurementRecord {
        MeasurementRecord {
            serial_number: serial.to_string(),
            program_number: 7,
            samples: samples.iter().map(|&(x, y)| Sample { x, y }).collect(),
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
    }

    #[test]
    fn test_output_file_name_format() {
        assert_eq!(
            output_file_name("SN42", &fixed_time()),
            "SN42_20240305140709.json"
        );
    }

    #[test]
    fn test_output_file_name_replaces_path_characters() {
        assert_eq!(
            output_file_name("A/B\\C:D*?", &fixed_time()),
            "A_B_C_D___20240305140709.json"
        );
        assert_eq!(
            output_file_name("../x", &fixed_time()),
            ".._x_20240305140709.json"
        );
    }

    #[test]
    fn test_render_document_round_trip() {
        let json = render_document(&record("S1", &[(1.0, 2.0), (3.0, 4.5)])).unwrap();
        let parsed: Vec<CurveDocument> = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].curve_id, "S1");
        assert_eq!(parsed[0].x_vals, vec![1.0, 3.0]);
        assert_eq!(parsed[0].y_vals, vec![2.0, 4.5]);
    }

    #[test]
    fn test_render_document_is_indented() {
        let json = render_document(&record("S1", &[(1.0, 2.0)])).unwrap();

        assert!(json.starts_with("[\n  {\n    \"CurveId\": \"S1\""));
        assert!(json.contains("\"x_vals\": [\n      1.0\n    ]"));
    }

    #[tokio::test]
    async fn test_emit_writes_named_file() {
        let temp_dir = TempDir::new().unwrap();
        let emitter = JsonEmitter::new(temp_dir.path().to_path_buf());

        let path = emitter
            .emit_at(&record("SN42", &[(0.0, 0.0), (1.5, 3.2)]), fixed_time())
            .await
            .unwrap();

        assert_eq!(path, temp_dir.path().join("SN42_20240305140709.json"));
        let parsed: Vec<CurveDocument> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed[0].x_vals, vec![0.0, 1.5]);
        assert_eq!(parsed[0].y_vals, vec![0.0, 3.2]);
    }

    #[tokio::test]
    async fn test_emit_into_missing_folder_is_write_failure() {
        let temp_dir = TempDir::new().unwrap();
        let emitter = JsonEmitter::new(temp_dir.path().join("does-not-exist"));

        let result = emitter.emit(&record("S1", &[(1.0, 2.0)])).await;

        match result {
            Err(WatchError::WriteFailure { path, .. }) => {
                assert!(path.starts_with(temp_dir.path().join("does-not-exist")));
            }
            other => panic!("Expected WriteFailure error, got {:?}", other),
        }
    }
}
