//! Resilient file reading.
//!
//! Instrument software may still hold a freshly created file open while the
//! watcher tries to read it. Reads are retried at a fixed interval until a
//! fixed attempt budget is spent.

use crate::constants::{READ_RETRY_ATTEMPTS, READ_RETRY_DELAY};
use crate::error::{Result, WatchError};
use encoding_rs::Encoding;
use std::borrow::Cow;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::debug;

/// Fixed-interval retry policy for file reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: READ_RETRY_ATTEMPTS,
            delay: READ_RETRY_DELAY,
        }
    }
}

/// Read a whole file as lines, retrying while it cannot be accessed
///
/// Every failed attempt is followed by `policy.delay`; once
/// `policy.attempts` reads have failed the file is reported as locked.
pub async fn read_lines_with_retry(path: &Path, policy: &RetryPolicy) -> Result<Vec<String>> {
    for attempt in 1..=policy.attempts {
        match fs::read(path).await {
            Ok(bytes) => return Ok(decode_lines(&bytes)),
            Err(e) => {
                debug!(
                    "Read attempt {}/{} failed for {}: {}",
                    attempt,
                    policy.attempts,
                    path.display(),
                    e
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }

    Err(WatchError::FileLocked {
        path: path.to_path_buf(),
        attempts: policy.attempts,
    })
}

/// Decode raw file content into lines
///
/// A UTF-8, UTF-16 or UTF-32 byte-order mark selects the encoding and is
/// dropped. Without one the content is read as UTF-8, replacing bad bytes.
fn decode_lines(bytes: &[u8]) -> Vec<String> {
    decode_text(bytes).lines().map(str::to_string).collect()
}

fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    // The UTF-32LE mark starts with the UTF-16LE one, so check it first
    if let Some(text) = decode_utf32(bytes) {
        return Cow::Owned(text);
    }
    match Encoding::for_bom(bytes) {
        Some((encoding, bom_length)) => {
            let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
            text
        }
        None => String::from_utf8_lossy(bytes),
    }
}

fn decode_utf32(bytes: &[u8]) -> Option<String> {
    let to_u32: fn([u8; 4]) -> u32 = match bytes.get(..4)? {
        [0xFF, 0xFE, 0x00, 0x00] => u32::from_le_bytes,
        [0x00, 0x00, 0xFE, 0xFF] => u32::from_be_bytes,
        _ => return None,
    };
    let text = bytes[4..]
        .chunks(4)
        .map(|chunk| {
            <[u8; 4]>::try_from(chunk)
                .ok()
                .map(to_u32)
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER)
        })
        .collect();
    Some(text)
}
