//! Verification replay of a chain file.
//!
//! A scan reads a segment line by line, verifies every record against the
//! key derived from its own `uid`, and collects failures instead of
//! aborting. Tampering with any persisted byte -- a payload value, a
//! timestamp, the signature itself -- shows up as a failure on that line.

use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;
use tracing::warn;

use omni_sign::Signer;

use crate::error::ChainError;

/// Why a line failed the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanReason {
    /// The line is not valid JSON.
    Corrupt,
    /// The record has no `uid` field.
    MissingUid,
    /// The record's signature does not verify.
    BadSignature,
}

impl core::fmt::Display for ScanReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Corrupt => "corrupt line",
            Self::MissingUid => "missing uid",
            Self::BadSignature => "bad signature",
        };
        write!(f, "{name}")
    }
}

/// One failed line in a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    /// 1-based line number within the segment.
    pub line: usize,
    /// Why the line failed.
    pub reason: ScanReason,
}

/// Outcome of replaying one chain segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Number of non-empty lines examined.
    pub total: usize,
    /// Number of records whose signature verified.
    pub verified: usize,
    /// Lines that failed, in file order.
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    /// Whether every record in the segment verified.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Replay a chain segment, verifying every record.
///
/// # Errors
///
/// Returns [`ChainError::Io`] only when the file itself cannot be read.
/// Per-line problems are reported in the [`ScanReport`], never as errors.
pub fn scan_file(segment: &Path) -> Result<ScanReport, ChainError> {
    let reader = BufReader::new(std::fs::File::open(segment)?);
    let mut report = ScanReport::default();
    let mut line_no: usize = 0;

    for line in reader.lines() {
        let line = line?;
        line_no = line_no.saturating_add(1);
        if line.trim().is_empty() {
            continue;
        }
        report.total = report.total.saturating_add(1);

        match check_line(&line) {
            Ok(()) => report.verified = report.verified.saturating_add(1),
            Err(reason) => {
                warn!(line = line_no, %reason, "chain record failed verification");
                report.failures.push(ScanFailure {
                    line: line_no,
                    reason,
                });
            }
        }
    }

    Ok(report)
}

/// Verify a single chain line.
fn check_line(line: &str) -> Result<(), ScanReason> {
    let Ok(record) = serde_json::from_str::<Value>(line) else {
        return Err(ScanReason::Corrupt);
    };
    let Some(uid) = record.get("uid").and_then(Value::as_str) else {
        return Err(ScanReason::MissingUid);
    };
    if Signer::for_uid(uid).verify_value(&record).is_ok() {
        Ok(())
    } else {
        Err(ScanReason::BadSignature)
    }
}
