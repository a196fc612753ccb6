//! The append-only chain store.
//!
//! One JSON-lines file per UTC day, named `reflect-YYYYMMDD.jsonl` inside
//! the store directory. Records are written in canonical form (sorted
//! keys, compact separators) so a file's bytes are reproducible from its
//! data, and every record is verified before it is written.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::debug;

use omni_sign::{Signer, canonical_json};
use omni_types::SignedEvent;

use crate::error::ChainError;

/// File name prefix for chain segments.
const FILE_PREFIX: &str = "reflect";

/// An append-only store of signed records, rotated daily.
#[derive(Debug, Clone)]
pub struct ChainStore {
    dir: PathBuf,
}

impl ChainStore {
    /// Open a chain store rooted at `dir`, creating the directory if it
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ChainError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The directory holding the chain files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the chain segment for a given UTC date.
    pub fn segment_for(&self, date: NaiveDate) -> PathBuf {
        let name = format!("{FILE_PREFIX}-{}.jsonl", date.format("%Y%m%d"));
        self.dir.join(name)
    }

    /// Path of today's chain segment (UTC).
    pub fn current_segment(&self) -> PathBuf {
        self.segment_for(Utc::now().date_naive())
    }

    /// Append a signed event to today's segment.
    ///
    /// The event's signature is verified against the key derived from its
    /// own `uid` before anything touches disk.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Rejected`] when verification fails, or
    /// [`ChainError::Io`] when the write fails.
    pub fn append_event(&self, event: &SignedEvent) -> Result<PathBuf, ChainError> {
        omni_sign::verify_event(event)?;
        let value = serde_json::to_value(event)?;
        self.append_line(&value)
    }

    /// Append any signed JSON record to today's segment.
    ///
    /// The record must be an object carrying a string `uid` field and a
    /// `sig` that verifies under the key derived from that uid.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::MissingUid`] when the record carries no uid,
    /// [`ChainError::Rejected`] when verification fails, or
    /// [`ChainError::Io`] when the write fails.
    pub fn append_record(&self, record: &Value) -> Result<PathBuf, ChainError> {
        let Some(uid) = record.get("uid").and_then(Value::as_str) else {
            return Err(ChainError::MissingUid);
        };
        Signer::for_uid(uid).verify_value(record)?;
        self.append_line(record)
    }

    /// Return the last `n` records of a segment, oldest first.
    ///
    /// Lines that do not parse as JSON are skipped; [`scan`](crate::scan)
    /// is the tool for finding them.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Io`] if the file cannot be read. A missing
    /// segment yields an empty vector, not an error.
    pub fn tail(&self, segment: &Path, n: usize) -> Result<Vec<Value>, ChainError> {
        if !segment.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(std::fs::File::open(segment)?);
        let mut records: Vec<Value> = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(value) = serde_json::from_str::<Value>(&line) {
                records.push(value);
            }
        }
        let skip = records.len().saturating_sub(n);
        Ok(records.split_off(skip))
    }

    /// Write one canonical JSON line to today's segment.
    fn append_line(&self, record: &Value) -> Result<PathBuf, ChainError> {
        let segment = self.current_segment();
        let line = canonical_json(record)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&segment)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;

        debug!(segment = %segment.display(), "record chained");
        Ok(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omni_types::EventKind;

    fn signed_event(signer: &Signer, text: &str) -> SignedEvent {
        let mut event = SignedEvent::unsigned(
            signer.uid(),
            EventKind::Chat,
            "test-host",
            "general",
            1_700_000_000,
            7,
            serde_json::json!({"text": text}),
        );
        assert!(signer.sign_event(&mut event).is_ok());
        event
    }

    #[test]
    fn append_then_tail_roundtrips() {
        let Ok(dir) = tempfile::tempdir() else { return };
        let store = ChainStore::open(dir.path());
        assert!(store.is_ok());
        let Ok(store) = store else { return };

        let signer = Signer::for_uid("UID-TEST");
        let segment = store.append_event(&signed_event(&signer, "one"));
        assert!(segment.is_ok());
        let _ = store.append_event(&signed_event(&signer, "two"));

        let records = store
            .tail(&store.current_segment(), 10)
            .unwrap_or_default();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records.first().and_then(|r| r.pointer("/payload/text")),
            Some(&serde_json::json!("one"))
        );
    }

    #[test]
    fn tail_limits_to_most_recent() {
        let Ok(dir) = tempfile::tempdir() else { return };
        let Ok(store) = ChainStore::open(dir.path()) else {
            return;
        };
        let signer = Signer::for_uid("UID-TEST");
        for i in 0..5 {
            let _ = store.append_event(&signed_event(&signer, &format!("msg-{i}")));
        }

        let records = store.tail(&store.current_segment(), 2).unwrap_or_default();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records.last().and_then(|r| r.pointer("/payload/text")),
            Some(&serde_json::json!("msg-4"))
        );
    }

    #[test]
    fn unsigned_event_is_never_persisted() {
        let Ok(dir) = tempfile::tempdir() else { return };
        let Ok(store) = ChainStore::open(dir.path()) else {
            return;
        };
        let event = SignedEvent::unsigned(
            "UID-TEST",
            EventKind::Alert,
            "host",
            "general",
            1,
            2,
            serde_json::json!({}),
        );
        assert!(store.append_event(&event).is_err());
        assert!(!store.current_segment().exists());
    }

    #[test]
    fn record_without_uid_is_rejected() {
        let Ok(dir) = tempfile::tempdir() else { return };
        let Ok(store) = ChainStore::open(dir.path()) else {
            return;
        };
        let record = serde_json::json!({"sig": "abc", "data": 1});
        assert!(matches!(
            store.append_record(&record),
            Err(ChainError::MissingUid)
        ));
    }

    #[test]
    fn segment_names_follow_utc_date() {
        let Ok(dir) = tempfile::tempdir() else { return };
        let Ok(store) = ChainStore::open(dir.path()) else {
            return;
        };
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap_or_default();
        let segment = store.segment_for(date);
        assert_eq!(
            segment.file_name().and_then(|n| n.to_str()),
            Some("reflect-20240309.jsonl")
        );
    }

    #[test]
    fn tail_of_missing_segment_is_empty() {
        let Ok(dir) = tempfile::tempdir() else { return };
        let Ok(store) = ChainStore::open(dir.path()) else {
            return;
        };
        let missing = store.dir().join("reflect-19700101.jsonl");
        let records = store.tail(&missing, 10).unwrap_or_default();
        assert!(records.is_empty());
    }
}
