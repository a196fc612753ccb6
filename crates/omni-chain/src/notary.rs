//! Signed digest sidecars for arbitrary files.
//!
//! Notarizing a file computes the SHA3-256 digest of its bytes, wraps it
//! in a signed [`NotarizedArtifact`] record, and writes the record to
//! `<file>.notarized.json` next to the original. The record can also be
//! chained or shipped to the hub as an `automation` event by the caller.

use std::path::{Path, PathBuf};

use chrono::Utc;
use sha3::{Digest, Sha3_256};
use tracing::info;

use omni_sign::Signer;
use omni_types::NotarizedArtifact;

use crate::error::ChainError;

/// Lowercase hex SHA3-256 digest of a file's bytes.
///
/// # Errors
///
/// Returns [`ChainError::NotAFile`] for directories and other non-files,
/// or [`ChainError::Io`] if the file cannot be read.
pub fn file_digest(path: &Path) -> Result<String, ChainError> {
    if !path.is_file() {
        return Err(ChainError::NotAFile(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha3_256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Notarize a file: write a signed digest sidecar and return the record.
///
/// The sidecar lands at `<file>.notarized.json`, pretty-printed for human
/// inspection. The returned record verifies under the signer's key and
/// can be appended to a chain with
/// [`ChainStore::append_record`](crate::store::ChainStore::append_record).
///
/// # Errors
///
/// Returns [`ChainError::NotAFile`] or [`ChainError::Io`] for filesystem
/// problems, and [`ChainError::Rejected`] if signing fails.
pub fn notarize_file(
    signer: &Signer,
    path: &Path,
    chain_label: &str,
) -> Result<(PathBuf, NotarizedArtifact), ChainError> {
    let hash = file_digest(path)?;
    let artifact = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    let record = NotarizedArtifact {
        uid: signer.uid().to_owned(),
        ts: Utc::now().timestamp(),
        artifact,
        hash,
        chain: chain_label.to_owned(),
        sig: None,
    };

    let mut value = serde_json::to_value(&record)?;
    signer.sign_object(&mut value)?;
    let record: NotarizedArtifact = serde_json::from_value(value.clone())?;

    let sidecar = sidecar_path(path);
    std::fs::write(&sidecar, serde_json::to_vec_pretty(&value)?)?;

    info!(
        artifact = record.artifact,
        sidecar = %sidecar.display(),
        "artifact notarized"
    );
    Ok((sidecar, record))
}

/// Path of the sidecar record for a file.
fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".notarized.json");
    PathBuf::from(name)
}
