//! Canonical JSON serialization.
//!
//! The canonical form of a JSON value is its compact serialization with
//! object keys in lexicographic order at every nesting depth. Signatures
//! are computed over these bytes, so canonicalization must be stable:
//! the same data must always produce the same byte sequence.

use serde_json::Value;

/// Serialize a JSON value to its canonical string form.
///
/// `serde_json`'s default object representation is a `BTreeMap`, so any
/// value that has passed through [`serde_json::Value`] already holds its
/// keys sorted; compact serialization then yields the canonical bytes.
/// Callers must canonicalize through this function rather than serializing
/// structs directly, because struct serialization emits fields in
/// declaration order.
///
/// # Errors
///
/// Returns [`serde_json::Error`] only for values that cannot be
/// represented as JSON text (e.g. non-finite floats produced by a custom
/// `Serialize` impl).
pub fn canonical_json(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

/// Convert any serializable record into a canonical JSON string.
///
/// Routes the record through [`Value`] so that object keys are sorted
/// before serialization.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if the record cannot be converted to a
/// JSON value.
pub fn canonicalize<T: serde::Serialize>(record: &T) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(record)?;
    canonical_json(&value)
}
