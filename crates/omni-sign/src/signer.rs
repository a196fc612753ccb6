//! Key derivation, signing, and verification.
//!
//! A [`Signer`] holds the MAC key for one identity and can stamp or check
//! any JSON record. Hub-side verification uses [`verify_event`], which
//! derives the key from the `uid` carried in the envelope itself; whether
//! that identity is *authorized* is a separate policy decision made by the
//! hub config, not by this crate.

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha3::{Digest, Sha3_256};

use omni_types::SignedEvent;

use crate::canonical::canonical_json;
use crate::error::SignError;

/// Domain suffix appended to the identity before key derivation.
///
/// Part of the wire format: a signature made with a different suffix never
/// verifies against records produced with this one.
pub const KEY_DOMAIN: &str = "::QEL";

/// The JSON field name holding the signature.
const SIG_FIELD: &str = "sig";

type HmacSha3 = Hmac<Sha3_256>;

/// Derive the MAC key for an identity.
///
/// `key = lowercase_hex(SHA3-256(uid ++ "::QEL"))`, used as its 64 ASCII
/// bytes. Keeping the hex encoding (rather than the raw 32 digest bytes)
/// is deliberate: it matches every signature already on disk.
pub fn derive_key(uid: &str) -> Vec<u8> {
    let mut hasher = Sha3_256::new();
    hasher.update(uid.as_bytes());
    hasher.update(KEY_DOMAIN.as_bytes());
    hex::encode(hasher.finalize()).into_bytes()
}

/// Signs and verifies records on behalf of one identity.
#[derive(Clone)]
pub struct Signer {
    uid: String,
    key: Vec<u8>,
}

impl core::fmt::Debug for Signer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Key bytes stay out of debug output.
        f.debug_struct("Signer").field("uid", &self.uid).finish()
    }
}

impl Signer {
    /// Create a signer for the given identity.
    pub fn for_uid(uid: impl Into<String>) -> Self {
        let uid = uid.into();
        let key = derive_key(&uid);
        Self { uid, key }
    }

    /// The identity this signer stamps records with.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Compute the signature for a JSON object, ignoring any `sig` field
    /// it already carries.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::NotAnObject`] if the value is not a JSON
    /// object, or a serialization error if it cannot be canonicalized.
    pub fn signature_for(&self, value: &Value) -> Result<String, SignError> {
        let body = unsigned_body(value)?;
        mac_hex(&self.key, body.as_bytes())
    }

    /// Sign a JSON object in place by inserting its `sig` field.
    ///
    /// Any existing `sig` is discarded and recomputed over the remaining
    /// fields.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::NotAnObject`] if the value is not a JSON object.
    pub fn sign_object(&self, value: &mut Value) -> Result<(), SignError> {
        let sig = self.signature_for(value)?;
        let Some(map) = value.as_object_mut() else {
            return Err(SignError::NotAnObject);
        };
        map.insert(SIG_FIELD.to_owned(), Value::String(sig));
        Ok(())
    }

    /// Sign an event envelope in place.
    ///
    /// The envelope's `uid` is overwritten with this signer's identity so
    /// the signature and the key-derivation input can never disagree.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the envelope cannot be
    /// canonicalized.
    pub fn sign_event(&self, event: &mut SignedEvent) -> Result<(), SignError> {
        event.uid.clone_from(&self.uid);
        event.sig = None;
        let value = serde_json::to_value(&*event)?;
        event.sig = Some(self.signature_for(&value)?);
        Ok(())
    }

    /// Verify a signed JSON object against this signer's key.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::Unsigned`] when no `sig` field is present,
    /// [`SignError::MalformedSignature`] when it is not valid hex, and
    /// [`SignError::Mismatch`] when the MAC does not match.
    pub fn verify_value(&self, value: &Value) -> Result<(), SignError> {
        let Some(sig) = value.get(SIG_FIELD).and_then(Value::as_str) else {
            return Err(SignError::Unsigned);
        };
        let sig_bytes =
            hex::decode(sig).map_err(|e| SignError::MalformedSignature(e.to_string()))?;

        let body = unsigned_body(value)?;
        let mut mac = HmacSha3::new_from_slice(&self.key)
            .map_err(|e| SignError::InvalidKey(e.to_string()))?;
        mac.update(body.as_bytes());

        // verify_slice is constant-time.
        if mac.verify_slice(&sig_bytes).is_ok() {
            Ok(())
        } else {
            Err(SignError::Mismatch)
        }
    }
}

/// Verify an event envelope using the key derived from its own `uid`.
///
/// This is the hub-side check: it proves the sender holds the key for the
/// identity it claims. Authorization of that identity happens elsewhere.
///
/// # Errors
///
/// Same failure modes as [`Signer::verify_value`].
pub fn verify_event(event: &SignedEvent) -> Result<(), SignError> {
    let value = serde_json::to_value(event)?;
    Signer::for_uid(&event.uid).verify_value(&value)
}

/// Canonical JSON of a record with its `sig` field removed.
fn unsigned_body(value: &Value) -> Result<String, SignError> {
    let Some(map) = value.as_object() else {
        return Err(SignError::NotAnObject);
    };
    let mut body = map.clone();
    body.remove(SIG_FIELD);
    Ok(canonical_json(&Value::Object(body))?)
}

/// Lowercase hex HMAC-SHA3-256 of `body` under `key`.
fn mac_hex(key: &[u8], body: &[u8]) -> Result<String, SignError> {
    let mut mac =
        HmacSha3::new_from_slice(key).map_err(|e| SignError::InvalidKey(e.to_string()))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use omni_types::EventKind;

    fn sample_event() -> SignedEvent {
        SignedEvent::unsigned(
            "X",
            EventKind::Chat,
            "laptop",
            "general",
            1,
            2,
            serde_json::json!({"a": 1}),
        )
    }

    #[test]
    fn derived_key_is_64_hex_bytes() {
        let key = derive_key("UID-TEST");
        assert_eq!(key.len(), 64);
        assert!(key.iter().all(u8::is_ascii_hexdigit));
    }

    #[test]
    fn different_uids_derive_different_keys() {
        assert_ne!(derive_key("alice"), derive_key("bob"));
        // Deterministic for the same input.
        assert_eq!(derive_key("alice"), derive_key("alice"));
    }

    #[test]
    fn sign_then_verify_succeeds() {
        let mut event = sample_event();
        let signer = Signer::for_uid("X");
        assert!(signer.sign_event(&mut event).is_ok());
        assert!(event.is_signed());
        assert!(verify_event(&event).is_ok());
    }

    #[test]
    fn mutated_payload_fails_verification() {
        let mut event = sample_event();
        let signer = Signer::for_uid("X");
        assert!(signer.sign_event(&mut event).is_ok());

        event.payload = serde_json::json!({"a": 2});
        assert!(matches!(verify_event(&event), Err(SignError::Mismatch)));
    }

    #[test]
    fn mutated_top_level_field_fails_verification() {
        let mut event = sample_event();
        let signer = Signer::for_uid("X");
        assert!(signer.sign_event(&mut event).is_ok());

        event.source = "other-host".to_owned();
        assert!(matches!(verify_event(&event), Err(SignError::Mismatch)));

        let mut event = sample_event();
        assert!(signer.sign_event(&mut event).is_ok());
        event.ts = event.ts.saturating_add(1);
        assert!(matches!(verify_event(&event), Err(SignError::Mismatch)));
    }

    #[test]
    fn claiming_a_different_uid_fails_verification() {
        // The signature binds the uid: re-labelling a signed event to
        // another identity must not verify under that identity's key.
        let mut event = sample_event();
        assert!(Signer::for_uid("X").sign_event(&mut event).is_ok());

        event.uid = "Y".to_owned();
        assert!(verify_event(&event).is_err());
    }

    #[test]
    fn unsigned_event_fails_cleanly() {
        let event = sample_event();
        assert!(matches!(verify_event(&event), Err(SignError::Unsigned)));
    }

    #[test]
    fn garbage_signature_is_malformed_not_a_panic() {
        let mut event = sample_event();
        event.sig = Some("not-hex".to_owned());
        assert!(matches!(
            verify_event(&event),
            Err(SignError::MalformedSignature(_))
        ));
    }

    #[test]
    fn resigning_a_signed_object_ignores_the_old_sig() {
        let signer = Signer::for_uid("X");
        let mut value = serde_json::json!({"a": 1, "sig": "stale"});
        assert!(signer.sign_object(&mut value).is_ok());
        assert!(signer.verify_value(&value).is_ok());

        // The signature equals the one computed over {"a":1} alone.
        let fresh = signer
            .signature_for(&serde_json::json!({"a": 1}))
            .unwrap_or_default();
        assert_eq!(value.get("sig").and_then(Value::as_str), Some(fresh.as_str()));
    }

    #[test]
    fn non_object_records_are_rejected() {
        let signer = Signer::for_uid("X");
        let mut value = serde_json::json!([1, 2, 3]);
        assert!(matches!(
            signer.sign_object(&mut value),
            Err(SignError::NotAnObject)
        ));
    }

    #[test]
    fn signature_is_stable_across_field_order() {
        let signer = Signer::for_uid("X");
        let a = signer
            .signature_for(&serde_json::json!({"a": 1, "b": 2}))
            .unwrap_or_default();
        let b = signer
            .signature_for(&serde_json::json!({"b": 2, "a": 1}))
            .unwrap_or_default();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}
