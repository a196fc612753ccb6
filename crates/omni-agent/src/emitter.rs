//! Signed event construction and HTTP delivery.
//!
//! [`Emitter`] owns a [`Signer`] and a [`reqwest::Client`]; `emit` builds
//! the envelope, signs it, and POSTs it to the hub's `/ingest` endpoint.
//! Transient delivery failures (transport errors, 5xx responses) are
//! retried a bounded number of times; a 4xx from the hub is final, since
//! re-sending an envelope the hub rejected cannot succeed.

use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use omni_sign::Signer;
use omni_types::{EventKind, SignedEvent};

use crate::config::AgentConfig;
use crate::error::AgentError;

/// Maximum delivery attempts per event.
const MAX_ATTEMPTS: u32 = 3;

/// Fixed delay between delivery attempts.
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// A signing emitter bound to one hub.
#[derive(Debug)]
pub struct Emitter {
    signer: Signer,
    source: String,
    project: String,
    ingest_url: String,
    client: reqwest::Client,
}

impl Emitter {
    /// Build an emitter from config.
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            signer: Signer::for_uid(&config.uid),
            source: config.source.clone(),
            project: config.project.clone(),
            ingest_url: format!("{}/ingest", config.hub_url.trim_end_matches('/')),
            client: reqwest::Client::new(),
        }
    }

    /// The identity this emitter signs with.
    pub fn uid(&self) -> &str {
        self.signer.uid()
    }

    /// Build and sign an envelope without sending it.
    ///
    /// `ts` is the current unix time; `nonce` is a fresh random `u32`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Sign`] if signing fails.
    pub fn build_event(&self, kind: EventKind, payload: Value) -> Result<SignedEvent, AgentError> {
        let mut event = SignedEvent::unsigned(
            self.signer.uid(),
            kind,
            &self.source,
            &self.project,
            Utc::now().timestamp(),
            rand::random::<u32>(),
            payload,
        );
        self.signer.sign_event(&mut event)?;
        Ok(event)
    }

    /// Sign and deliver one event to the hub.
    ///
    /// Returns the signed envelope on success so callers can log or
    /// re-chain it locally.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Rejected`] when the hub answers 4xx, or
    /// [`AgentError::Http`] when delivery keeps failing after retries.
    pub async fn emit(&self, kind: EventKind, payload: Value) -> Result<SignedEvent, AgentError> {
        let event = self.build_event(kind, payload)?;
        self.deliver(&event).await?;
        Ok(event)
    }

    /// POST an already-signed envelope with bounded retry.
    async fn deliver(&self, event: &SignedEvent) -> Result<(), AgentError> {
        let mut last_err: Option<AgentError> = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.client.post(&self.ingest_url).json(event).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!(url = self.ingest_url, attempt, "event delivered");
                        return Ok(());
                    }
                    let body = response.text().await.unwrap_or_default();
                    if status.is_client_error() {
                        // The hub made a final decision; retrying cannot help.
                        return Err(AgentError::Rejected {
                            status: status.as_u16(),
                            body,
                        });
                    }
                    warn!(status = status.as_u16(), attempt, "hub error, will retry");
                    last_err = Some(AgentError::Rejected {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(e) => {
                    warn!(error = %e, attempt, "delivery failed, will retry");
                    last_err = Some(AgentError::Http(e));
                }
            }

            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }

        Err(last_err.unwrap_or_else(|| AgentError::Config("no delivery attempts made".to_owned())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AgentConfig {
        AgentConfig {
            hub_url: "http://127.0.0.1:9999/".to_owned(),
            uid: "UID-EMITTER".to_owned(),
            source: "test-host".to_owned(),
            project: "general".to_owned(),
            heartbeat_secs: 30,
        }
    }

    #[test]
    fn ingest_url_has_no_double_slash() {
        let emitter = Emitter::new(&test_config());
        assert_eq!(emitter.ingest_url, "http://127.0.0.1:9999/ingest");
    }

    #[test]
    fn built_events_verify() {
        let emitter = Emitter::new(&test_config());
        let event = emitter.build_event(
            EventKind::Chat,
            serde_json::json!({"text": "hello"}),
        );
        assert!(event.is_ok());
        let Ok(event) = event else { return };
        assert_eq!(event.uid, "UID-EMITTER");
        assert_eq!(event.source, "test-host");
        assert!(event.is_signed());
        assert!(omni_sign::verify_event(&event).is_ok());
    }

    #[test]
    fn consecutive_events_get_distinct_nonces() {
        let emitter = Emitter::new(&test_config());
        let a = emitter.build_event(EventKind::Alert, serde_json::json!({}));
        let b = emitter.build_event(EventKind::Alert, serde_json::json!({}));
        let (Ok(a), Ok(b)) = (a, b) else { return };
        // Random u32 nonces; a collision here is astronomically unlikely.
        assert_ne!((a.nonce, a.sig), (b.nonce, b.sig));
    }
}
