//! # Nonce Store
//!
//! Replay protection for positive assertions (OpenID 2.0 §11.3). A
//! response nonce starts with an RFC 3339 UTC timestamp and may carry an
//! opaque printable suffix; a given `(endpoint, timestamp, suffix)` triple
//! is accepted at most once inside a sliding window. The window length is
//! constructor configuration so independently configured stores can
//! coexist. The bigger the window, the more memory is needed to remember
//! used nonces.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::error::Error;
use crate::provider::NonceStore;
use crate::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Nonce {
    timestamp: DateTime<Utc>,
    suffix: String,
}

/// In-memory nonce store.
///
/// A single store-wide lock serializes all acceptance checks; the lock is
/// never held across network I/O.
#[derive(Debug)]
pub struct InMemoryNonceStore {
    max_age: Duration,
    seen: Mutex<HashMap<String, Vec<Nonce>>>,
}

impl InMemoryNonceStore {
    /// Create a store with the default 60 second acceptance window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_age(Duration::seconds(60))
    }

    /// Create a store accepting nonces up to `max_age` old.
    #[must_use]
    pub fn with_max_age(max_age: Duration) -> Self {
        Self { max_age, seen: Mutex::new(HashMap::new()) }
    }
}

impl Default for InMemoryNonceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NonceStore for InMemoryNonceStore {
    async fn accept(&self, endpoint: &str, nonce: &str) -> Result<()> {
        // A nonce is the 20 character timestamp plus at most 236 characters
        // of uniqueness suffix.
        if nonce.len() < 20 || nonce.len() > 256 {
            return Err(Error::InvalidNonce(format!("length {} outside [20, 256]", nonce.len())));
        }
        let Some(stamp) = nonce.get(..20) else {
            return Err(Error::InvalidNonce("timestamp is not ASCII".to_string()));
        };
        let timestamp = DateTime::parse_from_rfc3339(stamp)
            .map_err(|e| Error::InvalidNonce(format!("bad timestamp {stamp}: {e}")))?
            .with_timezone(&Utc);

        let now = Utc::now();
        if now - timestamp > self.max_age {
            return Err(Error::NonceTooOld(format!("nonce issued at {timestamp}")));
        }
        let suffix = &nonce[20..];

        let mut seen = self.seen.lock().expect("lock poisoned");
        let nonces = seen.entry(endpoint.to_string()).or_default();
        if nonces.iter().any(|n| n.timestamp == timestamp && n.suffix == suffix) {
            return Err(Error::NonceReused(nonce.to_string()));
        }
        // Purge expired entries for this endpoint while we hold the lock.
        nonces.retain(|n| now - n.timestamp <= self.max_age);
        nonces.push(Nonce { timestamp, suffix: suffix.to_string() });

        Ok(())
    }
}
