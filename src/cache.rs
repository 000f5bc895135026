//! # Discovery Cache
//!
//! Discovered provider information and the in-memory cache reference
//! implementations. The cache is filled proactively when the redirect is
//! built and consulted again while verifying the assertion, so a single
//! login round-trip normally performs discovery once.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::DiscoveryCache;

/// Provider information produced by discovery.
///
/// Immutable once produced. Empty `op_local_id` and `claimed_id` mean the
/// provider's identifier-select convention applies.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct DiscoveredInfo {
    /// The provider's authentication endpoint. Never empty on a
    /// successful discovery.
    pub op_endpoint: String,

    /// The OP-Local Identifier, or empty when the service declares none.
    pub op_local_id: String,

    /// The Claimed Identifier, or empty in identifier-select mode.
    pub claimed_id: String,
}

/// Unbounded in-memory discovery cache.
#[derive(Debug, Default)]
pub struct InMemoryDiscoveryCache {
    entries: Mutex<HashMap<String, DiscoveredInfo>>,
}

impl InMemoryDiscoveryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiscoveryCache for InMemoryDiscoveryCache {
    async fn put(&self, endpoint: &str, info: DiscoveredInfo) {
        self.entries.lock().expect("lock poisoned").insert(endpoint.to_string(), info);
    }

    async fn get(&self, endpoint: &str) -> Option<DiscoveredInfo> {
        self.entries.lock().expect("lock poisoned").get(endpoint).cloned()
    }
}

/// Expiring in-memory discovery cache.
///
/// Every read first discards entries older than the TTL, so housekeeping
/// cost is amortized over lookups and no background task is needed.
#[derive(Debug)]
pub struct TimedDiscoveryCache {
    entries: Mutex<HashMap<String, (DiscoveredInfo, DateTime<Utc>)>>,
    ttl: Duration,
}

impl TimedDiscoveryCache {
    /// Create a cache whose entries expire `ttl` after insertion.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { entries: Mutex::new(HashMap::new()), ttl }
    }
}

impl DiscoveryCache for TimedDiscoveryCache {
    async fn put(&self, endpoint: &str, info: DiscoveredInfo) {
        self.entries
            .lock()
            .expect("lock poisoned")
            .insert(endpoint.to_string(), (info, Utc::now()));
    }

    async fn get(&self, endpoint: &str) -> Option<DiscoveredInfo> {
        let mut entries = self.entries.lock().expect("lock poisoned");
        let now = Utc::now();
        entries.retain(|_, entry| now - entry.1 <= self.ttl);
        entries.get(endpoint).map(|entry| entry.0.clone())
    }
}
