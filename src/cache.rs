//! response cache
//!
//! responses are stored under a key derived from the request text and
//! expire lazily: a stale entry reads as a miss but stays in the map until
//! it is overwritten, removed, or the cache is cleared.

use crate::graphql::GraphQlResponse;
use crate::request::GraphQlRequest;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// default time a cached response stays fresh
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CacheEntry {
    response: GraphQlResponse,
    stored_at: Instant,
}

/// cache of successful responses keyed by request content
#[derive(Debug)]
pub struct CacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_age: Duration,
}

impl CacheStore {
    /// create an empty cache whose entries stay fresh for `max_age`
    pub fn new(max_age: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_age,
        }
    }

    /// cache key for a request: `query|variables|operationName`
    ///
    /// variables are serialized as-is, so the key is only as stable as the
    /// json serializer's object key ordering.
    pub fn key(request: &GraphQlRequest) -> String {
        format!(
            "{}|{}|{}",
            request.query(),
            request.variables(),
            request.operation_name().unwrap_or_default()
        )
    }

    /// freshness window for entries
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// cached response if present and not older than `max_age`
    pub fn get(&self, key: &str) -> Option<GraphQlResponse> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() > self.max_age {
            return None;
        }
        Some(entry.response.clone())
    }

    /// true if a fresh entry exists under `key`
    pub fn contains_fresh(&self, key: &str) -> bool {
        self.entries
            .read()
            .get(key)
            .is_some_and(|entry| entry.stored_at.elapsed() <= self.max_age)
    }

    /// store a response, replacing any previous entry and its timestamp
    pub fn put(&self, key: impl Into<String>, response: GraphQlResponse) {
        self.entries.write().insert(
            key.into(),
            CacheEntry {
                response,
                stored_at: Instant::now(),
            },
        );
    }

    /// drop one entry; returns true if it existed
    pub fn remove(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// drop every entry
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// number of stored entries, stale ones included
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// true if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE)
    }
}
