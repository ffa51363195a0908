//! In-process cache backend.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::{CacheError, CacheStore};

struct Entry {
    value: String,
    expires_at: Instant,
}

/// TTL-bounded in-memory store.
///
/// Backs the [`CacheStore`] seam for tests and single-process deployments.
/// Expired entries are dropped lazily: reads treat them as misses and writes
/// sweep them out, so the map stays bounded by the live working set.
#[derive(Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl_seconds: u64) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + Duration::from_secs(ttl_seconds),
            },
        );
        Ok(())
    }
}
