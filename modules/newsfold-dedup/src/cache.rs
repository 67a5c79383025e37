//! Embedding cache keyed by content hash of the normalized embed text.
//!
//! The only structure with a lifetime beyond one batch. Both operations are
//! best-effort: the provider treats a failed read as a miss and performs
//! writes on a detached task, so the cache only ever affects cost, never
//! correctness.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Hex SHA-256 of the normalized embed text.
    pub key: String,
    pub vector: Vec<f32>,
}

#[async_trait]
pub trait EmbeddingCache: Send + Sync {
    /// Return vectors for whichever keys have unexpired entries.
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, Vec<f32>>>;

    /// Store freshly computed vectors.
    async fn put(&self, entries: Vec<CacheEntry>) -> Result<()>;
}

// ---------------------------------------------------------------------------
// InMemoryCache
// ---------------------------------------------------------------------------

/// Process-local cache with per-entry TTL, checked on read.
pub struct InMemoryCache {
    entries: std::sync::RwLock<HashMap<String, (Vec<f32>, DateTime<Utc>)>>,
    ttl: Duration,
}

impl InMemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: std::sync::RwLock::new(HashMap::new()),
            ttl,
        }
    }
}

#[async_trait]
impl EmbeddingCache for InMemoryCache {
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, Vec<f32>>> {
        let now = Utc::now();
        let entries = self.entries.read().expect("embed cache lock poisoned");
        let mut found = HashMap::new();
        for key in keys {
            if let Some((vector, stored_at)) = entries.get(key) {
                if now.signed_duration_since(*stored_at) < self.ttl {
                    found.insert(key.clone(), vector.clone());
                }
            }
        }
        Ok(found)
    }

    async fn put(&self, new_entries: Vec<CacheEntry>) -> Result<()> {
        let now = Utc::now();
        let mut entries = self.entries.write().expect("embed cache lock poisoned");
        for entry in new_entries {
            entries.insert(entry.key, (entry.vector, now));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// NoCache
// ---------------------------------------------------------------------------

/// Cache that never hits. For callers that want every batch re-embedded.
pub struct NoCache;

#[async_trait]
impl EmbeddingCache for NoCache {
    async fn get(&self, _keys: &[String]) -> Result<HashMap<String, Vec<f32>>> {
        Ok(HashMap::new())
    }

    async fn put(&self, _entries: Vec<CacheEntry>) -> Result<()> {
        Ok(())
    }
}
