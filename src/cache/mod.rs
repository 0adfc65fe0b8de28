//! In-process memo of successful query results.
//!
//! Keys are the SHA-256 of the JSON encoding of `(sql, params)`, so two
//! compiled queries with identical text and bind values share an entry.
//! Entries expire after a fixed time-to-live; the capacity bound evicts
//! least-recently-used entries first.

mod hash;
pub use hash::compute_hash;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::compiler::Statement;
use crate::config::CacheSettings;
use crate::executor::Row;

/// Concurrent TTL cache of result rows.
#[derive(Clone)]
pub struct ResultMemo {
    cache: Cache<String, Arc<Vec<Row>>>,
}

impl ResultMemo {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    /// Build from settings, `None` when the memo is disabled.
    pub fn from_settings(settings: &CacheSettings) -> Option<Self> {
        settings
            .enabled
            .then(|| Self::new(settings.ttl(), settings.max_entries))
    }

    /// Cache key for a statement. `None` if the params cannot be encoded.
    pub fn key(statement: &Statement) -> Option<String> {
        compute_hash(&(&statement.sql, &statement.params)).ok()
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Vec<Row>>> {
        let hit = self.cache.get(key).await;
        if hit.is_some() {
            debug!(key = %&key[..12.min(key.len())], "result memo hit");
        }
        hit
    }

    pub async fn insert(&self, key: String, rows: Arc<Vec<Row>>) {
        self.cache.insert(key, rows).await;
    }

    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
