//! Local rate cache with a one-hour freshness window
//!
//! Holds the most recent successfully fetched quotation per unit kind so the
//! rate client can fall back to it when the service is unreachable.

use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::store::{KeyValueStore, NoopStore};
use crate::data::Quotation;

/// How long a cached quotation stays usable, in milliseconds
pub const FRESHNESS_WINDOW_MS: i64 = 60 * 60 * 1000;

/// Wrapper stored for each cached quotation
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The cached quotation
    pub quotation: Quotation,
    /// Milliseconds since the Unix epoch when the entry was written
    pub captured_at_epoch_ms: i64,
}

impl CacheEntry {
    /// Whether the entry is still inside the freshness window at `now_ms`
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms - self.captured_at_epoch_ms < FRESHNESS_WINDOW_MS
    }
}

/// Quotation cache over an injectable key/value store
#[derive(Clone)]
pub struct RateCache {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for RateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateCache").finish_non_exhaustive()
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::disabled()
    }
}

impl RateCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// A cache that never returns anything
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopStore))
    }

    /// Stores `quotation` under `key`, stamped with the current time.
    ///
    /// Storage failures are logged and otherwise ignored.
    pub fn put(&self, key: &str, quotation: &Quotation) {
        let entry = CacheEntry {
            quotation: quotation.clone(),
            captured_at_epoch_ms: Utc::now().timestamp_millis(),
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to serialize cache entry {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.store.put(key, &json) {
            warn!("failed to write cache entry {}: {}", key, e);
        }
    }

    /// Returns the cached quotation for `key` if present and fresh.
    ///
    /// Stale or unreadable entries are deleted and reported as absent.
    pub fn get(&self, key: &str) -> Option<Quotation> {
        let raw = self.store.get(key)?;

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("discarding unreadable cache entry {}: {}", key, e);
                self.delete(key);
                return None;
            }
        };

        if !entry.is_fresh(Utc::now().timestamp_millis()) {
            self.delete(key);
            return None;
        }

        Some(entry.quotation)
    }

    fn delete(&self, key: &str) {
        if let Err(e) = self.store.delete(key) {
            warn!("failed to delete cache entry {}: {}", key, e);
        }
    }
}
