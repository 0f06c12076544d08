//! Cache module for keeping the latest quotations
//!
//! Quotations are stored through a pluggable key/value store and are only
//! served back while they are less than one hour old. Expired entries are
//! deleted when read.

mod rates;
mod store;

pub use rates::{CacheEntry, RateCache, FRESHNESS_WINDOW_MS};
pub use store::{FileStore, KeyValueStore, MemoryStore, NoopStore};
