//! In-memory weather cache for map markers, keyed by marker name.
//!
//! The default policy keeps every entry for the lifetime of the owning map
//! view. A bounded policy (LRU + TTL) is available for search-driven use where
//! the key space is open-ended.

use lru::LruCache;
use std::{
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use crate::model::WeatherRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePolicy {
    pub max_entries: Option<usize>,
    pub ttl: Option<Duration>,
}

impl CachePolicy {
    pub const fn unbounded() -> Self {
        Self { max_entries: None, ttl: None }
    }

    pub const fn bounded(max_entries: usize, ttl: Duration) -> Self {
        Self { max_entries: Some(max_entries), ttl: Some(ttl) }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    record: WeatherRecord,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct MarkerCache {
    ttl: Option<Duration>,
    entries: LruCache<String, CacheEntry>,
}

impl Default for MarkerCache {
    fn default() -> Self {
        Self::new(CachePolicy::unbounded())
    }
}

impl MarkerCache {
    pub fn new(policy: CachePolicy) -> Self {
        let entries = match policy.max_entries {
            Some(max) => LruCache::new(NonZeroUsize::new(max).unwrap_or(NonZeroUsize::MIN)),
            None => LruCache::unbounded(),
        };
        Self { ttl: policy.ttl, entries }
    }

    pub fn get(&mut self, name: &str) -> Option<WeatherRecord> {
        let expired = match (self.entries.peek(name), self.ttl) {
            (Some(entry), Some(ttl)) => entry.stored_at.elapsed() >= ttl,
            (Some(_), None) => false,
            (None, _) => return None,
        };

        if expired {
            tracing::debug!(%name, "marker cache entry expired");
            self.entries.pop(name);
            return None;
        }

        self.entries.get(name).map(|entry| entry.record.clone())
    }

    pub fn insert(&mut self, name: impl Into<String>, record: WeatherRecord) {
        let name = name.into();
        let entry = CacheEntry { record, stored_at: Instant::now() };
        match self.entries.push(name.clone(), entry) {
            Some((evicted, _)) if evicted != name => {
                tracing::debug!(name = %evicted, "evicting marker cache entry");
            }
            _ => {}
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
