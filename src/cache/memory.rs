//! Bounded in-memory result cache: LRU eviction plus a per-entry TTL.
//!
//! Used standalone when no external cache path is configured, and as the
//! silent fallback behind [`super::sqlite::SqliteResultCache`] when the
//! database backend is unavailable.

use std::num::NonZeroUsize;
use std::time::Instant;

use lru::LruCache;
use parking_lot::Mutex;

use super::traits::{CacheStats, ResultCache};

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

struct Inner {
    cache: LruCache<String, Entry>,
    total_bytes: usize,
    max_bytes: usize,
    hits: u64,
    misses: u64,
}

/// LRU + TTL in-memory cache, bounded by both entry count and total bytes.
pub struct InMemoryResultCache {
    inner: Mutex<Inner>,
}

fn namespaced_key(namespace: &str, key: &str) -> String {
    format!("{namespace}\x1f{key}")
}

impl InMemoryResultCache {
    /// Builds a cache holding at most `max_entries` entries and
    /// `max_bytes` of value data, whichever limit is hit first.
    #[must_use]
    pub fn new(max_entries: usize, max_bytes: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                cache: LruCache::new(capacity),
                total_bytes: 0,
                max_bytes,
                hits: 0,
                misses: 0,
            }),
        }
    }
}

impl ResultCache for InMemoryResultCache {
    fn get(&self, namespace: &str, key: &str) -> Option<Vec<u8>> {
        let full_key = namespaced_key(namespace, key);
        let mut inner = self.inner.lock();
        let now = Instant::now();

        let hit = match inner.cache.get(&full_key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => None,
            None => None,
        };

        if hit.is_some() {
            inner.hits += 1;
        } else {
            if inner.cache.peek(&full_key).is_some() {
                if let Some(entry) = inner.cache.pop(&full_key) {
                    inner.total_bytes = inner.total_bytes.saturating_sub(entry.value.len());
                }
            }
            inner.misses += 1;
        }
        hit
    }

    fn set(&self, namespace: &str, key: &str, value: Vec<u8>, ttl_s: u64) {
        let full_key = namespaced_key(namespace, key);
        let mut inner = self.inner.lock();

        if let Some(old) = inner.cache.peek(&full_key) {
            inner.total_bytes = inner.total_bytes.saturating_sub(old.value.len());
        }

        let value_len = value.len();
        let entry = Entry {
            value,
            expires_at: Instant::now() + std::time::Duration::from_secs(ttl_s),
        };

        if let Some((_, evicted)) = inner.cache.push(full_key, entry) {
            inner.total_bytes = inner.total_bytes.saturating_sub(evicted.value.len());
        }
        inner.total_bytes += value_len;

        let max_bytes = inner.max_bytes;
        while inner.total_bytes > max_bytes {
            let Some((_, evicted)) = inner.cache.pop_lru() else {
                break;
            };
            inner.total_bytes = inner.total_bytes.saturating_sub(evicted.value.len());
        }
    }

    fn clear(&self, namespace: Option<&str>) {
        let mut inner = self.inner.lock();
        match namespace {
            None => {
                inner.cache.clear();
                inner.total_bytes = 0;
            }
            Some(ns) => {
                let prefix = format!("{ns}\x1f");
                let stale: Vec<String> = inner
                    .cache
                    .iter()
                    .filter(|(k, _)| k.starts_with(&prefix))
                    .map(|(k, _)| k.clone())
                    .collect();
                for k in stale {
                    if let Some(entry) = inner.cache.pop(&k) {
                        inner.total_bytes = inner.total_bytes.saturating_sub(entry.value.len());
                    }
                }
            }
        }
    }

    fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.cache.len(),
            backed_externally: false,
        }
    }
}
