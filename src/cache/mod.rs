//! Result cache: a durable `SQLite`-backed store, transparently backed by
//! a bounded in-memory fallback so a validation request never fails
//! because the cache is unavailable.

pub mod memory;
pub mod sqlite;
pub mod traits;

pub use memory::InMemoryResultCache;
pub use sqlite::SqliteResultCache;
pub use traits::{CacheStats, ResultCache};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use crate::config::Settings;

const DEGRADATION_LOG_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

/// Wraps an optional [`SqliteResultCache`] with an [`InMemoryResultCache`]
/// fallback. Once the `SQLite` backend fails any operation it is marked
/// degraded for the rest of the process lifetime; subsequent calls go
/// straight to memory without retrying the database, and a `tracing`
/// warning is emitted at most once per [`DEGRADATION_LOG_INTERVAL`].
pub struct LayeredResultCache {
    external: Option<SqliteResultCache>,
    fallback: InMemoryResultCache,
    degraded: AtomicBool,
    last_warned: Mutex<Option<Instant>>,
}

impl LayeredResultCache {
    /// Builds a layered cache. `external` is `None` when no
    /// `external_cache_path` is configured, in which case every call goes
    /// straight to the in-memory fallback.
    #[must_use]
    pub fn new(external: Option<SqliteResultCache>, max_entries: usize, max_bytes: usize) -> Self {
        Self {
            degraded: AtomicBool::new(external.is_none()),
            external,
            fallback: InMemoryResultCache::new(max_entries, max_bytes),
            last_warned: Mutex::new(None),
        }
    }

    /// Builds a layered cache from [`Settings`], opening the configured
    /// `SQLite` path if set. Falls back to memory-only immediately if the
    /// file cannot be opened.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let external = settings.external_cache_path.as_ref().and_then(|path| match SqliteResultCache::open(path) {
            Ok(cache) => Some(cache),
            Err(err) => {
                tracing::warn!(error = %err, path = %path, "failed to open external result cache, using in-memory only");
                None
            }
        });
        Self::new(external, settings.cache_max_entries, settings.cache_max_bytes)
    }

    fn note_degradation(&self, reason: &str) {
        self.degraded.store(true, Ordering::Relaxed);
        let mut last = self.last_warned.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let should_warn = last.is_none_or(|t| t.elapsed() > DEGRADATION_LOG_INTERVAL);
        if should_warn {
            tracing::warn!(reason, "result cache degraded to in-memory fallback");
            *last = Some(Instant::now());
        }
    }
}

impl ResultCache for LayeredResultCache {
    fn get(&self, namespace: &str, key: &str) -> Option<Vec<u8>> {
        if self.degraded.load(Ordering::Relaxed) {
            return self.fallback.get(namespace, key);
        }
        let Some(external) = &self.external else {
            return self.fallback.get(namespace, key);
        };
        match external.try_get(namespace, key) {
            Ok(value) => value,
            Err(err) => {
                self.note_degradation(&err.to_string());
                self.fallback.get(namespace, key)
            }
        }
    }

    fn set(&self, namespace: &str, key: &str, value: Vec<u8>, ttl_s: u64) {
        if !self.degraded.load(Ordering::Relaxed) {
            if let Some(external) = &self.external {
                if let Err(err) = external.try_set(namespace, key, &value, ttl_s) {
                    self.note_degradation(&err.to_string());
                } else {
                    return;
                }
            }
        }
        self.fallback.set(namespace, key, value, ttl_s);
    }

    fn clear(&self, namespace: Option<&str>) {
        if let Some(external) = &self.external {
            if let Err(err) = external.try_clear(namespace) {
                self.note_degradation(&err.to_string());
            }
        }
        self.fallback.clear(namespace);
    }

    fn stats(&self) -> CacheStats {
        if !self.degraded.load(Ordering::Relaxed) {
            if let Some(external) = &self.external {
                if let Ok(entries) = external.try_count() {
                    return CacheStats {
                        hits: 0,
                        misses: 0,
                        entries,
                        backed_externally: true,
                    };
                }
            }
        }
        self.fallback.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_only_when_no_external_configured() {
        let cache = LayeredResultCache::new(None, 100, 1024 * 1024);
        cache.set("validation", "fp1", b"v".to_vec(), 3600);
        assert_eq!(cache.get("validation", "fp1"), Some(b"v".to_vec()));
        assert!(!cache.stats().backed_externally);
    }

    #[test]
    fn test_external_backend_used_when_healthy() {
        let sqlite = SqliteResultCache::in_memory().unwrap();
        let cache = LayeredResultCache::new(Some(sqlite), 100, 1024 * 1024);
        cache.set("validation", "fp1", b"v".to_vec(), 3600);
        assert_eq!(cache.get("validation", "fp1"), Some(b"v".to_vec()));
        assert!(cache.stats().backed_externally);
    }

    #[test]
    fn test_degrades_to_memory_when_external_absent_flag_set() {
        let cache = LayeredResultCache::new(None, 100, 1024 * 1024);
        assert!(cache.degraded.load(Ordering::Relaxed));
    }
}
