//! Typed runtime configuration, with environment overrides.
//!
//! Every numeric and string knob the engine, chunker, cache, resilience
//! layer, and synthesis loop read is collected here so a caller can
//! construct one [`Settings`] value at startup and thread it through the
//! rest of the crate, instead of scattering `std::env::var` calls through
//! the request path.

use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};

/// Environment variable prefix for all overridable settings.
pub const ENV_PREFIX: &str = "RLMC_";

/// Typed settings object covering every knob described in the engine,
/// chunker, cache, circuit breaker, and synthesis specifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Overall per-request deadline, in milliseconds.
    pub overall_deadline_ms: u64,
    /// Per-gate time budget, in milliseconds.
    pub gate_deadline_ms: u64,
    /// Text length above which the engine delegates to the chunker, in bytes.
    pub chunk_threshold_bytes: usize,
    /// Target chunk size, in bytes.
    pub chunk_size_bytes: usize,
    /// Overlap between consecutive chunks, in bytes.
    pub chunk_overlap_bytes: usize,
    /// Number of parallel workers used to process chunks.
    pub chunk_workers: usize,
    /// Default TTL applied to cache entries, in seconds.
    pub cache_ttl_s: u64,
    /// Maximum number of entries held by the in-memory cache fallback.
    pub cache_max_entries: usize,
    /// Maximum total size of the in-memory cache fallback, in bytes.
    pub cache_max_bytes: usize,
    /// Consecutive failures before a circuit breaker opens.
    pub cb_failure_threshold: u32,
    /// Seconds an open circuit waits before probing the dependency again.
    pub cb_timeout_s: u64,
    /// Consecutive successes in `half_open` required to close the circuit.
    pub cb_success_threshold: u32,
    /// Token bucket capacity for the per-dependency rate limiter.
    pub rate_limiter_capacity: u32,
    /// Token bucket refill rate, in tokens per second.
    pub rate_limiter_refill_per_s: f64,
    /// Maximum synthesis retry iterations.
    pub max_iterations: usize,
    /// Hard cap on a single request's input text size, in bytes.
    pub max_text_bytes: usize,
    /// Hard cap on the number of active modules in a single request.
    pub max_active_modules: usize,
    /// Path to the SQLite-backed shared result cache, if configured.
    pub external_cache_path: Option<String>,
    /// Per-provider API keys, populated from environment, never logged.
    #[serde(skip_serializing)]
    pub provider_api_keys: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            overall_deadline_ms: 30_000,
            gate_deadline_ms: 50,
            chunk_threshold_bytes: 51_200,
            chunk_size_bytes: 51_200,
            chunk_overlap_bytes: 500,
            chunk_workers: 4,
            cache_ttl_s: 3_600,
            cache_max_entries: 10_000,
            cache_max_bytes: 64 * 1024 * 1024,
            cb_failure_threshold: 3,
            cb_timeout_s: 30,
            cb_success_threshold: 2,
            rate_limiter_capacity: 10,
            rate_limiter_refill_per_s: 1.0,
            max_iterations: 5,
            max_text_bytes: 10 * 1024 * 1024,
            max_active_modules: 16,
            external_cache_path: None,
            provider_api_keys: HashMap::new(),
        }
    }
}

impl Settings {
    /// Builds settings from the documented defaults, then applies
    /// `RLMC_`-prefixed environment overrides on top.
    ///
    /// Unrecognized or unparsable environment values are ignored and the
    /// default for that field is kept; configuration is best-effort at
    /// this layer, not a hard startup requirement.
    #[must_use]
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Some(v) = env_u64("OVERALL_DEADLINE_MS") {
            settings.overall_deadline_ms = v;
        }
        if let Some(v) = env_u64("GATE_DEADLINE_MS") {
            settings.gate_deadline_ms = v;
        }
        if let Some(v) = env_usize("CHUNK_THRESHOLD_BYTES") {
            settings.chunk_threshold_bytes = v;
        }
        if let Some(v) = env_usize("CHUNK_SIZE_BYTES") {
            settings.chunk_size_bytes = v;
        }
        if let Some(v) = env_usize("CHUNK_OVERLAP_BYTES") {
            settings.chunk_overlap_bytes = v;
        }
        if let Some(v) = env_usize("CHUNK_WORKERS") {
            settings.chunk_workers = v;
        }
        if let Some(v) = env_u64("CACHE_TTL_S") {
            settings.cache_ttl_s = v;
        }
        if let Some(v) = env_usize("CACHE_MAX_ENTRIES") {
            settings.cache_max_entries = v;
        }
        if let Some(v) = env_usize("CACHE_MAX_BYTES") {
            settings.cache_max_bytes = v;
        }
        if let Some(v) = env_u32("CB_FAILURE_THRESHOLD") {
            settings.cb_failure_threshold = v;
        }
        if let Some(v) = env_u64("CB_TIMEOUT_S") {
            settings.cb_timeout_s = v;
        }
        if let Some(v) = env_u32("CB_SUCCESS_THRESHOLD") {
            settings.cb_success_threshold = v;
        }
        if let Some(v) = env_usize("MAX_ITERATIONS") {
            settings.max_iterations = v;
        }
        if let Some(v) = env_usize("MAX_TEXT_BYTES") {
            settings.max_text_bytes = v;
        }
        if let Some(v) = env_usize("MAX_ACTIVE_MODULES") {
            settings.max_active_modules = v;
        }
        if let Ok(path) = env::var(format!("{ENV_PREFIX}EXTERNAL_CACHE_PATH")) {
            settings.external_cache_path = Some(path);
        }

        for (key, value) in env::vars() {
            if let Some(provider) = key.strip_prefix("RLMC_PROVIDER_KEY_") {
                settings
                    .provider_api_keys
                    .insert(provider.to_lowercase(), value);
            }
        }

        settings
    }
}

fn env_usize(name: &str) -> Option<usize> {
    env::var(format!("{ENV_PREFIX}{name}")).ok()?.parse().ok()
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(format!("{ENV_PREFIX}{name}")).ok()?.parse().ok()
}

fn env_u32(name: &str) -> Option<u32> {
    env::var(format!("{ENV_PREFIX}{name}")).ok()?.parse().ok()
}
