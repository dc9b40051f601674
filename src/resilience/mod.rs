//! Circuit breaker and token-bucket rate limiter guarding outbound
//! provider calls.
//!
//! Both primitives are keyed by a caller-supplied dependency name and
//! held behind a `parking_lot::Mutex` rather than split into per-call
//! atomics: state transitions (closed → open → half-open → closed)
//! involve more than one field changing together, and a single lock
//! keeps those transitions atomic without a CAS retry loop.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Circuit breaker state, mirrored by [`crate::model`]'s wire-level
/// representation for the `health` CLI command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls are allowed through.
    Closed,
    /// Calls are rejected without being attempted.
    Open,
    /// A single probe call is allowed through to test recovery.
    HalfOpen,
}

struct Breaker {
    state: CircuitState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    opened_at: Option<Instant>,
}

impl Breaker {
    const fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            consecutive_successes: 0,
            opened_at: None,
        }
    }
}

/// Per-dependency circuit breaker registry.
pub struct CircuitBreaker {
    failure_threshold: u32,
    success_threshold: u32,
    timeout: Duration,
    breakers: Mutex<HashMap<String, Breaker>>,
}

impl CircuitBreaker {
    /// Builds a breaker registry. `failure_threshold` consecutive
    /// failures open a circuit; after `timeout_s` it moves to
    /// half-open; `success_threshold` consecutive half-open successes
    /// close it again.
    #[must_use]
    pub fn new(failure_threshold: u32, timeout_s: u64, success_threshold: u32) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            success_threshold: success_threshold.max(1),
            timeout: Duration::from_secs(timeout_s),
            breakers: Mutex::new(HashMap::new()),
        }
    }

    /// Whether a call to `dependency` should be attempted right now.
    /// Transitions `open` to `half_open` once the timeout has elapsed.
    #[must_use]
    pub fn allow(&self, dependency: &str) -> bool {
        let mut breakers = self.breakers.lock();
        let breaker = breakers.entry(dependency.to_string()).or_insert_with(Breaker::new);
        match breaker.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let elapsed = breaker.opened_at.is_some_and(|t| t.elapsed() >= self.timeout);
                if elapsed {
                    breaker.state = CircuitState::HalfOpen;
                    breaker.consecutive_successes = 0;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Records a successful call against `dependency`. Returns
    /// `Some(CircuitState::Closed)` when this call is the one that closes
    /// the circuit (§4.8: state transitions emit audit events); `None`
    /// otherwise.
    pub fn record_success(&self, dependency: &str) -> Option<CircuitState> {
        let mut breakers = self.breakers.lock();
        let breaker = breakers.entry(dependency.to_string()).or_insert_with(Breaker::new);
        breaker.consecutive_failures = 0;
        match breaker.state {
            CircuitState::Closed => None,
            CircuitState::HalfOpen => {
                breaker.consecutive_successes += 1;
                if breaker.consecutive_successes >= self.success_threshold {
                    breaker.state = CircuitState::Closed;
                    breaker.opened_at = None;
                    Some(CircuitState::Closed)
                } else {
                    None
                }
            }
            CircuitState::Open => None,
        }
    }

    /// Records a failed call against `dependency`, opening the circuit
    /// once `failure_threshold` consecutive failures accumulate, or
    /// immediately on any failure while half-open. Returns
    /// `Some(CircuitState::Open)` when this call is the one that opens
    /// the circuit; `None` otherwise.
    pub fn record_failure(&self, dependency: &str) -> Option<CircuitState> {
        let mut breakers = self.breakers.lock();
        let breaker = breakers.entry(dependency.to_string()).or_insert_with(Breaker::new);
        match breaker.state {
            CircuitState::HalfOpen => {
                breaker.state = CircuitState::Open;
                breaker.opened_at = Some(Instant::now());
                breaker.consecutive_successes = 0;
                Some(CircuitState::Open)
            }
            CircuitState::Closed => {
                breaker.consecutive_failures += 1;
                if breaker.consecutive_failures >= self.failure_threshold {
                    breaker.state = CircuitState::Open;
                    breaker.opened_at = Some(Instant::now());
                    Some(CircuitState::Open)
                } else {
                    None
                }
            }
            CircuitState::Open => None,
        }
    }

    /// Current state of `dependency`'s breaker, `closed` if never seen.
    #[must_use]
    pub fn state(&self, dependency: &str) -> CircuitState {
        self.breakers.lock().get(dependency).map_or(CircuitState::Closed, |b| b.state)
    }
}

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Per-dependency token-bucket rate limiter.
pub struct RateLimiter {
    capacity: f64,
    refill_per_s: f64,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    /// Builds a limiter with the given bucket capacity and refill rate
    /// (tokens per second).
    #[must_use]
    pub fn new(capacity: u32, refill_per_s: f64) -> Self {
        Self {
            capacity: f64::from(capacity),
            refill_per_s: refill_per_s.max(0.0),
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Attempts to take one token for `dependency`. Returns `false` when
    /// the bucket is empty.
    pub fn try_acquire(&self, dependency: &str) -> bool {
        let mut buckets = self.buckets.lock();
        let now = Instant::now();
        let capacity = self.capacity;
        let refill_per_s = self.refill_per_s;
        let bucket = buckets.entry(dependency.to_string()).or_insert_with(|| Bucket {
            tokens: capacity,
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * refill_per_s).min(capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breaker_opens_after_threshold_failures() {
        let cb = CircuitBreaker::new(3, 30, 2);
        assert_eq!(cb.state("fca-llm"), CircuitState::Closed);
        cb.record_failure("fca-llm");
        cb.record_failure("fca-llm");
        assert_eq!(cb.state("fca-llm"), CircuitState::Closed);
        cb.record_failure("fca-llm");
        assert_eq!(cb.state("fca-llm"), CircuitState::Open);
        assert!(!cb.allow("fca-llm"));
    }

    #[test]
    fn test_breaker_half_open_after_timeout() {
        let cb = CircuitBreaker::new(1, 0, 1);
        cb.record_failure("fca-llm");
        assert_eq!(cb.state("fca-llm"), CircuitState::Open);
        std::thread::sleep(Duration::from_millis(5));
        assert!(cb.allow("fca-llm"));
        assert_eq!(cb.state("fca-llm"), CircuitState::HalfOpen);
    }

    #[test]
    fn test_breaker_closes_after_success_threshold_in_half_open() {
        let cb = CircuitBreaker::new(1, 0, 2);
        cb.record_failure("fca-llm");
        std::thread::sleep(Duration::from_millis(5));
        assert!(cb.allow("fca-llm"));
        cb.record_success("fca-llm");
        assert_eq!(cb.state("fca-llm"), CircuitState::HalfOpen);
        cb.record_success("fca-llm");
        assert_eq!(cb.state("fca-llm"), CircuitState::Closed);
    }

    #[test]
    fn test_breaker_half_open_failure_reopens() {
        let cb = CircuitBreaker::new(1, 0, 2);
        cb.record_failure("fca-llm");
        std::thread::sleep(Duration::from_millis(5));
        assert!(cb.allow("fca-llm"));
        cb.record_failure("fca-llm");
        assert_eq!(cb.state("fca-llm"), CircuitState::Open);
    }

    #[test]
    fn test_record_failure_signals_transition_only_on_the_opening_call() {
        let cb = CircuitBreaker::new(2, 30, 1);
        assert_eq!(cb.record_failure("fca-llm"), None);
        assert_eq!(cb.record_failure("fca-llm"), Some(CircuitState::Open));
    }

    #[test]
    fn test_record_success_signals_transition_only_on_the_closing_call() {
        let cb = CircuitBreaker::new(1, 0, 2);
        cb.record_failure("fca-llm");
        std::thread::sleep(Duration::from_millis(5));
        assert!(cb.allow("fca-llm"));
        assert_eq!(cb.record_success("fca-llm"), None);
        assert_eq!(cb.record_success("fca-llm"), Some(CircuitState::Closed));
    }

    #[test]
    fn test_rate_limiter_exhausts_then_refills() {
        let limiter = RateLimiter::new(2, 1000.0);
        assert!(limiter.try_acquire("fca-llm"));
        assert!(limiter.try_acquire("fca-llm"));
        assert!(!limiter.try_acquire("fca-llm"));
        std::thread::sleep(Duration::from_millis(5));
        assert!(limiter.try_acquire("fca-llm"));
    }

    #[test]
    fn test_rate_limiter_independent_per_dependency() {
        let limiter = RateLimiter::new(1, 0.0);
        assert!(limiter.try_acquire("fca-llm"));
        assert!(limiter.try_acquire("gdpr-llm"));
        assert!(!limiter.try_acquire("fca-llm"));
    }
}
