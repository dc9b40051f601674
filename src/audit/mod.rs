//! Bounded audit trail.
//!
//! Every validation run and synthesis decision is recorded as an
//! [`AuditEvent`] in a fixed-capacity ring buffer. Once full, the oldest
//! event is discarded to make room and a running discard counter is
//! incremented, so a caller can tell the trail is lossy without the
//! writer ever blocking on a slow reader.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::model::{AuditEvent, AuditEventType};

/// Default ring buffer capacity.
pub const DEFAULT_CAPACITY: usize = 10_000;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Pre-built [`AuditEvent`] constructors for the events the engine,
/// resilience layer, and synthesis loop emit.
pub mod event {
    use super::{now_ms, AuditEvent, AuditEventType};

    /// A validation run completed.
    #[must_use]
    pub fn validation_completed(fingerprint: &str) -> AuditEvent {
        AuditEvent::new(now_ms(), AuditEventType::ValidationCompleted).with_fingerprint(fingerprint)
    }

    /// A gate exceeded its time budget.
    #[must_use]
    pub fn gate_timeout(module_id: &str, gate_id: &str) -> AuditEvent {
        AuditEvent::new(now_ms(), AuditEventType::GateTimeout)
            .with_module(module_id)
            .with_gate(gate_id)
    }

    /// A circuit breaker opened for `dependency`.
    #[must_use]
    pub fn circuit_opened(dependency: &str) -> AuditEvent {
        AuditEvent::new(now_ms(), AuditEventType::CircuitOpened).with_detail("dependency", dependency)
    }

    /// A circuit breaker closed for `dependency`.
    #[must_use]
    pub fn circuit_closed(dependency: &str) -> AuditEvent {
        AuditEvent::new(now_ms(), AuditEventType::CircuitClosed).with_detail("dependency", dependency)
    }

    /// A snippet was applied during synthesis.
    #[must_use]
    pub fn snippet_applied(fingerprint: &str, module_id: &str, gate_id: &str, snippet_id: &str, iteration: usize) -> AuditEvent {
        AuditEvent::new(now_ms(), AuditEventType::SnippetApplied)
            .with_fingerprint(fingerprint)
            .with_module(module_id)
            .with_gate(gate_id)
            .with_snippet(snippet_id)
            .with_detail("iteration", iteration.to_string())
    }

    /// Synthesis converged: every gate now passes.
    #[must_use]
    pub fn synthesis_converged(fingerprint: &str, iterations: usize) -> AuditEvent {
        AuditEvent::new(now_ms(), AuditEventType::SynthesisConverged)
            .with_fingerprint(fingerprint)
            .with_detail("iterations", iterations.to_string())
    }

    /// Synthesis exhausted its retry budget without converging.
    #[must_use]
    pub fn synthesis_exhausted(fingerprint: &str, iterations: usize) -> AuditEvent {
        AuditEvent::new(now_ms(), AuditEventType::SynthesisExhausted)
            .with_fingerprint(fingerprint)
            .with_detail("iterations", iterations.to_string())
    }

    /// The external cache backend degraded to the in-memory fallback.
    #[must_use]
    pub fn cache_degraded(reason: &str) -> AuditEvent {
        AuditEvent::new(now_ms(), AuditEventType::CacheDegraded).with_detail("reason", reason)
    }
}

/// Thread-safe, bounded audit log.
pub struct AuditLog {
    capacity: usize,
    buffer: Mutex<VecDeque<AuditEvent>>,
    discarded: std::sync::atomic::AtomicU64,
}

impl AuditLog {
    /// Builds a log with room for `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            buffer: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            discarded: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Appends `event`, discarding the oldest entry if the buffer is full.
    pub fn record(&self, event: AuditEvent) {
        let mut buffer = self.buffer.lock();
        if buffer.len() >= self.capacity {
            buffer.pop_front();
            self.discarded.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
        buffer.push_back(event);
    }

    /// Returns every retained event, oldest first, without clearing the log.
    #[must_use]
    pub fn snapshot(&self) -> Vec<AuditEvent> {
        self.buffer.lock().iter().cloned().collect()
    }

    /// Drains and returns every retained event, oldest first.
    pub fn drain(&self) -> Vec<AuditEvent> {
        self.buffer.lock().drain(..).collect()
    }

    /// Number of events discarded due to the ring buffer filling up.
    #[must_use]
    pub fn discarded_count(&self) -> u64 {
        self.discarded.load(std::sync::atomic::Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_snapshot() {
        let log = AuditLog::new(10);
        log.record(event::validation_completed("abc"));
        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].fingerprint.as_deref(), Some("abc"));
    }

    #[test]
    fn test_ring_buffer_discards_oldest() {
        let log = AuditLog::new(2);
        log.record(event::validation_completed("one"));
        log.record(event::validation_completed("two"));
        log.record(event::validation_completed("three"));
        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].fingerprint.as_deref(), Some("two"));
        assert_eq!(log.discarded_count(), 1);
    }

    #[test]
    fn test_drain_empties_log() {
        let log = AuditLog::new(10);
        log.record(event::gate_timeout("fca_uk", "risk_warning"));
        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert!(log.snapshot().is_empty());
    }
}
