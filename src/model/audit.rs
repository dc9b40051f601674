//! Audit event schema, emitted for every mutation and decision.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind of event recorded to the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// A validation run completed (cache hit or miss).
    ValidationCompleted,
    /// A gate exceeded its per-call time budget.
    GateTimeout,
    /// A circuit breaker transitioned to `open`.
    CircuitOpened,
    /// A circuit breaker transitioned back to `closed`.
    CircuitClosed,
    /// A snippet was applied during synthesis.
    SnippetApplied,
    /// Synthesis converged (all gates pass).
    SynthesisConverged,
    /// Synthesis exhausted its retry budget without converging.
    SynthesisExhausted,
    /// The result cache's external backend degraded to the in-memory fallback.
    CacheDegraded,
}

/// A single structured audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unix epoch milliseconds when the event was recorded.
    pub ts: u64,
    /// Kind of event.
    pub event_type: AuditEventType,
    /// Fingerprint of the document the event relates to, when known.
    pub fingerprint: Option<String>,
    /// Module the event relates to, when applicable.
    pub module_id: Option<String>,
    /// Gate the event relates to, when applicable.
    pub gate_id: Option<String>,
    /// Snippet the event relates to, when applicable.
    pub snippet_id: Option<String>,
    /// Deterministic-order free-form detail.
    pub detail: BTreeMap<String, String>,
}

impl AuditEvent {
    /// Builds a new event with no optional fields set.
    #[must_use]
    pub fn new(ts: u64, event_type: AuditEventType) -> Self {
        Self {
            ts,
            event_type,
            fingerprint: None,
            module_id: None,
            gate_id: None,
            snippet_id: None,
            detail: BTreeMap::new(),
        }
    }

    /// Attaches the document fingerprint.
    #[must_use]
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    /// Attaches the module id.
    #[must_use]
    pub fn with_module(mut self, module_id: impl Into<String>) -> Self {
        self.module_id = Some(module_id.into());
        self
    }

    /// Attaches the gate id.
    #[must_use]
    pub fn with_gate(mut self, gate_id: impl Into<String>) -> Self {
        self.gate_id = Some(gate_id.into());
        self
    }

    /// Attaches the snippet id.
    #[must_use]
    pub fn with_snippet(mut self, snippet_id: impl Into<String>) -> Self {
        self.snippet_id = Some(snippet_id.into());
        self
    }

    /// Attaches a detail key/value pair.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.detail.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_optional_fields() {
        let event = AuditEvent::new(1_700_000_000_000, AuditEventType::SnippetApplied)
            .with_fingerprint("abc123")
            .with_module("fca_uk")
            .with_gate("risk_warning")
            .with_snippet("fca_risk_warning")
            .with_detail("iteration", "1");

        assert_eq!(event.fingerprint.as_deref(), Some("abc123"));
        assert_eq!(event.module_id.as_deref(), Some("fca_uk"));
        assert_eq!(event.detail.get("iteration").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_serializes_as_snake_case() {
        let event = AuditEvent::new(0, AuditEventType::CircuitOpened);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"circuit_opened\""));
    }
}
