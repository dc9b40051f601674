//! Findings: the structured result of any gate or detector.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Span;

/// Severity of a finding or span, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational only; no compliance impact.
    Info,
    /// Minor issue, unlikely to block publication.
    Low,
    /// Notable issue that should be corrected.
    Medium,
    /// Serious issue likely to block publication.
    High,
    /// Blocking issue; must be corrected before publication.
    Critical,
}

/// Outcome of a single gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The gate ran and found no issue.
    Pass,
    /// The gate ran and found a non-blocking issue.
    Warning,
    /// The gate ran and found a blocking issue.
    Fail,
    /// The gate's relevance predicate returned false; it did not run.
    NotApplicable,
}

/// Structured output of a single gate's `check` call.
///
/// Invariant: if `status` is [`Status::Fail`] or [`Status::Warning`], at
/// least one span or a non-empty `message` must be present. A
/// [`Status::Pass`] finding carries no spans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Module this finding belongs to.
    pub module_id: String,
    /// Gate that produced this finding.
    pub gate_id: String,
    /// Severity, fixed per-gate and independent of runtime content.
    pub severity: Severity,
    /// Outcome of the gate check.
    pub status: Status,
    /// Human-readable description of the finding.
    pub message: String,
    /// Suggested remediation text, if any.
    pub suggestion: Option<String>,
    /// Citation or policy reference backing this gate's severity policy.
    pub legal_source: String,
    /// Ordered spans over the original document text.
    pub spans: Vec<Span>,
    /// Deterministic-order metadata, consumed by the synthesis engine to
    /// resolve snippet template variables.
    pub details: BTreeMap<String, String>,
}

impl Finding {
    /// Builds a `pass` finding: no spans, no message required.
    #[must_use]
    pub fn pass(module_id: impl Into<String>, gate_id: impl Into<String>, legal_source: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            gate_id: gate_id.into(),
            severity: Severity::Info,
            status: Status::Pass,
            message: String::new(),
            suggestion: None,
            legal_source: legal_source.into(),
            spans: Vec::new(),
            details: BTreeMap::new(),
        }
    }

    /// Builds a `not_applicable` finding for a gate whose relevance
    /// predicate returned false.
    #[must_use]
    pub fn not_applicable(module_id: impl Into<String>, gate_id: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            gate_id: gate_id.into(),
            severity: Severity::Info,
            status: Status::NotApplicable,
            message: String::new(),
            suggestion: None,
            legal_source: String::new(),
            spans: Vec::new(),
            details: BTreeMap::new(),
        }
    }

    /// Builds a `fail` finding. Panics in debug builds if the invariant
    /// (non-empty message or at least one span) is violated.
    #[must_use]
    pub fn fail(
        module_id: impl Into<String>,
        gate_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        legal_source: impl Into<String>,
        spans: Vec<Span>,
    ) -> Self {
        let message = message.into();
        debug_assert!(
            !message.is_empty() || !spans.is_empty(),
            "fail finding must carry a message or at least one span"
        );
        Self {
            module_id: module_id.into(),
            gate_id: gate_id.into(),
            severity,
            status: Status::Fail,
            message,
            suggestion: None,
            legal_source: legal_source.into(),
            spans,
            details: BTreeMap::new(),
        }
    }

    /// Builds a `warning` finding with the same shape as [`Finding::fail`].
    #[must_use]
    pub fn warning(
        module_id: impl Into<String>,
        gate_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        legal_source: impl Into<String>,
        spans: Vec<Span>,
    ) -> Self {
        let message = message.into();
        debug_assert!(
            !message.is_empty() || !spans.is_empty(),
            "warning finding must carry a message or at least one span"
        );
        Self {
            module_id: module_id.into(),
            gate_id: gate_id.into(),
            severity,
            status: Status::Warning,
            message,
            suggestion: None,
            legal_source: legal_source.into(),
            spans,
            details: BTreeMap::new(),
        }
    }

    /// Attaches a suggested correction.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attaches a detail key/value pair, used by the synthesis engine to
    /// resolve snippet template variables.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// A gate-timeout placeholder finding. Not a failure for synthesis purposes.
    #[must_use]
    pub fn timeout(module_id: impl Into<String>, gate_id: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            gate_id: gate_id.into(),
            severity: Severity::Low,
            status: Status::Warning,
            message: "gate timeout".to_string(),
            suggestion: None,
            legal_source: String::new(),
            spans: Vec::new(),
            details: BTreeMap::new(),
        }
    }

    /// Remaps every span in this finding by `offset` bytes, translating
    /// chunk-local coordinates to document-global ones.
    pub fn shift_spans(&mut self, offset: usize) {
        for span in &mut self.spans {
            *span = span.shifted(offset);
        }
    }

    /// Whether this finding represents a gate failure for synthesis purposes.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.status, Status::Fail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_has_no_spans() {
        let finding = Finding::pass("fca_uk", "risk_warning", "FCA COBS 4.2");
        assert_eq!(finding.status, Status::Pass);
        assert!(finding.spans.is_empty());
    }

    #[test]
    fn test_fail_carries_message() {
        let finding = Finding::fail(
            "fca_uk",
            "risk_warning",
            Severity::Critical,
            "missing risk warning",
            "FCA COBS 4.2.1",
            vec![],
        );
        assert!(finding.is_failure());
        assert_eq!(finding.message, "missing risk warning");
    }

    #[test]
    fn test_shift_spans_applies_offset() {
        let mut finding = Finding::fail(
            "gdpr_uk",
            "lawful_basis",
            Severity::High,
            "no lawful basis stated",
            "UK GDPR Art. 6",
            vec![Span::new(5, 10, "gdpr:lawful_basis")],
        );
        finding.shift_spans(1000);
        assert_eq!(finding.spans[0].start, 1005);
        assert_eq!(finding.spans[0].end, 1010);
    }

    #[test]
    fn test_with_detail_and_suggestion() {
        let finding = Finding::fail(
            "fca_uk",
            "risk_warning",
            Severity::Critical,
            "missing risk warning",
            "FCA COBS 4.2.1",
            vec![],
        )
        .with_suggestion("add the standard risk warning")
        .with_detail("provider_name", "Acme Capital");

        assert_eq!(finding.suggestion.as_deref(), Some("add the standard risk warning"));
        assert_eq!(finding.details.get("provider_name").map(String::as_str), Some("Acme Capital"));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Info);
    }
}
