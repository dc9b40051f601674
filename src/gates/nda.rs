//! Non-disclosure agreement gates.
//!
//! A confidentiality obligation with no stated end date is unenforceable
//! in most UK commercial contexts and is routinely struck down or
//! narrowed by courts; a well-drafted NDA states a bounded term and
//! carves out information that was already public or independently
//! developed.

use crate::detectors::detect_pii;
use crate::model::{Finding, Gate, Severity};
use crate::patterns::nda as patterns;

use super::is_document_type;

const RELEVANT_TYPES: &[&str] = &["nda"];

/// Flags a perpetual/indefinite confidentiality obligation with no
/// bounded term stated.
pub struct ConfidentialityTermGate;

impl Gate for ConfidentialityTermGate {
    fn is_relevant(&self, _text: &str, document_type: &str) -> bool {
        is_document_type(document_type, RELEVANT_TYPES)
    }

    fn check(&self, text: &str, _document_type: &str) -> Finding {
        let Some(m) = patterns::perpetual_obligation().find(text) else {
            return Finding::pass("nda", self.gate_id(), "Unfair Contract Terms guidance");
        };
        if patterns::bounded_term_present().is_match(text) {
            return Finding::pass("nda", self.gate_id(), "Unfair Contract Terms guidance");
        }
        Finding::fail(
            "nda",
            self.gate_id(),
            Severity::High,
            "confidentiality obligation has no bounded term",
            "Unfair Contract Terms guidance",
            vec![crate::model::Span::new(m.start(), m.end(), "nda:perpetual_obligation")],
        )
        .with_suggestion("append a clause stating a bounded confidentiality term")
    }

    fn gate_id(&self) -> &'static str {
        "confidentiality_term"
    }

    fn is_whole_document(&self) -> bool {
        // First-match perpetual-obligation search plus a whole-document
        // bounded-term presence check; neither composes across chunks.
        true
    }
}

/// Flags the absence of standard carve-outs (already-public,
/// independently-developed, rightfully-received information).
pub struct CarveOutsGate;

impl Gate for CarveOutsGate {
    fn is_relevant(&self, _text: &str, document_type: &str) -> bool {
        is_document_type(document_type, RELEVANT_TYPES)
    }

    fn check(&self, text: &str, _document_type: &str) -> Finding {
        if patterns::carve_outs_present().is_match(text) {
            return Finding::pass("nda", self.gate_id(), "Standard NDA drafting practice");
        }
        Finding::fail(
            "nda",
            self.gate_id(),
            Severity::Medium,
            "no carve-outs for public or independently-developed information",
            "Standard NDA drafting practice",
            vec![],
        )
        .with_suggestion("append standard confidentiality carve-outs")
    }

    fn gate_id(&self) -> &'static str {
        "carve_outs"
    }

    fn is_whole_document(&self) -> bool {
        // Presence check: the carve-outs clause may sit in any chunk.
        true
    }
}

/// Flags PII appearing directly in the NDA body (e.g. an illustrative
/// example that leaks a real signatory's details), reusing the universal
/// PII detector.
pub struct PiiExposureGate;

impl Gate for PiiExposureGate {
    fn is_relevant(&self, _text: &str, document_type: &str) -> bool {
        is_document_type(document_type, RELEVANT_TYPES)
    }

    fn check(&self, text: &str, _document_type: &str) -> Finding {
        let spans = detect_pii(text);
        if spans.is_empty() {
            return Finding::pass("nda", self.gate_id(), "UK GDPR Art. 5(1)(c) (data minimisation)");
        }
        Finding::warning(
            "nda",
            self.gate_id(),
            Severity::Low,
            "personal data found directly in the agreement body",
            "UK GDPR Art. 5(1)(c) (data minimisation)",
            spans,
        )
    }

    fn gate_id(&self) -> &'static str {
        "pii_exposure"
    }
}
