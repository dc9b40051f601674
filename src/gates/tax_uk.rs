//! UK tax-disclosure gates.
//!
//! A "tax-free"/"tax-efficient" claim made without the standard
//! disclaimer that tax treatment depends on individual circumstances and
//! can change is a promotion risk the FCA and HMRC both treat as
//! misleading, independent of whether the underlying claim is accurate.

use crate::detectors::detect_pii;
use crate::model::{Finding, Gate, Severity};
use crate::patterns::tax_uk as patterns;

use super::{contains_any_keyword, is_document_type};

const RELEVANT_TYPES: &[&str] = &["tax_document"];
const RELEVANT_KEYWORDS: &[&str] = &["tax-free", "tax free", "tax-efficient", "isa", "pension"];

fn relevant(text: &str, document_type: &str) -> bool {
    is_document_type(document_type, RELEVANT_TYPES) || contains_any_keyword(text, RELEVANT_KEYWORDS)
}

/// Flags a tax-efficiency claim made without the standard disclaimer.
pub struct TaxDisclaimerGate;

impl Gate for TaxDisclaimerGate {
    fn is_relevant(&self, text: &str, document_type: &str) -> bool {
        relevant(text, document_type)
    }

    fn check(&self, text: &str, _document_type: &str) -> Finding {
        let Some(m) = patterns::tax_efficiency_claim().find(text) else {
            return Finding::pass("tax_uk", self.gate_id(), "HMRC tax disclosure guidance");
        };
        if patterns::tax_disclaimer_present().is_match(text) {
            return Finding::pass("tax_uk", self.gate_id(), "HMRC tax disclosure guidance");
        }
        Finding::fail(
            "tax_uk",
            self.gate_id(),
            Severity::High,
            "tax-efficiency claim made without the standard HMRC disclaimer",
            "HMRC tax disclosure guidance",
            vec![crate::model::Span::new(m.start(), m.end(), "tax:unqualified_claim")],
        )
        .with_suggestion("append the standard tax-treatment disclaimer")
    }

    fn gate_id(&self) -> &'static str {
        "tax_disclaimer"
    }

    fn is_whole_document(&self) -> bool {
        // First-match tax-efficiency claim plus a whole-document
        // disclaimer presence check; neither composes across chunks.
        true
    }
}

/// Flags personal data appearing directly in a tax document illustration,
/// reusing the universal PII detector.
pub struct PiiExposureGate;

impl Gate for PiiExposureGate {
    fn is_relevant(&self, text: &str, document_type: &str) -> bool {
        relevant(text, document_type)
    }

    fn check(&self, text: &str, _document_type: &str) -> Finding {
        let spans = detect_pii(text);
        if spans.is_empty() {
            return Finding::pass("tax_uk", self.gate_id(), "UK GDPR Art. 5(1)(c) (data minimisation)");
        }
        Finding::warning(
            "tax_uk",
            self.gate_id(),
            Severity::Low,
            "personal or bank data found directly in the document body",
            "UK GDPR Art. 5(1)(c) (data minimisation)",
            spans,
        )
    }

    fn gate_id(&self) -> &'static str {
        "pii_exposure"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_disclaimer_fails_without_disclaimer() {
        let gate = TaxDisclaimerGate;
        let text = "This product is completely tax-free.";
        assert!(gate.is_relevant(text, "tax_document"));
        let finding = gate.check(text, "tax_document");
        assert!(finding.is_failure());
        assert_eq!(finding.severity, Severity::High);
    }

    #[test]
    fn test_tax_disclaimer_passes_with_disclaimer() {
        let gate = TaxDisclaimerGate;
        let text = "This ISA is tax-free. Tax treatment depends on your individual circumstances.";
        let finding = gate.check(text, "tax_document");
        assert!(!finding.is_failure());
    }

    #[test]
    fn test_pii_exposure_flags_sort_code() {
        let gate = PiiExposureGate;
        let finding = gate.check("Refunds are paid to sort code 12-34-56.", "tax_document");
        assert_eq!(finding.status, crate::model::Status::Warning);
    }
}
