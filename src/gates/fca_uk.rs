//! FCA (Financial Conduct Authority) financial-promotion gates.
//!
//! Grounded in COBS 4.2 ("fair, clear and not misleading"): a promotion
//! that claims guaranteed or risk-free returns must carry a standard risk
//! warning, and any promotion inviting a complaint must signpost the
//! Financial Ombudsman Service.

use crate::model::{Finding, Gate, Severity};
use crate::patterns::fca_uk as patterns;

use super::{contains_any_keyword, is_document_type};

const RELEVANT_TYPES: &[&str] = &["financial_promotion"];
const RELEVANT_KEYWORDS: &[&str] = &["fund", "investment", "returns", "capital"];

fn relevant(text: &str, document_type: &str) -> bool {
    is_document_type(document_type, RELEVANT_TYPES) || contains_any_keyword(text, RELEVANT_KEYWORDS)
}

/// Flags an unsubstantiated guarantee/no-risk claim made without the
/// standard capital-at-risk warning.
pub struct FairClearNotMisleadingGate;

impl Gate for FairClearNotMisleadingGate {
    fn is_relevant(&self, text: &str, document_type: &str) -> bool {
        relevant(text, document_type)
    }

    fn check(&self, text: &str, _document_type: &str) -> Finding {
        let Some(m) = patterns::guaranteed_returns().find(text) else {
            return Finding::pass("fca_uk", self.gate_id(), "FCA COBS 4.2.1");
        };
        if patterns::risk_warning_present().is_match(text) {
            return Finding::pass("fca_uk", self.gate_id(), "FCA COBS 4.2.1");
        }
        Finding::fail(
            "fca_uk",
            self.gate_id(),
            Severity::Critical,
            "unsubstantiated guarantee/no-risk claim without a capital-at-risk warning",
            "FCA COBS 4.2.1",
            vec![crate::model::Span::new(m.start(), m.end(), "fca:unsubstantiated_claim")],
        )
        .with_suggestion("prepend the standard capital-at-risk warning")
    }

    fn gate_id(&self) -> &'static str {
        "fair_clear_not_misleading"
    }

    fn is_whole_document(&self) -> bool {
        // Reports only the first unsubstantiated claim in the document;
        // run per-chunk this would yield one finding per chunk instead.
        true
    }
}

/// Flags a financial promotion with no Financial Ombudsman Service
/// complaints-handling signpost.
pub struct FosSignpostingGate;

impl Gate for FosSignpostingGate {
    fn is_relevant(&self, text: &str, document_type: &str) -> bool {
        relevant(text, document_type)
    }

    fn check(&self, text: &str, _document_type: &str) -> Finding {
        if patterns::fos_signposting_present().is_match(text) {
            return Finding::pass("fca_uk", self.gate_id(), "FCA DISP 1.3");
        }
        Finding::fail(
            "fca_uk",
            self.gate_id(),
            Severity::Medium,
            "no Financial Ombudsman Service signposting found",
            "FCA DISP 1.3",
            vec![],
        )
        .with_suggestion("append FOS complaints-handling signposting")
    }

    fn gate_id(&self) -> &'static str {
        "fos_signposting"
    }

    fn is_whole_document(&self) -> bool {
        // Presence check: signposting may appear anywhere in the
        // document, so this cannot be decided from one chunk alone.
        true
    }
}

/// Flags urgency/pressure-selling language (FCA treats this as a
/// misleading-impression risk independent of the underlying claim).
pub struct PressureSellingGate;

impl Gate for PressureSellingGate {
    fn is_relevant(&self, text: &str, document_type: &str) -> bool {
        relevant(text, document_type)
    }

    fn check(&self, text: &str, _document_type: &str) -> Finding {
        let matches: Vec<_> = patterns::pressure_selling().find_iter(text).collect();
        if matches.is_empty() {
            return Finding::pass("fca_uk", self.gate_id(), "FCA COBS 4.2.1");
        }
        let spans = matches
            .iter()
            .map(|m| crate::model::Span::new(m.start(), m.end(), "fca:pressure_selling"))
            .collect();
        Finding::fail(
            "fca_uk",
            self.gate_id(),
            Severity::Low,
            "urgency/pressure-selling language detected",
            "FCA COBS 4.2.1",
            spans,
        )
    }

    fn gate_id(&self) -> &'static str {
        "pressure_selling"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fair_clear_fails_on_guaranteed_without_warning() {
        let gate = FairClearNotMisleadingGate;
        let text = "Our fund delivers guaranteed high returns.";
        assert!(gate.is_relevant(text, "financial_promotion"));
        let finding = gate.check(text, "financial_promotion");
        assert!(finding.is_failure());
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.spans.len(), 1);
        assert_eq!(&text[finding.spans[0].start..finding.spans[0].end], "guaranteed high returns");
    }

    #[test]
    fn test_fair_clear_passes_with_warning() {
        let gate = FairClearNotMisleadingGate;
        let text = "Capital at risk. Our fund targets guaranteed high returns in some scenarios.";
        let finding = gate.check(text, "financial_promotion");
        assert!(!finding.is_failure());
    }

    #[test]
    fn test_fos_signposting_fails_when_absent() {
        let gate = FosSignpostingGate;
        let finding = gate.check("Invest with us today.", "financial_promotion");
        assert!(finding.is_failure());
        assert_eq!(finding.severity, Severity::Medium);
    }

    #[test]
    fn test_fos_signposting_passes_when_present() {
        let gate = FosSignpostingGate;
        let text = "You may refer your complaint to the Financial Ombudsman Service.";
        let finding = gate.check(text, "financial_promotion");
        assert!(!finding.is_failure());
    }

    #[test]
    fn test_pressure_selling_detects_urgency_language() {
        let gate = PressureSellingGate;
        let finding = gate.check("Act now - this offer closes today.", "financial_promotion");
        assert!(finding.is_failure());
        assert_eq!(finding.severity, Severity::Low);
    }

    #[test]
    fn test_not_relevant_for_unrelated_document() {
        let gate = FairClearNotMisleadingGate;
        assert!(!gate.is_relevant("A simple thank-you letter.", "employment_contract"));
    }
}
