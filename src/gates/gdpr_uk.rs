//! UK GDPR privacy-notice gates.
//!
//! Grounded in Article 6 (lawful basis for processing), Articles 13-15
//! (information to be provided / data subject rights), and the
//! transparency principle in Article 12 (concise, intelligible language).

use crate::detectors::readability_score;
use crate::model::{Finding, Gate, Severity};
use crate::patterns::gdpr_uk as patterns;

use super::{contains_any_keyword, is_document_type};

const RELEVANT_TYPES: &[&str] = &["privacy_notice"];
const RELEVANT_KEYWORDS: &[&str] = &["personal data", "your data", "privacy"];

fn relevant(text: &str, document_type: &str) -> bool {
    is_document_type(document_type, RELEVANT_TYPES) || contains_any_keyword(text, RELEVANT_KEYWORDS)
}

/// Flags vague data-use language with no recognised Article 6 lawful
/// basis stated.
pub struct LawfulBasisGate;

impl Gate for LawfulBasisGate {
    fn is_relevant(&self, text: &str, document_type: &str) -> bool {
        relevant(text, document_type)
    }

    fn check(&self, text: &str, _document_type: &str) -> Finding {
        if patterns::lawful_basis_present().is_match(text) {
            return Finding::pass("gdpr_uk", self.gate_id(), "UK GDPR Art. 6");
        }
        let Some(m) = patterns::vague_purpose().find(text) else {
            return Finding::pass("gdpr_uk", self.gate_id(), "UK GDPR Art. 6");
        };
        Finding::fail(
            "gdpr_uk",
            self.gate_id(),
            Severity::High,
            "data use described without a stated lawful basis",
            "UK GDPR Art. 6",
            vec![crate::model::Span::new(m.start(), m.end(), "gdpr:vague_purpose")],
        )
        .with_suggestion("append a lawful-basis clause")
    }

    fn gate_id(&self) -> &'static str {
        "lawful_basis"
    }

    fn is_whole_document(&self) -> bool {
        // Both the lawful-basis presence check and the vague-purpose
        // first-match search reason over the whole document.
        true
    }
}

/// Flags a privacy notice with no data subject rights / ICO complaints
/// signposting.
pub struct DataSubjectRightsGate;

impl Gate for DataSubjectRightsGate {
    fn is_relevant(&self, text: &str, document_type: &str) -> bool {
        relevant(text, document_type)
    }

    fn check(&self, text: &str, _document_type: &str) -> Finding {
        if patterns::data_subject_rights_present().is_match(text) {
            return Finding::pass("gdpr_uk", self.gate_id(), "UK GDPR Arts. 13-15, 77");
        }
        Finding::fail(
            "gdpr_uk",
            self.gate_id(),
            Severity::High,
            "no data subject rights or ICO complaints signposting found",
            "UK GDPR Arts. 13-15, 77",
            vec![],
        )
        .with_suggestion("append a data-subject-rights clause with ICO signposting")
    }

    fn gate_id(&self) -> &'static str {
        "data_subject_rights"
    }

    fn is_whole_document(&self) -> bool {
        // Presence check: the signposting clause may appear in any
        // chunk, so the finding can only be decided over the full text.
        true
    }
}

/// Flags a privacy notice written below a plain-English readability bar,
/// per the Article 12 transparency principle.
pub struct PlainLanguageGate;

impl Gate for PlainLanguageGate {
    fn is_relevant(&self, text: &str, document_type: &str) -> bool {
        relevant(text, document_type)
    }

    fn check(&self, text: &str, _document_type: &str) -> Finding {
        let result = readability_score(text);
        if result.word_count < 20 || result.score >= 40.0 {
            return Finding::pass("gdpr_uk", self.gate_id(), "UK GDPR Art. 12");
        }
        Finding::warning(
            "gdpr_uk",
            self.gate_id(),
            Severity::Low,
            format!(
                "readability score {:.1} is below the plain-English bar (40.0)",
                result.score
            ),
            "UK GDPR Art. 12",
            vec![],
        )
    }

    fn gate_id(&self) -> &'static str {
        "plain_language"
    }

    fn is_whole_document(&self) -> bool {
        // The readability score is a function of the whole document's
        // word/sentence counts, not of any one chunk's.
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lawful_basis_fails_on_vague_purpose() {
        let gate = LawfulBasisGate;
        let text = "We may use your personal data to improve our services.";
        assert!(gate.is_relevant(text, "privacy_notice"));
        let finding = gate.check(text, "privacy_notice");
        assert!(finding.is_failure());
        assert_eq!(finding.severity, Severity::High);
    }

    #[test]
    fn test_lawful_basis_passes_when_stated() {
        let gate = LawfulBasisGate;
        let text = "We process your data under our legitimate interests.";
        let finding = gate.check(text, "privacy_notice");
        assert!(!finding.is_failure());
    }

    #[test]
    fn test_data_subject_rights_fails_when_absent() {
        let gate = DataSubjectRightsGate;
        let finding = gate.check("We collect your email address.", "privacy_notice");
        assert!(finding.is_failure());
    }

    #[test]
    fn test_data_subject_rights_passes_when_present() {
        let gate = DataSubjectRightsGate;
        let text = "You have the right to access, rectify, or erase your data, and to complain to the ICO.";
        let finding = gate.check(text, "privacy_notice");
        assert!(!finding.is_failure());
    }

    #[test]
    fn test_plain_language_skips_short_text() {
        let gate = PlainLanguageGate;
        let finding = gate.check("We use cookies.", "privacy_notice");
        assert!(!finding.is_failure());
    }
}
