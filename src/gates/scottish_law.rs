//! Scottish-law terminology gates for property and employment contracts.
//!
//! Scots law has its own system of land tenure and its own employment
//! tribunal/court structure; English-law terminology imported wholesale
//! into a Scottish contract is not merely stylistic drift, it can be
//! substantively wrong (Scotland abolished feudal tenure and has no
//! "freehold"/"leasehold" distinction, and disputes under Scots law are
//! not heard in an English County Court).

use crate::detectors::detect_bias;
use crate::model::{Finding, Gate, Severity};
use crate::patterns::scottish_law as patterns;

use super::{contains_any_keyword, is_document_type};

const PROPERTY_TYPES: &[&str] = &["property_contract"];
const EMPLOYMENT_TYPES: &[&str] = &["employment_contract"];
const SCOTTISH_KEYWORDS: &[&str] = &["scotland", "scottish", "scots law"];

/// Flags English land-tenure terminology (`freehold`, `leasehold`, `Land
/// Registry`) used where Scots property law applies.
pub struct PropertyTerminologyGate;

impl Gate for PropertyTerminologyGate {
    fn is_relevant(&self, text: &str, document_type: &str) -> bool {
        is_document_type(document_type, PROPERTY_TYPES) || contains_any_keyword(text, SCOTTISH_KEYWORDS)
    }

    fn check(&self, text: &str, _document_type: &str) -> Finding {
        let matches: Vec<_> = patterns::english_property_terms().find_iter(text).collect();
        if matches.is_empty() || patterns::scots_property_terms_present().is_match(text) {
            return Finding::pass("scottish_law", self.gate_id(), "Abolition of Feudal Tenure etc. (Scotland) Act 2000");
        }
        let spans = matches
            .iter()
            .map(|m| crate::model::Span::new(m.start(), m.end(), "scots:english_property_term"))
            .collect();
        Finding::fail(
            "scottish_law",
            self.gate_id(),
            Severity::Critical,
            "English land-tenure terminology used in a Scots-law property contract",
            "Abolition of Feudal Tenure etc. (Scotland) Act 2000",
            spans,
        )
        .with_suggestion("append a clause using heritable-property and Registers of Scotland terminology")
    }

    fn gate_id(&self) -> &'static str {
        "property_terminology"
    }
}

/// Flags English court terminology used where Scottish courts or
/// tribunals have jurisdiction.
pub struct TribunalTerminologyGate;

impl Gate for TribunalTerminologyGate {
    fn is_relevant(&self, text: &str, document_type: &str) -> bool {
        is_document_type(document_type, PROPERTY_TYPES)
            || is_document_type(document_type, EMPLOYMENT_TYPES)
            || contains_any_keyword(text, SCOTTISH_KEYWORDS)
    }

    fn check(&self, text: &str, _document_type: &str) -> Finding {
        let matches: Vec<_> = patterns::english_tribunal_terms().find_iter(text).collect();
        if matches.is_empty() {
            return Finding::pass("scottish_law", self.gate_id(), "Courts Reform (Scotland) Act 2014");
        }
        let spans = matches
            .iter()
            .map(|m| crate::model::Span::new(m.start(), m.end(), "scots:english_tribunal_term"))
            .collect();
        Finding::fail(
            "scottish_law",
            self.gate_id(),
            Severity::Medium,
            "English court terminology used where a Scottish court has jurisdiction",
            "Courts Reform (Scotland) Act 2014",
            spans,
        )
    }

    fn gate_id(&self) -> &'static str {
        "tribunal_terminology"
    }
}

/// Flags discriminatory hiring language in employment contracts, reusing
/// the universal bias detector.
pub struct EmploymentBiasGate;

impl Gate for EmploymentBiasGate {
    fn is_relevant(&self, text: &str, document_type: &str) -> bool {
        is_document_type(document_type, EMPLOYMENT_TYPES)
    }

    fn check(&self, text: &str, _document_type: &str) -> Finding {
        let result = detect_bias(text);
        if result.spans.is_empty() {
            return Finding::pass("scottish_law", self.gate_id(), "Equality Act 2010");
        }
        Finding::fail(
            "scottish_law",
            self.gate_id(),
            Severity::High,
            "discriminatory hiring language detected",
            "Equality Act 2010",
            result.spans,
        )
    }

    fn gate_id(&self) -> &'static str {
        "employment_bias"
    }
}
