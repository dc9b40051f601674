//! Static catalogue of pre-approved correction snippets.
//!
//! Every snippet here has been reviewed against its `legal_source`
//! ahead of time; the synthesis engine only ever selects and fills in
//! one of these templates, it never generates new compliance language.

use std::collections::BTreeMap;

use crate::model::{InsertionPoint, Snippet};

fn defaults(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
}

/// The full static snippet catalogue, one or more entries per
/// `(module_id, gate_id)` that has an approved correction.
#[must_use]
pub fn catalogue() -> Vec<Snippet> {
    vec![
        Snippet {
            snippet_id: "fca_risk_warning".to_string(),
            module_id: "fca_uk".to_string(),
            gate_id: "fair_clear_not_misleading".to_string(),
            priority: 10,
            insertion_point: InsertionPoint::Append,
            section_header: None,
            template: "Capital at risk. {provider_name} does not guarantee returns and past performance is not a reliable indicator of future results.".to_string(),
            defaults: defaults(&[("provider_name", "This provider")]),
            legal_source: "FCA COBS 4.2.1".to_string(),
        },
        Snippet {
            snippet_id: "fca_fos_signposting".to_string(),
            module_id: "fca_uk".to_string(),
            gate_id: "fos_signposting".to_string(),
            priority: 20,
            insertion_point: InsertionPoint::Append,
            section_header: None,
            template: "If you are unhappy with our service you may refer your complaint to the Financial Ombudsman Service at financial-ombudsman.org.uk.".to_string(),
            defaults: BTreeMap::new(),
            legal_source: "FCA DISP 1.3".to_string(),
        },
        Snippet {
            snippet_id: "gdpr_lawful_basis".to_string(),
            module_id: "gdpr_uk".to_string(),
            gate_id: "lawful_basis".to_string(),
            priority: 10,
            insertion_point: InsertionPoint::Append,
            section_header: Some("Lawful basis for processing".to_string()),
            template: "We process your personal data under the lawful basis of {lawful_basis} in accordance with UK GDPR Article 6.".to_string(),
            defaults: defaults(&[("lawful_basis", "legitimate interests")]),
            legal_source: "UK GDPR Art. 6".to_string(),
        },
        Snippet {
            snippet_id: "gdpr_data_subject_rights".to_string(),
            module_id: "gdpr_uk".to_string(),
            gate_id: "data_subject_rights".to_string(),
            priority: 20,
            insertion_point: InsertionPoint::Append,
            section_header: Some("Your rights".to_string()),
            template: "You have the right to access, rectify, erase, and port your personal data, and to object to or restrict its processing. To exercise these rights, contact {contact_email}.".to_string(),
            defaults: defaults(&[("contact_email", "our data protection officer")]),
            legal_source: "UK GDPR Arts. 15-21".to_string(),
        },
        Snippet {
            snippet_id: "scots_heritable_property".to_string(),
            module_id: "scottish_law".to_string(),
            gate_id: "property_terminology".to_string(),
            priority: 10,
            insertion_point: InsertionPoint::Append,
            section_header: None,
            template: "For the avoidance of doubt, references to land tenure in this document are to heritable property registered with the Registers of Scotland, Scots law having abolished feudal tenure.".to_string(),
            defaults: BTreeMap::new(),
            legal_source: "Abolition of Feudal Tenure etc. (Scotland) Act 2000".to_string(),
        },
        Snippet {
            snippet_id: "nda_bounded_term".to_string(),
            module_id: "nda".to_string(),
            gate_id: "confidentiality_term".to_string(),
            priority: 10,
            insertion_point: InsertionPoint::Append,
            section_header: None,
            template: "The obligations of confidentiality in this agreement shall survive for a period of {term_years} years from the date of disclosure.".to_string(),
            defaults: defaults(&[("term_years", "5")]),
            legal_source: "Unfair Contract Terms guidance".to_string(),
        },
        Snippet {
            snippet_id: "nda_carve_outs".to_string(),
            module_id: "nda".to_string(),
            gate_id: "carve_outs".to_string(),
            priority: 20,
            insertion_point: InsertionPoint::Append,
            section_header: None,
            template: "Confidential information does not include information that is already public, independently developed without reference to the disclosed information, or rightfully received from a third party without restriction.".to_string(),
            defaults: BTreeMap::new(),
            legal_source: "Standard NDA drafting practice".to_string(),
        },
        Snippet {
            snippet_id: "tax_disclaimer".to_string(),
            module_id: "tax_uk".to_string(),
            gate_id: "tax_disclaimer".to_string(),
            priority: 10,
            insertion_point: InsertionPoint::Append,
            section_header: None,
            template: "Tax treatment depends on individual circumstances and may be subject to change in future.".to_string(),
            defaults: BTreeMap::new(),
            legal_source: "HMRC tax disclosure guidance".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_keys_are_unique() {
        let snippets = catalogue();
        let mut ids: Vec<&str> = snippets.iter().map(|s| s.snippet_id.as_str()).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn test_every_snippet_renders_with_defaults_only() {
        for snippet in catalogue() {
            assert!(snippet.render(&BTreeMap::new()).is_ok(), "{} failed to render with defaults", snippet.snippet_id);
        }
    }
}
