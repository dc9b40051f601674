//! Personally identifiable information detector.
//!
//! Reused by gates across every module wherever PII exposure is itself a
//! compliance concern (e.g. an NDA leaking a signatory's National
//! Insurance number, or a GDPR notice illustrating data collection with
//! a real example). Each match becomes a [`Span`] tagged `pii:<subtype>`.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::Span;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[\w.+-]+@[\w-]+\.[\w.-]+\b").expect("email pattern is valid")
    })
}

fn ni_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b[A-CEGHJ-PR-TW-Z]{2}\s?\d{2}\s?\d{2}\s?\d{2}\s?[A-D]\b")
            .expect("NI number pattern is valid")
    })
}

fn uk_phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:\+44\s?7\d{3}|07\d{3})\s?\d{3}\s?\d{3}\b")
            .expect("UK phone pattern is valid")
    })
}

fn uk_postcode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b[A-Z]{1,2}\d[A-Z\d]?\s?\d[A-Z]{2}\b")
            .expect("postcode pattern is valid")
    })
}

fn sort_code_account_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b\d{2}-\d{2}-\d{2}\b\s*(?:,?\s*(?:a/c|account)?\s*\d{8}\b)?")
            .expect("sort code pattern is valid")
    })
}

/// Scans `text` for PII instances, returning one span per match tagged
/// with `pii:<subtype>` (`email`, `ni_number`, `phone`, `postcode`,
/// `bank_detail`). Deterministic and pure: spans are emitted in the order
/// the underlying patterns are checked, then by ascending `start`.
#[must_use]
pub fn detect(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    for m in email_re().find_iter(text) {
        spans.push(Span::new(m.start(), m.end(), "pii:email"));
    }
    for m in ni_number_re().find_iter(text) {
        spans.push(Span::new(m.start(), m.end(), "pii:ni_number"));
    }
    for m in uk_phone_re().find_iter(text) {
        spans.push(Span::new(m.start(), m.end(), "pii:phone"));
    }
    for m in uk_postcode_re().find_iter(text) {
        spans.push(Span::new(m.start(), m.end(), "pii:postcode"));
    }
    for m in sort_code_account_re().find_iter(text) {
        spans.push(Span::new(m.start(), m.end(), "pii:bank_detail"));
    }
    spans.sort_by_key(|s| (s.start, s.end));
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_email() {
        let spans = detect("Contact us at support@example.co.uk for help.");
        assert!(spans.iter().any(|s| s.kind == "pii:email"));
    }

    #[test]
    fn test_detects_ni_number() {
        let spans = detect("NI number: QQ123456C on file.");
        assert!(spans.iter().any(|s| s.kind == "pii:ni_number"));
    }

    #[test]
    fn test_detects_uk_phone() {
        let spans = detect("Call us on 07911 123456 any time.");
        assert!(spans.iter().any(|s| s.kind == "pii:phone"));
    }

    #[test]
    fn test_detects_postcode() {
        let spans = detect("Our office is at EC1A 1BB, London.");
        assert!(spans.iter().any(|s| s.kind == "pii:postcode"));
    }

    #[test]
    fn test_no_false_positive_on_clean_text() {
        let spans = detect("This document contains no personal data at all.");
        assert!(spans.is_empty());
    }

    #[test]
    fn test_spans_sorted_by_start() {
        let spans = detect("a@b.com then EC1A 1BB then c@d.com");
        for w in spans.windows(2) {
            assert!(w[0].start <= w[1].start);
        }
    }
}
