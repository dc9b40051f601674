//! Bias and toxicity keyword/pattern detector.
//!
//! Used chiefly by the employment and HR-contract gates (Scottish law
//! module) to flag discriminatory language and by the FCA module to
//! flag exaggerated, fear-mongering sales language. Scalar scores plus
//! spans, same contract as every other universal detector.

use crate::model::Span;

const DISCRIMINATORY_TERMS: &[&str] = &[
    "young and energetic",
    "digital native",
    "native english speaker",
    "recent graduate only",
    "able-bodied",
    "no visible disabilities",
];

const FEAR_LANGUAGE: &[&str] = &[
    "don't be left behind",
    "miss out forever",
    "last chance ever",
    "everyone else is already",
];

/// Result of a bias/toxicity scan: a scalar score in `[0.0, 1.0]`
/// (fraction of flagged terms relative to word count, capped at 1.0)
/// plus the spans that triggered it.
#[derive(Debug, Clone, PartialEq)]
pub struct BiasScore {
    /// Overall bias/toxicity score; `0.0` is clean, `1.0` is saturated.
    pub score: f64,
    /// Spans over the flagged phrases, tagged `bias:<category>`.
    pub spans: Vec<Span>,
}

/// Scans `text` for discriminatory hiring language and fear-based sales
/// pressure. Pure and deterministic: case-insensitive substring matching
/// against a fixed keyword list, in list order then by `start`.
#[must_use]
pub fn detect(text: &str) -> BiasScore {
    let lower = text.to_lowercase();
    let mut spans = Vec::new();

    for term in DISCRIMINATORY_TERMS {
        for (start, _) in lower.match_indices(term) {
            spans.push(Span::new(start, start + term.len(), "bias:discriminatory"));
        }
    }
    for term in FEAR_LANGUAGE {
        for (start, _) in lower.match_indices(term) {
            spans.push(Span::new(start, start + term.len(), "bias:fear_language"));
        }
    }
    spans.sort_by_key(|s| (s.start, s.end));

    let word_count = text.split_whitespace().count().max(1);
    let score = (spans.len() as f64 / word_count as f64 * 10.0).min(1.0);

    BiasScore { score, spans }
}
