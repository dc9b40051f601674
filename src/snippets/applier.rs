//! Applies a single rendered snippet to a document.
//!
//! Insertion is purely textual and deterministic: the same
//! `(document, snippet, vars)` triple always produces the same output
//! byte-for-byte, which is what lets the synthesis loop re-run a gate
//! against the result and trust the comparison.

use std::collections::BTreeMap;

use crate::error::{Result, SynthesisError};
use crate::model::{InsertionPoint, Snippet};

/// Renders `snippet` with `vars` and inserts it into `text` at the
/// snippet's configured insertion point.
///
/// For [`InsertionPoint::Section`], a header match (exact, case-insensitive,
/// trimmed line comparison) has its content — up to the next heading-like
/// line, or end of document — replaced by the rendered body; with no
/// match, `\n\n<header>\n<rendered>` is appended.
///
/// # Errors
///
/// Returns [`SynthesisError::UnresolvedVariable`] if a template
/// placeholder has neither a supplied value nor a default.
pub fn apply_snippet(text: &str, snippet: &Snippet, vars: &BTreeMap<String, String>) -> Result<String> {
    let rendered = snippet.render(vars).map_err(|variable| SynthesisError::UnresolvedVariable {
        snippet_id: snippet.snippet_id.clone(),
        variable,
    })?;

    Ok(match snippet.insertion_point {
        InsertionPoint::Prepend => prepend(text, &rendered),
        InsertionPoint::Append => append(text, &rendered),
        InsertionPoint::Section => insert_section(text, snippet.section_header.as_deref(), &rendered),
    })
}

fn prepend(text: &str, rendered: &str) -> String {
    if text.is_empty() {
        return rendered.to_string();
    }
    format!("{rendered}\n\n{text}")
}

fn append(text: &str, rendered: &str) -> String {
    if text.is_empty() {
        return rendered.to_string();
    }
    format!("{}\n\n{rendered}", text.trim_end())
}

/// Implements §4.11's `section` insertion point: if `header` already
/// appears as a line in `text` (exact match, case-insensitive, trimmed),
/// everything from the line after it up to the next heading-like line (or
/// end of document) is replaced by `rendered`. Otherwise the header and
/// body are appended as a new section.
fn insert_section(text: &str, header: Option<&str>, rendered: &str) -> String {
    let Some(header) = header else {
        return append(text, rendered);
    };

    let lines: Vec<&str> = text.lines().collect();
    let header_trimmed = header.trim();
    let header_idx = lines.iter().position(|line| line.trim().eq_ignore_ascii_case(header_trimmed));

    let Some(header_idx) = header_idx else {
        return append(text, &format!("{header}\n{rendered}"));
    };

    let tail_idx = lines[header_idx + 1..]
        .iter()
        .position(|line| is_heading_like(line))
        .map_or(lines.len(), |offset| header_idx + 1 + offset);

    let mut out = lines[..=header_idx].join("\n");
    out.push('\n');
    out.push_str(rendered);
    if tail_idx < lines.len() {
        out.push('\n');
        out.push_str(&lines[tail_idx..].join("\n"));
    }
    out
}

/// A line starting with `#`, or an all-uppercase line of at least 3
/// characters — the two heading markers §4.11 stops a section replace at.
fn is_heading_like(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.starts_with('#') {
        return true;
    }
    trimmed.len() >= 3 && trimmed.chars().any(char::is_alphabetic) && trimmed.chars().all(|c| !c.is_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InsertionPoint;

    fn snippet(insertion_point: InsertionPoint, section_header: Option<&str>) -> Snippet {
        Snippet {
            snippet_id: "test_snippet".to_string(),
            module_id: "fca_uk".to_string(),
            gate_id: "fair_clear_not_misleading".to_string(),
            priority: 10,
            insertion_point,
            section_header: section_header.map(str::to_string),
            template: "Capital at risk.".to_string(),
            defaults: BTreeMap::new(),
            legal_source: "FCA COBS 4.2.1".to_string(),
        }
    }

    #[test]
    fn test_append_adds_to_end() {
        let snippet = snippet(InsertionPoint::Append, None);
        let result = apply_snippet("Our fund returns 10%.", &snippet, &BTreeMap::new()).unwrap();
        assert_eq!(result, "Our fund returns 10%.\n\nCapital at risk.");
    }

    #[test]
    fn test_prepend_adds_to_start() {
        let snippet = snippet(InsertionPoint::Prepend, None);
        let result = apply_snippet("Our fund returns 10%.", &snippet, &BTreeMap::new()).unwrap();
        assert_eq!(result, "Capital at risk.\n\nOur fund returns 10%.");
    }

    #[test]
    fn test_section_replaces_content_to_end_of_document_when_no_next_heading() {
        let snippet = snippet(InsertionPoint::Section, Some("## Risks"));
        let text = "## Risks\nSome existing text.";
        let result = apply_snippet(text, &snippet, &BTreeMap::new()).unwrap();
        assert_eq!(result, "## Risks\nCapital at risk.");
    }

    #[test]
    fn test_section_replaces_content_only_up_to_next_heading() {
        let snippet = snippet(InsertionPoint::Section, Some("## Risks"));
        let text = "## Risks\nOld risk text.\n## Fees\nFee schedule follows.";
        let result = apply_snippet(text, &snippet, &BTreeMap::new()).unwrap();
        assert_eq!(result, "## Risks\nCapital at risk.\n## Fees\nFee schedule follows.");
    }

    #[test]
    fn test_section_matches_header_case_insensitively_and_trimmed() {
        let snippet = snippet(InsertionPoint::Section, Some("## Risks"));
        let text = "  ## risks  \nOld risk text.";
        let result = apply_snippet(text, &snippet, &BTreeMap::new()).unwrap();
        assert_eq!(result, "  ## risks  \nCapital at risk.");
    }

    #[test]
    fn test_section_creates_header_when_absent() {
        let snippet = snippet(InsertionPoint::Section, Some("## Risks"));
        let result = apply_snippet("Our fund returns 10%.", &snippet, &BTreeMap::new()).unwrap();
        assert_eq!(result, "Our fund returns 10%.\n\n## Risks\nCapital at risk.");
    }

    #[test]
    fn test_apply_is_byte_identical_across_repeats() {
        let snippet = snippet(InsertionPoint::Append, None);
        let a = apply_snippet("text", &snippet, &BTreeMap::new()).unwrap();
        let b = apply_snippet("text", &snippet, &BTreeMap::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unresolved_variable_errors() {
        let mut snippet = snippet(InsertionPoint::Append, None);
        snippet.template = "{missing}".to_string();
        let err = apply_snippet("text", &snippet, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, crate::error::Error::Synthesis(SynthesisError::UnresolvedVariable { .. })));
    }
}
