//! Gate implementations, grouped by regulatory module.
//!
//! Every gate here is a zero-sized type implementing [`crate::model::Gate`].
//! They are never constructed directly by callers — the [`crate::registry`]
//! catalogue owns the `fn() -> Box<dyn Gate>` constructors and lazily
//! builds each module's gates on first use.

pub mod fca_uk;
pub mod gdpr_uk;
pub mod nda;
pub mod scottish_law;
pub mod tax_uk;

/// Whether `document_type` appears in `types` (case-sensitive, exact match —
/// document types are a small closed vocabulary defined by the caller).
#[must_use]
pub(crate) fn is_document_type(document_type: &str, types: &[&str]) -> bool {
    types.contains(&document_type)
}

/// Whether any of `keywords` occurs in `text`, case-insensitively. Used as
/// the keyword-trigger half of a relevance predicate alongside
/// [`is_document_type`].
#[must_use]
pub(crate) fn contains_any_keyword(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}
