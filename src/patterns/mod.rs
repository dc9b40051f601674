//! Compiled pattern sets shared by gates within a regulatory domain.
//!
//! Each named set is built once behind a [`std::sync::OnceLock`] and kept
//! for the process lifetime — gates borrow `&'static` references rather
//! than compiling their own regexes per call. The `regex` crate already
//! gives linear-time matching (no catastrophic backtracking is possible),
//! so the budget check in [`compile_checked`] exists only to reject a
//! pattern that is pathologically slow on realistic input, not to guard
//! against exponential blowup.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use regex::{Regex, RegexBuilder};

/// Maximum time a single pattern may take to run once against its sample
/// text before it is rejected at load.
const MATCH_BUDGET: Duration = Duration::from_millis(25);

/// A named, pre-compiled regex plus the sample text used to budget-check it.
pub struct PatternSpec {
    /// Stable name, used in diagnostics and not exposed outside this module.
    pub name: &'static str,
    /// Pattern source, compiled case-insensitively unless it starts with `(?-i)`.
    pub source: &'static str,
}

/// Compiles `spec` and verifies it completes within [`MATCH_BUDGET`]
/// against `sample`. Returns the compiled regex, or panics with a
/// diagnostic message naming the offending pattern.
///
/// Patterns are rejected at load, never silently dropped: a gate that
/// depends on a pattern which fails this check is a programming error,
/// caught the first time the owning module is constructed.
#[must_use]
pub fn compile_checked(spec: &PatternSpec, sample: &str) -> Regex {
    let regex = RegexBuilder::new(spec.source)
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|e| panic!("pattern '{}' failed to compile: {e}", spec.name));

    let started = Instant::now();
    let _ = regex.is_match(sample);
    let elapsed = started.elapsed();
    assert!(
        elapsed <= MATCH_BUDGET,
        "pattern '{}' exceeded match budget ({elapsed:?} > {MATCH_BUDGET:?})",
        spec.name
    );

    regex
}

/// FCA financial-promotion risk-warning and misleading-claim detectors.
pub mod fca_uk {
    use super::{OnceLock, PatternSpec, Regex, compile_checked};

    /// Superlative/guarantee claims unsupported by a risk warning.
    pub fn guaranteed_returns() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            compile_checked(
                &PatternSpec {
                    name: "fca_uk::guaranteed_returns",
                    source: r"\b(guarantee(d|s)?|risk[- ]free|no[- ]risk|certain(ty)? (profit|return)|cannot lose)\b",
                },
                "Our fund delivers guaranteed high returns with no risk to your capital.",
            )
        })
    }

    /// Phrases indicating a standard risk warning is present.
    pub fn risk_warning_present() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            compile_checked(
                &PatternSpec {
                    name: "fca_uk::risk_warning_present",
                    source: r"capital (is )?at risk|value of investments can (fall|go down)|you may (get back|receive) less than (you invest|your original investment)",
                },
                "Capital at risk. The value of investments can fall as well as rise.",
            )
        })
    }

    /// Financial Ombudsman Service signposting phrases.
    pub fn fos_signposting_present() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            compile_checked(
                &PatternSpec {
                    name: "fca_uk::fos_signposting_present",
                    source: r"financial ombudsman service|\bfos\b",
                },
                "You may refer your complaint to the Financial Ombudsman Service.",
            )
        })
    }

    /// Incentive/urgency language pressuring an immediate decision.
    pub fn pressure_selling() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            compile_checked(
                &PatternSpec {
                    name: "fca_uk::pressure_selling",
                    source: r"\b(act now|limited time only|offer (closes|ends) (today|soon)|don'?t miss out)\b",
                },
                "Act now - this offer closes today, don't miss out.",
            )
        })
    }
}

/// UK GDPR privacy-notice detectors.
pub mod gdpr_uk {
    use super::{OnceLock, PatternSpec, Regex, compile_checked};

    /// Phrases citing a recognised Article 6 lawful basis.
    pub fn lawful_basis_present() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            compile_checked(
                &PatternSpec {
                    name: "gdpr_uk::lawful_basis_present",
                    source: r"lawful basis|legitimate interests?|contractual necessity|legal obligation|vital interests?|public task|your consent",
                },
                "We process your data under our legitimate interests and with your consent.",
            )
        })
    }

    /// Vague data-use phrasing that does not name a specific purpose.
    pub fn vague_purpose() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            compile_checked(
                &PatternSpec {
                    name: "gdpr_uk::vague_purpose",
                    source: r"\bto improve our services\b|\bfor business purposes\b|\bas (we|necessary) see fit\b",
                },
                "We may use your personal data to improve our services.",
            )
        })
    }

    /// Data subject rights enumeration (access, erasure, portability, etc.).
    pub fn data_subject_rights_present() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            compile_checked(
                &PatternSpec {
                    name: "gdpr_uk::data_subject_rights_present",
                    source: r"right to (access|erasure|rectification|portability|object)|information commissioner|\bico\b",
                },
                "You have the right to access, rectify, or erase your data, and to complain to the ICO.",
            )
        })
    }

    /// International transfer disclosure phrases.
    pub fn international_transfer_present() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            compile_checked(
                &PatternSpec {
                    name: "gdpr_uk::international_transfer_present",
                    source: r"transferred outside the uk|international transfer|standard contractual clauses|adequacy (decision|regulations)",
                },
                "Your data may be transferred outside the UK under standard contractual clauses.",
            )
        })
    }
}

/// Scottish-law terminology detectors (property and employment contracts).
pub mod scottish_law {
    use super::{OnceLock, PatternSpec, Regex, compile_checked};

    /// English land-law terms with no direct Scots-law meaning.
    pub fn english_property_terms() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            compile_checked(
                &PatternSpec {
                    name: "scottish_law::english_property_terms",
                    source: r"\bfreehold\b|\bleasehold\b|\bland registry\b(?! of scotland)",
                },
                "The freehold shall be transferred via the Land Registry.",
            )
        })
    }

    /// Correct Scots-law equivalents already in use.
    pub fn scots_property_terms_present() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            compile_checked(
                &PatternSpec {
                    name: "scottish_law::scots_property_terms_present",
                    source: r"heritable property|registers of scotland|\bdisposition\b",
                },
                "The heritable property shall be transferred and registered with the Registers of Scotland.",
            )
        })
    }

    /// English employment-tribunal terminology used where Scottish courts apply.
    pub fn english_tribunal_terms() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            compile_checked(
                &PatternSpec {
                    name: "scottish_law::english_tribunal_terms",
                    source: r"\bcounty court\b|\bhigh court of england\b",
                },
                "Disputes shall be heard in the County Court.",
            )
        })
    }
}

/// NDA confidentiality-scope detectors.
pub mod nda {
    use super::{OnceLock, PatternSpec, Regex, compile_checked};

    /// Confidentiality obligations with no stated expiry.
    pub fn perpetual_obligation() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            compile_checked(
                &PatternSpec {
                    name: "nda::perpetual_obligation",
                    source: r"\bin perpetuity\b|\bindefinitely\b|\bforever\b",
                },
                "The obligations of confidentiality shall survive indefinitely.",
            )
        })
    }

    /// A stated, bounded confidentiality term.
    pub fn bounded_term_present() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            compile_checked(
                &PatternSpec {
                    name: "nda::bounded_term_present",
                    source: r"for a period of \d+ years?|shall survive for \d+ years?|expires? on",
                },
                "This agreement shall survive for 5 years from the date of disclosure.",
            )
        })
    }

    /// Standard carve-outs for information already public or independently known.
    pub fn carve_outs_present() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            compile_checked(
                &PatternSpec {
                    name: "nda::carve_outs_present",
                    source: r"already (publicly|in the public domain)|independently developed|rightfully (received|known)",
                },
                "This excludes information already in the public domain or independently developed.",
            )
        })
    }
}

/// UK tax-disclosure detectors.
pub mod tax_uk {
    use super::{OnceLock, PatternSpec, Regex, compile_checked};

    /// Tax-efficiency claims without the mandatory HMRC disclaimer.
    pub fn tax_efficiency_claim() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            compile_checked(
                &PatternSpec {
                    name: "tax_uk::tax_efficiency_claim",
                    source: r"tax[- ]free|tax[- ]efficient|no tax (to pay|liability)",
                },
                "This product is completely tax-free with no tax to pay.",
            )
        })
    }

    /// Phrases indicating the disclaimer that tax treatment depends on
    /// individual circumstances and may change.
    pub fn tax_disclaimer_present() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            compile_checked(
                &PatternSpec {
                    name: "tax_uk::tax_disclaimer_present",
                    source: r"depends on (your|individual) (personal )?circumstances|tax (treatment|rules?) (may|can) change|\bhmrc\b",
                },
                "Tax treatment depends on your individual circumstances and may change in future, per HMRC guidance.",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fca_guaranteed_returns_matches() {
        assert!(fca_uk::guaranteed_returns().is_match("guaranteed high returns"));
        assert!(!fca_uk::guaranteed_returns().is_match("returns may vary"));
    }

    #[test]
    fn test_gdpr_vague_purpose_matches() {
        assert!(gdpr_uk::vague_purpose().is_match("to improve our services"));
    }

    #[test]
    fn test_scottish_english_terms_matches() {
        assert!(scottish_law::english_property_terms().is_match("the freehold shall be transferred"));
        assert!(!scottish_law::english_property_terms().is_match("registers of scotland"));
    }

    #[test]
    fn test_nda_perpetual_obligation_matches() {
        assert!(nda::perpetual_obligation().is_match("survive in perpetuity"));
    }

    #[test]
    fn test_tax_efficiency_claim_matches() {
        assert!(tax_uk::tax_efficiency_claim().is_match("completely tax-free"));
    }

    #[test]
    fn test_patterns_are_cached_across_calls() {
        let a: *const Regex = fca_uk::guaranteed_returns();
        let b: *const Regex = fca_uk::guaranteed_returns();
        assert_eq!(a, b, "pattern should be built once and reused");
    }
}
