//! Deterministic correction loop: detect, select a pre-approved snippet,
//! apply it, and re-detect, until every gate passes or the iteration
//! budget is exhausted.
//!
//! The loop always bypasses the result cache: intermediate texts are
//! ephemeral and re-validating them against the cache would either
//! pollute it with documents nobody will ask about again, or (worse)
//! read back a stale result for a text that coincidentally matches a
//! prior fingerprint.

use std::collections::HashSet;

use crate::audit::{event, AuditLog};
use crate::engine::{Engine, ValidateOptions};
use crate::error::Result;
use crate::model::{Finding, ValidationResult};
use crate::registry::ModuleRegistry;
use crate::snippets::{apply_snippet, SnippetRegistry};

/// Result of a single synthesis call.
#[derive(Debug, Clone)]
pub struct CorrectionOutcome {
    /// The corrected text after every applicable snippet has been applied.
    pub final_text: String,
    /// Number of detect/apply iterations actually run.
    pub iterations: usize,
    /// Whether every gate passed on the final re-validation.
    pub converged: bool,
    /// Snippet ids applied, in application order.
    pub applied_snippets: Vec<String>,
    /// `(module_id, gate_id)` failures synthesis could not resolve,
    /// because no snippet is registered for them.
    pub unresolved: Vec<(String, String)>,
    /// The last validation result computed during the loop.
    pub final_result: ValidationResult,
}

/// Runs the detect-select-apply-redetect loop against one [`Engine`] and
/// [`SnippetRegistry`].
pub struct SynthesisEngine<'a> {
    engine: &'a Engine,
    snippets: &'a SnippetRegistry,
    audit: &'a AuditLog,
}

impl<'a> SynthesisEngine<'a> {
    /// Builds a synthesis engine over the given collaborators.
    #[must_use]
    pub const fn new(engine: &'a Engine, snippets: &'a SnippetRegistry, audit: &'a AuditLog) -> Self {
        Self { engine, snippets, audit }
    }

    /// Attempts to correct `text` so every gate in `active_modules`
    /// passes. Each iteration re-validates once, then applies a snippet
    /// for every failure that single validation surfaced (not just the
    /// highest-priority one), bounded by `max_iterations`.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::error::Error`] raised by the underlying
    /// validation call.
    pub fn correct(&self, text: &str, document_type: &str, active_modules: &[String], max_iterations: usize) -> Result<CorrectionOutcome> {
        let options = ValidateOptions { bypass_cache: true };
        let mut current = text.to_string();
        let mut applied_snippets = Vec::new();
        let mut tried: HashSet<(String, String)> = HashSet::new();
        let mut unresolved = Vec::new();
        let mut iterations = 0;
        let mut converged;
        let mut result;

        loop {
            result = self.engine.validate(&current, document_type, active_modules, &options)?;
            converged = result.is_compliant();
            if converged || iterations >= max_iterations {
                break;
            }
            iterations += 1;

            let failures = self.ordered_correctable_failures(&result, &tried);
            if failures.is_empty() {
                break;
            }

            // §4.12 step 2 applies a snippet for every failure surfaced
            // by this iteration's single validation pass, not just the
            // highest-priority one — the next iteration's validation
            // re-detects whatever remains.
            for finding in failures {
                let key = (finding.module_id.clone(), finding.gate_id.clone());
                if !tried.insert(key.clone()) {
                    // Idempotence guard: this (module, gate) was already
                    // attempted earlier in this synthesis call.
                    continue;
                }
                match self.snippets.lookup(&finding.module_id, &finding.gate_id) {
                    None => unresolved.push(key),
                    Some(snippet) => match apply_snippet(&current, snippet, &finding.details) {
                        Ok(new_text) => {
                            current = new_text;
                            applied_snippets.push(snippet.snippet_id.clone());
                            self.audit.record(event::snippet_applied(&result.fingerprint, &finding.module_id, &finding.gate_id, &snippet.snippet_id, iterations));
                        }
                        Err(_) => unresolved.push(key),
                    },
                }
            }
        }

        if converged {
            self.audit.record(event::synthesis_converged(&result.fingerprint, iterations));
        } else {
            self.audit.record(event::synthesis_exhausted(&result.fingerprint, iterations));
        }

        Ok(CorrectionOutcome {
            final_text: current,
            iterations,
            converged,
            applied_snippets,
            unresolved,
            final_result: result,
        })
    }

    /// Orders this iteration's not-yet-tried failures per §4.12 step 2:
    /// severity descending, then catalogue module order, then gate
    /// declaration order.
    fn ordered_correctable_failures<'b>(&self, result: &'b ValidationResult, tried: &HashSet<(String, String)>) -> Vec<&'b Finding> {
        let mut failures: Vec<&Finding> = result
            .failures()
            .filter(|f| !tried.contains(&(f.module_id.clone(), f.gate_id.clone())))
            .collect();
        failures.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| module_rank(&a.module_id).cmp(&module_rank(&b.module_id)))
                .then_with(|| ModuleRegistry::gate_rank(&a.module_id, &a.gate_id).cmp(&ModuleRegistry::gate_rank(&b.module_id, &b.gate_id)))
        });
        failures
    }
}

fn module_rank(module_id: &str) -> usize {
    ModuleRegistry::catalogue_order().iter().position(|m| *m == module_id).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryResultCache;
    use crate::config::Settings;

    fn synthesis_fixture() -> (Engine, SnippetRegistry, AuditLog) {
        (
            Engine::new(ModuleRegistry::new(), Box::new(InMemoryResultCache::new(100, 1024 * 1024)), Settings::default(), AuditLog::new(100)),
            SnippetRegistry::new(),
            AuditLog::new(100),
        )
    }

    #[test]
    fn test_correct_fca_scenario_converges() {
        let (engine, snippets, audit) = synthesis_fixture();
        let synth = SynthesisEngine::new(&engine, &snippets, &audit);
        let outcome = synth
            .correct(
                "Our fund delivers guaranteed high returns.",
                "financial_promotion",
                &["fca_uk".to_string()],
                5,
            )
            .unwrap();
        assert!(outcome.converged);
        assert!(outcome.applied_snippets.contains(&"fca_risk_warning".to_string()));
        assert!(outcome.final_text.contains("Capital at risk"));
    }

    #[test]
    fn test_correct_is_idempotent_on_already_compliant_text() {
        let (engine, snippets, audit) = synthesis_fixture();
        let synth = SynthesisEngine::new(&engine, &snippets, &audit);
        let outcome = synth
            .correct("A plain marketing brochure with no claims.", "financial_promotion", &["fca_uk".to_string()], 5)
            .unwrap();
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 0);
        assert!(outcome.applied_snippets.is_empty());
    }

    #[test]
    fn test_correct_respects_max_iterations() {
        let (engine, snippets, audit) = synthesis_fixture();
        let synth = SynthesisEngine::new(&engine, &snippets, &audit);
        let outcome = synth
            .correct("Our fund delivers guaranteed high returns.", "financial_promotion", &["fca_uk".to_string()], 0)
            .unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn test_correct_never_reapplies_same_gate_twice() {
        let (engine, snippets, audit) = synthesis_fixture();
        let synth = SynthesisEngine::new(&engine, &snippets, &audit);
        let outcome = synth
            .correct("Our fund delivers guaranteed high returns.", "financial_promotion", &["fca_uk".to_string()], 5)
            .unwrap();
        let risk_warning_count = outcome.applied_snippets.iter().filter(|s| s.as_str() == "fca_risk_warning").count();
        assert!(risk_warning_count <= 1);
    }
}
