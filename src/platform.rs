//! The `Platform` value: one owner of every shared, read-mostly
//! collaborator (module registry, snippet registry, result cache, audit
//! log, profiler) constructed once at startup and carried through every
//! request. There is no process-wide mutable singleton — a caller (the
//! CLI binary, or an HTTP handler built on top of this crate) owns one
//! `Platform` and threads it through.
//!
//! This is also where the six core operations live: `validate`,
//! `correct`, `list_modules`, `enable_module`/`disable_module`,
//! `clear_cache`, `metrics`.

use std::collections::BTreeMap;

use crate::audit::AuditLog;
use crate::cache::{LayeredResultCache, ResultCache};
use crate::config::Settings;
use crate::engine::{Engine, ValidateOptions};
use crate::error::Result;
use crate::model::{AuditEvent, ValidationResult};
use crate::profiler::{OperationReport, Profiler};
use crate::registry::{ModuleRegistry, ModuleSummary};
use crate::snippets::SnippetRegistry;
use crate::synthesis::{CorrectionOutcome, SynthesisEngine};

/// Bundles the engine and its collaborators behind a single external API.
pub struct Platform {
    engine: Engine,
    snippets: SnippetRegistry,
    audit: AuditLog,
    profiler: Profiler,
    settings: Settings,
}

impl Platform {
    /// Builds a platform from `settings`, constructing a fresh module
    /// registry, layered result cache, snippet registry, audit log, and
    /// profiler. Module construction is lazy (see [`crate::registry`]):
    /// this call does no per-module work beyond building the empty
    /// catalogue.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let cache: Box<dyn ResultCache> = Box::new(LayeredResultCache::from_settings(&settings));
        let audit = AuditLog::new(crate::audit::DEFAULT_CAPACITY);
        let engine = Engine::new(ModuleRegistry::new(), cache, settings.clone(), audit);
        Self {
            engine,
            snippets: SnippetRegistry::new(),
            audit: AuditLog::new(crate::audit::DEFAULT_CAPACITY),
            profiler: Profiler::new(),
            settings,
        }
    }

    /// Runs validation and records it in the profiler under
    /// `"platform:validate"`.
    ///
    /// # Errors
    ///
    /// See [`Engine::validate`].
    pub fn validate(&self, text: &str, document_type: &str, active_modules: &[String]) -> Result<ValidationResult> {
        let mut measurement = self.profiler.measure("platform:validate");
        measurement.set_bytes_in(text.len() as u64);
        self.engine.validate(text, document_type, active_modules, &ValidateOptions::default())
    }

    /// Runs the deterministic correction loop, defaulting `max_iterations`
    /// to the configured setting when `None`.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::error::Error`] raised during the
    /// underlying re-validation calls.
    pub fn correct(
        &self,
        text: &str,
        document_type: &str,
        active_modules: &[String],
        max_iterations: Option<usize>,
    ) -> Result<CorrectionOutcome> {
        let mut measurement = self.profiler.measure("platform:correct");
        measurement.set_bytes_in(text.len() as u64);
        let synth = SynthesisEngine::new(&self.engine, &self.snippets, &self.audit);
        let outcome = synth.correct(text, document_type, active_modules, max_iterations.unwrap_or(self.settings.max_iterations))?;
        measurement.set_bytes_out(outcome.final_text.len() as u64);
        Ok(outcome)
    }

    /// Lists every catalogued module and whether it is currently enabled.
    #[must_use]
    pub fn list_modules(&self) -> Vec<ModuleSummary> {
        self.engine.registry().list_available()
    }

    /// Enables a previously-disabled module for future requests.
    pub fn enable_module(&self, module_id: &str) {
        self.engine.registry().enable(module_id);
    }

    /// Disables a module for future requests.
    pub fn disable_module(&self, module_id: &str) {
        self.engine.registry().disable(module_id);
    }

    /// Clears cached validation results, optionally scoped to one namespace.
    pub fn clear_cache(&self, namespace: Option<&str>) {
        self.engine.clear_cache(namespace);
    }

    /// Current result-cache usage statistics.
    #[must_use]
    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.engine.cache_stats()
    }

    /// Snapshot of every profiled operation's statistics.
    #[must_use]
    pub fn metrics(&self) -> BTreeMap<String, OperationReport> {
        self.profiler.report()
    }

    /// Every retained audit event, oldest first.
    #[must_use]
    pub fn audit_events(&self) -> Vec<AuditEvent> {
        let mut events = self.engine.audit().snapshot();
        events.extend(self.audit.snapshot());
        events.sort_by_key(|e| e.ts);
        events
    }

    /// The settings this platform was built from.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_s1_fca_scenario_via_platform() {
        let platform = Platform::new(Settings::default());
        let result = platform
            .validate("Our fund delivers guaranteed high returns.", "financial_promotion", &["fca_uk".to_string()])
            .unwrap();
        assert!(result.findings.iter().any(|f| f.is_failure()));
    }

    #[test]
    fn test_correct_s1_fca_scenario_via_platform() {
        let platform = Platform::new(Settings::default());
        let outcome = platform
            .correct(
                "Our fund delivers guaranteed high returns.",
                "financial_promotion",
                &["fca_uk".to_string()],
                None,
            )
            .unwrap();
        assert!(outcome.converged);
        assert!(outcome.final_text.contains("Capital at risk"));
    }

    #[test]
    fn test_list_modules_reports_five() {
        let platform = Platform::new(Settings::default());
        assert_eq!(platform.list_modules().len(), 5);
    }

    #[test]
    fn test_enable_disable_roundtrip() {
        let platform = Platform::new(Settings::default());
        platform.disable_module("nda");
        assert!(!platform.list_modules().iter().find(|m| m.module_id == "nda").unwrap().enabled);
        platform.enable_module("nda");
        assert!(platform.list_modules().iter().find(|m| m.module_id == "nda").unwrap().enabled);
    }

    #[test]
    fn test_clear_cache_forces_recompute() {
        let platform = Platform::new(Settings::default());
        let modules = vec!["fca_uk".to_string()];
        let first = platform.validate("guaranteed returns", "financial_promotion", &modules).unwrap();
        assert!(!first.cache_hit);
        let second = platform.validate("guaranteed returns", "financial_promotion", &modules).unwrap();
        assert!(second.cache_hit);
        platform.clear_cache(None);
        let third = platform.validate("guaranteed returns", "financial_promotion", &modules).unwrap();
        assert!(!third.cache_hit);
    }

    #[test]
    fn test_cache_stats_reports_hits_and_misses() {
        let platform = Platform::new(Settings::default());
        let modules = vec!["fca_uk".to_string()];
        platform.validate("guaranteed returns", "financial_promotion", &modules).unwrap();
        platform.validate("guaranteed returns", "financial_promotion", &modules).unwrap();
        let stats = platform.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_metrics_records_validate_and_correct() {
        let platform = Platform::new(Settings::default());
        platform.validate("text", "financial_promotion", &[]).unwrap();
        platform.correct("text", "financial_promotion", &[], None).unwrap();
        let metrics = platform.metrics();
        assert!(metrics.contains_key("platform:validate"));
        assert!(metrics.contains_key("platform:correct"));
    }
}
