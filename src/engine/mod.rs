//! Validation orchestration: fingerprinting, caching, chunk dispatch, and
//! deterministic finding aggregation.

use std::time::Instant;

use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

use crate::audit::{AuditLog, event};
use crate::cache::ResultCache;
use crate::chunking::{self, ChunkerConfig};
use crate::config::Settings;
use crate::error::{EngineError, Result};
use crate::model::{Finding, Gate, RiskLevel, Severity, ValidationResult};
use crate::registry::{ConstructedModule, ModuleRegistry};

/// Per-call options overriding a subset of [`Settings`] for one request.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Bypasses the result cache entirely — used by the synthesis loop,
    /// which must never read or write cache entries for intermediate,
    /// ephemeral text.
    pub bypass_cache: bool,
}

/// Normalizes text the same way on every call: NFC Unicode
/// normalization, CRLF to LF, and trailing whitespace trimmed per line.
#[must_use]
pub fn normalize(text: &str) -> String {
    let nfc: String = text.nfc().collect();
    nfc.replace("\r\n", "\n")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Computes the lowercase hex SHA-256 fingerprint of `(normalized text,
/// document_type, sorted module ids)`.
#[must_use]
pub fn fingerprint(text: &str, document_type: &str, active_modules: &[String]) -> String {
    let mut sorted: Vec<&str> = active_modules.iter().map(String::as_str).collect();
    sorted.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(normalize(text).as_bytes());
    hasher.update(b"\x1f");
    hasher.update(document_type.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(sorted.join("\x1e").as_bytes());
    hex::encode(hasher.finalize())
}

/// Orchestrates validation: fingerprinting, caching, chunk dispatch, gate
/// execution, and finding aggregation.
pub struct Engine {
    registry: ModuleRegistry,
    cache: Box<dyn ResultCache>,
    settings: Settings,
    audit: AuditLog,
}

impl Engine {
    /// Builds an engine from its collaborators.
    #[must_use]
    pub fn new(registry: ModuleRegistry, cache: Box<dyn ResultCache>, settings: Settings, audit: AuditLog) -> Self {
        Self {
            registry,
            cache,
            settings,
            audit,
        }
    }

    /// Read-only access to the module registry, e.g. for `list_modules`.
    #[must_use]
    pub const fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Read-only access to the audit log.
    #[must_use]
    pub const fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Clears cached results, optionally scoped to one namespace.
    pub fn clear_cache(&self, namespace: Option<&str>) {
        self.cache.clear(namespace);
    }

    /// Current result-cache usage statistics.
    #[must_use]
    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.cache.stats()
    }

    /// Validates `text` against `active_modules`, returning an aggregate
    /// [`ValidationResult`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] for an empty `document_type`,
    /// and [`EngineError::ResourceExceeded`] when `text` or
    /// `active_modules` exceed the configured caps.
    pub fn validate(
        &self,
        text: &str,
        document_type: &str,
        active_modules: &[String],
        options: &ValidateOptions,
    ) -> Result<ValidationResult> {
        if document_type.trim().is_empty() {
            return Err(EngineError::InvalidInput {
                message: "document_type must not be empty".to_string(),
            }
            .into());
        }
        if text.len() > self.settings.max_text_bytes {
            return Err(EngineError::ResourceExceeded {
                message: format!(
                    "text of {} bytes exceeds the {} byte cap",
                    text.len(),
                    self.settings.max_text_bytes
                ),
            }
            .into());
        }
        if active_modules.len() > self.settings.max_active_modules {
            return Err(EngineError::ResourceExceeded {
                message: format!(
                    "{} active modules exceeds the cap of {}",
                    active_modules.len(),
                    self.settings.max_active_modules
                ),
            }
            .into());
        }
        for module_id in active_modules {
            if !self.registry.is_enabled(module_id) {
                return Err(EngineError::UnknownModule {
                    module_id: module_id.clone(),
                }
                .into());
            }
        }

        let started = Instant::now();
        let fp = fingerprint(text, document_type, active_modules);

        if !options.bypass_cache {
            if let Some(cached) = self.cache.get("validation", &fp) {
                if let Ok(mut result) = serde_json::from_slice::<ValidationResult>(&cached) {
                    result.cache_hit = true;
                    return Ok(result);
                }
            }
        }

        let (findings, partial) = self.run_gates(text, document_type, active_modules)?;
        let overall_risk = RiskLevel::aggregate(&findings);
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let result = ValidationResult {
            findings,
            overall_risk,
            fingerprint: fp.clone(),
            elapsed_ms,
            cache_hit: false,
            partial,
        };

        if !options.bypass_cache {
            if let Ok(blob) = serde_json::to_vec(&result) {
                self.cache.set("validation", &fp, blob, self.settings.cache_ttl_s);
            }
        }

        let mut counts: std::collections::BTreeMap<String, usize> = std::collections::BTreeMap::new();
        for f in &result.findings {
            *counts.entry(format!("{:?}", f.status)).or_insert(0) += 1;
        }
        let mut audit_event = event::validation_completed(&fp);
        for (status, count) in counts {
            audit_event = audit_event.with_detail(status, count.to_string());
        }
        self.audit.record(audit_event);

        Ok(result)
    }

    /// Runs every gate of every active module, delegating to the chunker
    /// when `text` exceeds `chunk_threshold_bytes`. Returns the
    /// deterministically-ordered finding list plus whether the overall
    /// deadline truncated execution.
    fn run_gates(&self, text: &str, document_type: &str, active_modules: &[String]) -> Result<(Vec<Finding>, bool)> {
        let deadline = Instant::now() + std::time::Duration::from_millis(self.settings.overall_deadline_ms);

        if text.len() > self.settings.chunk_threshold_bytes {
            return self.run_gates_chunked(text, document_type, active_modules, deadline);
        }

        let mut findings = Vec::new();
        let mut partial = false;
        'modules: for module_id in ModuleRegistry::catalogue_order() {
            if !active_modules.iter().any(|m| m == module_id) {
                continue;
            }
            let module = self.registry.module(module_id)?;
            for (gate_id, gate) in &module.gates {
                if Instant::now() >= deadline {
                    findings.push(Finding::warning(
                        *module_id,
                        "engine",
                        Severity::Medium,
                        "engine_timeout",
                        "",
                        vec![],
                    ));
                    partial = true;
                    break 'modules;
                }
                findings.push(self.run_one_gate(module_id, gate_id, gate.as_ref(), text, document_type));
            }
        }

        findings.sort_by_key(|f| (module_rank(&f.module_id), ModuleRegistry::gate_rank(&f.module_id, &f.gate_id), f.spans.first().map(|s| s.start).unwrap_or(0)));
        Ok((findings, partial))
    }

    fn run_gates_chunked(
        &self,
        text: &str,
        document_type: &str,
        active_modules: &[String],
        deadline: Instant,
    ) -> Result<(Vec<Finding>, bool)> {
        let config = ChunkerConfig {
            chunk_size: self.settings.chunk_size_bytes,
            overlap: self.settings.chunk_overlap_bytes,
        };
        let chunks = chunking::chunk_document(text, config)?;

        // Gates whose `check` reasons about presence/first-occurrence
        // over the whole document (§4.2, `Gate::is_whole_document`) are
        // run once against the full original text rather than per chunk
        // — running them per-chunk would either flip an absence check's
        // verdict or multiply a first-match finding by chunk count,
        // breaking chunk equivalence (§4.7, invariant #5).
        let mut whole_document_gates: Vec<(&'static str, &'static str)> = Vec::new();
        let mut chunk_local_gates: Vec<(&'static str, &'static str)> = Vec::new();
        for module_id in ModuleRegistry::catalogue_order() {
            if !active_modules.iter().any(|m| m == module_id) {
                continue;
            }
            let module = self.registry.module(module_id)?;
            for (gate_id, gate) in &module.gates {
                if gate.is_whole_document() {
                    whole_document_gates.push((*module_id, *gate_id));
                } else {
                    chunk_local_gates.push((*module_id, *gate_id));
                }
            }
        }

        let mut findings = Vec::new();
        for (module_id, gate_id) in &whole_document_gates {
            let module = self.registry.module(module_id)?;
            let gate = gate_by_id(&module, gate_id);
            findings.push(self.run_one_gate(module_id, gate_id, gate, text, document_type));
        }

        let worker_results: Vec<Vec<Finding>> = {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.settings.chunk_workers.max(1))
                .build()
                .map_err(|e| crate::error::Error::Internal(e.to_string()))?;
            pool.install(|| -> Result<Vec<Vec<Finding>>> {
                use rayon::prelude::*;
                chunks
                    .par_iter()
                    .map(|chunk| -> Result<Vec<Finding>> {
                        let mut local = Vec::new();
                        for (module_id, gate_id) in &chunk_local_gates {
                            let module = self.registry.module(module_id)?;
                            let gate = gate_by_id(&module, gate_id);
                            let mut finding =
                                self.run_one_gate(module_id, gate_id, gate, &chunk.text, document_type);
                            finding.shift_spans(chunk.global_start);
                            local.push(finding);
                        }
                        Ok(local)
                    })
                    .collect::<Result<Vec<_>>>()
            })?
        };

        findings.extend(worker_results.into_iter().flatten());
        let partial = Instant::now() >= deadline;

        dedup_chunk_overlap(&mut findings, &chunks, self.settings.chunk_overlap_bytes);

        findings.sort_by_key(|f| (module_rank(&f.module_id), ModuleRegistry::gate_rank(&f.module_id, &f.gate_id), f.spans.first().map(|s| s.start).unwrap_or(0)));
        Ok((findings, partial))
    }

    fn run_one_gate(&self, module_id: &str, gate_id: &str, gate: &dyn Gate, text: &str, document_type: &str) -> Finding {
        if !gate.is_relevant(text, document_type) {
            return Finding::not_applicable(module_id, gate_id);
        }

        let budget = std::time::Duration::from_millis(self.settings.gate_deadline_ms);
        let started = Instant::now();
        let finding = gate.check(text, document_type);
        if started.elapsed() > budget {
            self.audit.record(event::gate_timeout(module_id, gate_id));
            return Finding::timeout(module_id, gate_id);
        }
        finding
    }
}

/// Looks up a constructed module's gate by id. Panics only if the
/// catalogue and the module's own gate list have diverged, which would
/// itself be a startup-time programming error, not a runtime condition.
fn gate_by_id<'m>(module: &'m ConstructedModule, gate_id: &str) -> &'m dyn Gate {
    module
        .gates
        .iter()
        .find(|(id, _)| *id == gate_id)
        .map(|(_, g)| g.as_ref())
        .expect("gate present in module")
}

fn module_rank(module_id: &str) -> usize {
    ModuleRegistry::catalogue_order()
        .iter()
        .position(|m| *m == module_id)
        .unwrap_or(usize::MAX)
}

/// Discards findings whose span lies entirely inside a chunk's overlap
/// window when an equal `(module_id, gate_id, start, end, message)`
/// finding from the preceding chunk's tail already covers it.
fn dedup_chunk_overlap(findings: &mut Vec<Finding>, chunks: &[chunking::DocumentChunk], overlap: usize) {
    if overlap == 0 || chunks.len() < 2 {
        return;
    }
    let mut keys = Vec::with_capacity(findings.len());
    for f in findings.iter() {
        let (start, end) = f
            .spans
            .first()
            .map(|s| (s.start, s.end))
            .unwrap_or((0, 0));
        keys.push((f.module_id.clone(), f.gate_id.clone(), start, end, f.message.clone()));
    }
    let keep = chunking::dedup_overlap_keys(&keys);
    let mut kept = Vec::with_capacity(keep.len());
    for (i, finding) in findings.drain(..).enumerate() {
        if keep.contains(&i) {
            kept.push(finding);
        }
    }
    *findings = kept;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditLog;
    use crate::cache::InMemoryResultCache;

    fn engine() -> Engine {
        Engine::new(
            ModuleRegistry::new(),
            Box::new(InMemoryResultCache::new(1000, 1024 * 1024)),
            Settings::default(),
            AuditLog::new(100),
        )
    }

    #[test]
    fn test_normalize_strips_crlf_and_trailing_whitespace() {
        let text = "line one   \r\nline two\r\n";
        assert_eq!(normalize(text), "line one\nline two");
    }

    #[test]
    fn test_fingerprint_is_stable_under_module_order() {
        let a = fingerprint("text", "financial_promotion", &["fca_uk".to_string(), "gdpr_uk".to_string()]);
        let b = fingerprint("text", "financial_promotion", &["gdpr_uk".to_string(), "fca_uk".to_string()]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_changes_with_text() {
        let a = fingerprint("text a", "financial_promotion", &["fca_uk".to_string()]);
        let b = fingerprint("text b", "financial_promotion", &["fca_uk".to_string()]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_empty_document_type_is_invalid() {
        let engine = engine();
        let err = engine
            .validate("some text", "", &["fca_uk".to_string()], &ValidateOptions::default())
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::Engine(EngineError::InvalidInput { .. })));
    }

    #[test]
    fn test_validate_s1_fca_scenario() {
        let engine = engine();
        let result = engine
            .validate(
                "Our fund delivers guaranteed high returns.",
                "financial_promotion",
                &["fca_uk".to_string()],
                &ValidateOptions::default(),
            )
            .unwrap();
        assert_eq!(result.overall_risk, RiskLevel::Critical);
        assert!(result.findings.iter().any(|f| f.gate_id == "fair_clear_not_misleading" && f.is_failure()));
    }

    #[test]
    fn test_validate_zero_modules_is_low_risk_and_empty() {
        let engine = engine();
        let result = engine
            .validate("anything at all", "financial_promotion", &[], &ValidateOptions::default())
            .unwrap();
        assert!(result.findings.is_empty());
        assert_eq!(result.overall_risk, RiskLevel::Low);
    }

    #[test]
    fn test_validate_caches_and_reports_hit() {
        let engine = engine();
        let modules = vec!["fca_uk".to_string()];
        let first = engine
            .validate("guaranteed returns", "financial_promotion", &modules, &ValidateOptions::default())
            .unwrap();
        assert!(!first.cache_hit);
        let second = engine
            .validate("guaranteed returns", "financial_promotion", &modules, &ValidateOptions::default())
            .unwrap();
        assert!(second.cache_hit);
        assert_eq!(first.findings.len(), second.findings.len());
    }

    #[test]
    fn test_validate_bypass_cache_never_hits() {
        let engine = engine();
        let modules = vec!["fca_uk".to_string()];
        let options = ValidateOptions { bypass_cache: true };
        engine.validate("guaranteed returns", "financial_promotion", &modules, &options).unwrap();
        let second = engine
            .validate("guaranteed returns", "financial_promotion", &modules, &options)
            .unwrap();
        assert!(!second.cache_hit);
    }

    #[test]
    fn test_validate_resource_exceeded_on_too_many_modules() {
        let mut settings = Settings::default();
        settings.max_active_modules = 1;
        let engine = Engine::new(
            ModuleRegistry::new(),
            Box::new(InMemoryResultCache::new(1000, 1024 * 1024)),
            settings,
            AuditLog::new(100),
        );
        let err = engine
            .validate(
                "text",
                "financial_promotion",
                &["fca_uk".to_string(), "gdpr_uk".to_string()],
                &ValidateOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::Engine(EngineError::ResourceExceeded { .. })));
    }

    #[test]
    fn test_validate_large_document_chunk_equivalence() {
        let engine = engine();
        let small = "Our fund delivers guaranteed high returns. ".repeat(200);
        let large = "Our fund delivers guaranteed high returns. ".repeat(2000);
        let modules = vec!["fca_uk".to_string()];

        assert!(small.len() < engine.settings.chunk_threshold_bytes);
        assert!(large.len() > engine.settings.chunk_threshold_bytes);

        let small_result = engine
            .validate(&small, "financial_promotion", &modules, &ValidateOptions { bypass_cache: true })
            .unwrap();
        let large_result = engine
            .validate(&large, "financial_promotion", &modules, &ValidateOptions { bypass_cache: true })
            .unwrap();

        // §4.7's equivalence guarantee is about the finding list itself,
        // not merely which gate ids fired: same count, same order, same
        // status/severity/message per finding, and (for the
        // first-occurrence gate) the same span regardless of where in
        // the repeated text the chunk boundaries happen to fall.
        assert_eq!(small_result.findings.len(), large_result.findings.len());
        for (small_finding, large_finding) in small_result.findings.iter().zip(&large_result.findings) {
            assert_eq!(small_finding.module_id, large_finding.module_id);
            assert_eq!(small_finding.gate_id, large_finding.gate_id);
            assert_eq!(small_finding.status, large_finding.status);
            assert_eq!(small_finding.severity, large_finding.severity);
            assert_eq!(small_finding.message, large_finding.message);
            assert_eq!(small_finding.spans, large_finding.spans);
        }
    }
}
