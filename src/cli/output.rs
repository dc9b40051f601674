//! Output formatting for CLI commands.
//!
//! Supports text, JSON, and NDJSON output formats.

use std::fmt::Write;

use serde::Serialize;

use crate::audit::AuditEvent;
use crate::cache::CacheStats;
use crate::model::{AuditEventType, Finding, RiskLevel, Severity, Status, ValidationResult};
use crate::profiler::OperationReport;
use crate::registry::ModuleSummary;
use crate::synthesis::CorrectionOutcome;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
    /// Newline-delimited JSON (NDJSON) for streaming.
    /// Each record is a single JSON object on its own line.
    Ndjson,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "ndjson" | "jsonl" | "stream" => Self::Ndjson,
            _ => Self::Text,
        }
    }

    /// Returns true if this format is a streaming format.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        matches!(self, Self::Ndjson)
    }
}

/// Formats a `validate` response.
#[must_use]
pub fn format_validation_result(result: &ValidationResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_validation_result_text(result),
        OutputFormat::Json => format_json(result),
        OutputFormat::Ndjson => result
            .findings
            .iter()
            .map(format_json)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn format_validation_result_text(result: &ValidationResult) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Validation Result");
    let _ = writeln!(output, "=================\n");
    let _ = writeln!(output, "  Risk level:    {}", risk_label(result.overall_risk));
    let _ = writeln!(output, "  Compliant:     {}", result.is_compliant());
    let _ = writeln!(output, "  Fingerprint:   {}", result.fingerprint);
    let _ = writeln!(output, "  Elapsed:       {} ms", result.elapsed_ms);
    let _ = writeln!(output, "  Cache hit:     {}", result.cache_hit);
    if result.partial {
        let _ = writeln!(output, "  Partial:       true (deadline truncated gate execution)");
    }
    let _ = writeln!(output, "\n  Findings:");
    if result.findings.is_empty() {
        let _ = writeln!(output, "    (none)");
    }
    for finding in &result.findings {
        let _ = writeln!(output, "{}", format_finding_text(finding));
    }
    output
}

fn format_finding_text(finding: &Finding) -> String {
    let mut line = String::new();
    let _ = write!(
        line,
        "    [{}] {}/{} {}",
        status_label(finding.status),
        finding.module_id,
        finding.gate_id,
        severity_label(finding.severity),
    );
    if !finding.message.is_empty() {
        let _ = write!(line, " — {}", finding.message);
    }
    if !finding.legal_source.is_empty() {
        let _ = write!(line, " ({})", finding.legal_source);
    }
    if let Some(suggestion) = &finding.suggestion {
        let _ = write!(line, "\n      suggestion: {suggestion}");
    }
    for span in &finding.spans {
        let _ = write!(line, "\n      span {}..{} [{}]", span.start, span.end, span.kind);
    }
    line
}

const fn status_label(status: Status) -> &'static str {
    match status {
        Status::Pass => "PASS",
        Status::Warning => "WARN",
        Status::Fail => "FAIL",
        Status::NotApplicable => "N/A ",
    }
}

const fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Low => "low",
        Severity::Medium => "medium",
        Severity::High => "high",
        Severity::Critical => "critical",
    }
}

const fn risk_label(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::Low => "low",
        RiskLevel::Medium => "medium",
        RiskLevel::High => "high",
        RiskLevel::Critical => "critical",
    }
}

/// Formats a `correct` response.
#[must_use]
pub fn format_correction_outcome(outcome: &CorrectionOutcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_correction_outcome_text(outcome),
        OutputFormat::Json | OutputFormat::Ndjson => format_json(outcome),
    }
}

fn format_correction_outcome_text(outcome: &CorrectionOutcome) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Correction Result");
    let _ = writeln!(output, "=================\n");
    let _ = writeln!(output, "  Converged:     {}", outcome.converged);
    let _ = writeln!(output, "  Iterations:    {}", outcome.iterations);
    let _ = writeln!(output, "  Snippets applied:");
    if outcome.applied_snippets.is_empty() {
        let _ = writeln!(output, "    (none)");
    }
    for snippet_id in &outcome.applied_snippets {
        let _ = writeln!(output, "    - {snippet_id}");
    }
    if !outcome.unresolved.is_empty() {
        let _ = writeln!(output, "  Unresolved failures:");
        for (module_id, gate_id) in &outcome.unresolved {
            let _ = writeln!(output, "    - {module_id}/{gate_id}");
        }
    }
    let _ = writeln!(output, "\n  Final text:\n{}", outcome.final_text);
    output
}

/// Formats a `list_modules` response.
#[must_use]
pub fn format_module_list(modules: &[ModuleSummary], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_module_list_text(modules),
        OutputFormat::Json => format_json(&ModuleListJson { modules }),
        OutputFormat::Ndjson => modules
            .iter()
            .map(format_json)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[derive(Serialize)]
struct ModuleListJson<'a> {
    modules: &'a [ModuleSummary],
}

fn format_module_list_text(modules: &[ModuleSummary]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Modules");
    let _ = writeln!(output, "=======\n");
    for module in modules {
        let _ = writeln!(
            output,
            "  {:<14} {:<32} gates={:<3} enabled={}",
            module.module_id, module.display_name, module.gate_count, module.enabled
        );
    }
    output
}

/// Formats a `metrics` response.
#[must_use]
pub fn format_metrics(
    metrics: &std::collections::BTreeMap<String, OperationReport>,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => format_metrics_text(metrics),
        OutputFormat::Json => format_json(metrics),
        OutputFormat::Ndjson => metrics
            .iter()
            .map(|(name, report)| format_json(&NamedReport { name, report }))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[derive(Serialize)]
struct NamedReport<'a> {
    name: &'a str,
    report: &'a OperationReport,
}

fn format_metrics_text(metrics: &std::collections::BTreeMap<String, OperationReport>) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Metrics");
    let _ = writeln!(output, "=======\n");
    if metrics.is_empty() {
        let _ = writeln!(output, "  (no operations recorded yet)");
    }
    for (name, report) in metrics {
        let _ = writeln!(output, "  {name}");
        let _ = writeln!(
            output,
            "    count={} min={:.2}ms max={:.2}ms mean={:.2}ms p50={:.2}ms p95={:.2}ms p99={:.2}ms",
            report.count, report.min_ms, report.max_ms, report.mean_ms, report.p50_ms, report.p95_ms, report.p99_ms
        );
        let _ = writeln!(
            output,
            "    bytes_in={} bytes_out={} peak_memory_delta={}",
            report.total_bytes_in, report.total_bytes_out, report.peak_memory_delta
        );
    }
    output
}

/// Formats a `cache-stats` response.
#[must_use]
pub fn format_cache_stats(stats: &CacheStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "Cache Statistics");
            let _ = writeln!(output, "================\n");
            let _ = writeln!(output, "  Hits:              {}", stats.hits);
            let _ = writeln!(output, "  Misses:            {}", stats.misses);
            let _ = writeln!(output, "  Entries:           {}", stats.entries);
            let _ = writeln!(output, "  Backed externally: {}", stats.backed_externally);
            output
        }
        OutputFormat::Json | OutputFormat::Ndjson => format_json(&CacheStatsJson {
            hits: stats.hits,
            misses: stats.misses,
            entries: stats.entries,
            backed_externally: stats.backed_externally,
        }),
    }
}

#[derive(Serialize)]
struct CacheStatsJson {
    hits: u64,
    misses: u64,
    entries: usize,
    backed_externally: bool,
}

/// Formats an `audit` response, most recent event last.
#[must_use]
pub fn format_audit_events(events: &[AuditEvent], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_audit_events_text(events),
        OutputFormat::Json => format_json(events),
        OutputFormat::Ndjson => events.iter().map(format_json).collect::<Vec<_>>().join("\n"),
    }
}

fn format_audit_events_text(events: &[AuditEvent]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Audit Log");
    let _ = writeln!(output, "=========\n");
    if events.is_empty() {
        let _ = writeln!(output, "  (no events recorded yet)");
    }
    for event in events {
        let _ = write!(output, "  [{}] {}", event.ts, audit_event_label(event.event_type));
        if let Some(module_id) = &event.module_id {
            let _ = write!(output, " module={module_id}");
        }
        if let Some(gate_id) = &event.gate_id {
            let _ = write!(output, " gate={gate_id}");
        }
        if let Some(snippet_id) = &event.snippet_id {
            let _ = write!(output, " snippet={snippet_id}");
        }
        if let Some(fingerprint) = &event.fingerprint {
            let _ = write!(output, " fingerprint={fingerprint}");
        }
        let _ = writeln!(output);
    }
    output
}

const fn audit_event_label(event_type: AuditEventType) -> &'static str {
    match event_type {
        AuditEventType::ValidationCompleted => "validation_completed",
        AuditEventType::GateTimeout => "gate_timeout",
        AuditEventType::CircuitOpened => "circuit_opened",
        AuditEventType::CircuitClosed => "circuit_closed",
        AuditEventType::SnippetApplied => "snippet_applied",
        AuditEventType::SynthesisConverged => "synthesis_converged",
        AuditEventType::SynthesisExhausted => "synthesis_exhausted",
        AuditEventType::CacheDegraded => "cache_degraded",
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats an error for output.
///
/// When format is JSON or NDJSON, returns a structured error object.
/// When format is Text, returns the error message string.
#[must_use]
pub fn format_error(error: &crate::Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json | OutputFormat::Ndjson => {
            let (error_type, suggestion) = get_error_details(error);
            let json = serde_json::json!({
                "success": false,
                "error": {
                    "type": error_type,
                    "message": error.to_string(),
                    "suggestion": suggestion
                }
            });
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

/// Extracts error type and recovery suggestion from an error.
const fn get_error_details(error: &crate::Error) -> (&'static str, Option<&'static str>) {
    use crate::error::{CacheError, ChunkingError, CommandError, EngineError, SynthesisError};

    match error {
        crate::Error::Engine(e) => match e {
            EngineError::InvalidInput { .. } => (
                "InvalidInput",
                Some("Check the document type and module list"),
            ),
            EngineError::ResourceExceeded { .. } => (
                "ResourceExceeded",
                Some("Reduce the input size or the number of active modules"),
            ),
            EngineError::UnknownModule { .. } => (
                "UnknownModule",
                Some("Run 'compliance-cli list-modules' to see valid module ids"),
            ),
        },
        crate::Error::Cache(e) => match e {
            CacheError::Backend(_) => ("CacheBackendError", None),
            CacheError::Serialization(_) => ("CacheSerializationError", None),
        },
        crate::Error::Synthesis(e) => match e {
            SynthesisError::UnresolvedVariable { .. } => (
                "UnresolvedVariable",
                Some("The snippet catalogue is missing a default for this variable"),
            ),
            SynthesisError::NoSnippetRegistered { .. } => (
                "NoSnippetRegistered",
                Some("No correction snippet exists for this failing gate"),
            ),
        },
        crate::Error::Command(e) => match e {
            CommandError::UnknownCommand(_) => ("UnknownCommand", None),
            CommandError::InvalidArgument(_) => ("InvalidArgument", None),
            CommandError::ExecutionFailed(_) => ("ExecutionFailed", None),
            CommandError::OutputFormat(_) => ("OutputFormatError", None),
        },
        crate::Error::Chunking(e) => match e {
            ChunkingError::InvalidConfig { .. } => ("InvalidConfig", None),
            ChunkingError::ChunkTooLarge { .. } => {
                ("ChunkTooLarge", Some("Use a smaller --chunk-size value"))
            }
            ChunkingError::OverlapTooLarge { .. } => (
                "OverlapTooLarge",
                Some("Overlap must be less than chunk size"),
            ),
        },
        crate::Error::CircuitOpen { .. } => ("CircuitOpen", Some("Retry after the breaker's timeout elapses")),
        crate::Error::RateLimited { .. } => ("RateLimited", Some("Retry after the rate limiter refills")),
        crate::Error::GateTimeout { .. } => ("GateTimeout", None),
        crate::Error::Config { .. } => ("ConfigError", None),
        crate::Error::Internal(_) => ("InternalError", None),
    }
}
