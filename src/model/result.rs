//! Validation result aggregate.

use serde::{Deserialize, Serialize};

use crate::model::{Finding, Severity, Status};

/// Coarse risk classification derived from the most severe failing finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// No failing findings, or only low/info-severity ones.
    Low,
    /// At least one medium-severity failure.
    Medium,
    /// At least one high-severity failure.
    High,
    /// At least one critical-severity failure.
    Critical,
}

impl RiskLevel {
    /// Computes overall risk from a set of findings: any `critical` fail
    /// yields `critical`; any `high` fail yields `high`; any `medium` fail
    /// yields `medium`; otherwise `low`.
    #[must_use]
    pub fn aggregate<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> Self {
        let mut level = Self::Low;
        for finding in findings {
            if finding.status != Status::Fail {
                continue;
            }
            let candidate = match finding.severity {
                Severity::Critical => Self::Critical,
                Severity::High => Self::High,
                Severity::Medium => Self::Medium,
                Severity::Low | Severity::Info => Self::Low,
            };
            if candidate > level {
                level = candidate;
            }
        }
        level
    }
}

/// Aggregate outcome of a single validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// All findings, ordered by `(module order, gate order, span.start)`.
    pub findings: Vec<Finding>,
    /// Worst risk level among `fail` findings.
    pub overall_risk: RiskLevel,
    /// Lowercase hex SHA-256 fingerprint of the validated input.
    pub fingerprint: String,
    /// Wall-clock duration of the validation run, in milliseconds.
    pub elapsed_ms: u64,
    /// Whether this result was served from the result cache.
    pub cache_hit: bool,
    /// Set when the overall deadline truncated gate execution.
    pub partial: bool,
}

impl ValidationResult {
    /// Findings with `status == Fail`, in their existing order.
    pub fn failures(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.status == Status::Fail)
    }

    /// Whether every gate passed or was not applicable.
    #[must_use]
    pub fn is_compliant(&self) -> bool {
        self.findings.iter().all(|f| f.status != Status::Fail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn finding(status: Status, severity: Severity) -> Finding {
        Finding {
            module_id: "fca_uk".to_string(),
            gate_id: "g".to_string(),
            severity,
            status,
            message: "x".to_string(),
            suggestion: None,
            legal_source: String::new(),
            spans: vec![],
            details: BTreeMap::new(),
        }
    }

    #[test]
    fn test_aggregate_no_failures_is_low() {
        let findings = vec![finding(Status::Pass, Severity::Info)];
        assert_eq!(RiskLevel::aggregate(&findings), RiskLevel::Low);
    }

    #[test]
    fn test_aggregate_picks_worst_failure() {
        let findings = vec![
            finding(Status::Fail, Severity::Medium),
            finding(Status::Fail, Severity::Critical),
            finding(Status::Fail, Severity::Low),
        ];
        assert_eq!(RiskLevel::aggregate(&findings), RiskLevel::Critical);
    }

    #[test]
    fn test_aggregate_ignores_warnings() {
        let findings = vec![finding(Status::Warning, Severity::Critical)];
        assert_eq!(RiskLevel::aggregate(&findings), RiskLevel::Low);
    }

    #[test]
    fn test_is_compliant() {
        let result = ValidationResult {
            findings: vec![finding(Status::Pass, Severity::Info)],
            overall_risk: RiskLevel::Low,
            fingerprint: "abc".to_string(),
            elapsed_ms: 1,
            cache_hit: false,
            partial: false,
        };
        assert!(result.is_compliant());
    }
}
