//! Run report returned by the orchestrator

use lorekeeper_domain::{DetectionKind, Finding, JobId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Checkers that can fail and be recorded in a run report
///
/// Orphan detection works on the job slice alone and cannot fail, so it has
/// no entry here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Checker {
    /// Domain/range validation
    DomainRange,
    /// Cardinality checking
    Cardinality,
    /// Required-relationship checking
    Required,
    /// Provider-assisted semantic check
    Semantic,
    /// GM override filter
    Overrides,
}

impl Checker {
    /// Name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Checker::DomainRange => "domain_range",
            Checker::Cardinality => "cardinality",
            Checker::Required => "required",
            Checker::Semantic => "semantic",
            Checker::Overrides => "overrides",
        }
    }
}

impl fmt::Display for Checker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the semantic phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SemanticStatus {
    /// Provider answered and the response parsed
    Completed,
    /// Preconditions not met; carries the reason
    Skipped(String),
    /// Provider call or response parsing failed
    Failed(String),
    /// Provider did not answer before the deadline
    TimedOut,
}

/// Bookkeeping for one validation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Findings from the structural checkers, before override filtering
    pub structural_findings: usize,

    /// Findings from the semantic check, before override filtering
    pub semantic_findings: usize,

    /// Findings dropped by GM overrides
    pub suppressed_by_overrides: usize,

    /// Suggestion records whose payload did not parse
    pub skipped_suggestions: usize,

    /// Checkers that failed and contributed nothing
    pub failed_checkers: Vec<Checker>,

    /// Semantic phase outcome
    pub semantic_status: SemanticStatus,

    /// Wall-clock time for the run
    pub processing_time_ms: u64,
}

impl RunMetadata {
    pub(crate) fn new(semantic_status: SemanticStatus) -> Self {
        Self {
            structural_findings: 0,
            semantic_findings: 0,
            suppressed_by_overrides: 0,
            skipped_suggestions: 0,
            failed_checkers: Vec::new(),
            semantic_status,
            processing_time_ms: 0,
        }
    }
}

/// Result of validating one analysis job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Analysis job validated
    pub job_id: JobId,

    /// Findings for GM review, after override filtering
    pub findings: Vec<Finding>,

    /// Run bookkeeping
    pub metadata: RunMetadata,
}

impl ValidationReport {
    /// Findings of one detection kind
    pub fn findings_of(&self, kind: DetectionKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind() == kind)
    }

    /// Whether every enabled checker ran to completion
    pub fn is_complete(&self) -> bool {
        self.metadata.failed_checkers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_status_serialization() {
        let json = serde_json::to_value(SemanticStatus::Skipped("disabled".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"status": "skipped", "detail": "disabled"}));

        let json = serde_json::to_value(SemanticStatus::TimedOut).unwrap();
        assert_eq!(json, serde_json::json!({"status": "timed_out"}));
    }

    #[test]
    fn test_checker_names() {
        assert_eq!(Checker::DomainRange.to_string(), "domain_range");
        assert_eq!(serde_json::to_value(Checker::Overrides).unwrap(), "overrides");
    }
}
