//! Input contract from the enrichment stage

use crate::{CampaignId, Entity, JobId, PipelinePhase, Relationship, RelationshipSuggestion};
use serde::{Deserialize, Serialize};

/// Detection type the enrichment stage uses for proposed relationships
pub const RELATIONSHIP_SUGGESTION: &str = "relationship_suggestion";

/// A finding produced by an earlier pipeline phase
///
/// Upstream stages emit many kinds with loosely-typed payloads. Only
/// relationship suggestions are consumed here, and their payload is parsed
/// lazily so a malformed record can be skipped without rejecting the job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorFinding {
    /// Detection type (`relationship_suggestion`, `new_entity`, ...)
    pub detection_type: String,

    /// Phase that produced the finding
    pub phase: PipelinePhase,

    /// Raw JSON payload
    pub payload: serde_json::Value,
}

impl PriorFinding {
    /// Whether this is a relationship suggestion
    pub fn is_relationship_suggestion(&self) -> bool {
        self.detection_type == RELATIONSHIP_SUGGESTION
    }

    /// Parse the payload as a relationship suggestion
    pub fn parse_suggestion(&self) -> Result<RelationshipSuggestion, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

/// Everything one analysis job hands to the graph expert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobContext {
    /// Campaign being analyzed
    pub campaign_id: CampaignId,

    /// Analysis job the findings belong to
    pub job_id: JobId,

    /// Entity roster relevant to the analyzed text
    pub entities: Vec<Entity>,

    /// Persisted relationships among those entities
    #[serde(default)]
    pub relationships: Vec<Relationship>,

    /// Findings from earlier phases
    #[serde(default)]
    pub prior_findings: Vec<PriorFinding>,
}

impl JobContext {
    /// Create a context with no relationships or prior findings
    pub fn new(campaign_id: CampaignId, job_id: JobId, entities: Vec<Entity>) -> Self {
        Self {
            campaign_id,
            job_id,
            entities,
            relationships: Vec::new(),
            prior_findings: Vec::new(),
        }
    }

    /// All relationship suggestions whose payload parses
    ///
    /// Returns the parsed suggestions and the number of records skipped.
    pub fn relationship_suggestions(&self) -> (Vec<RelationshipSuggestion>, usize) {
        let mut suggestions = Vec::new();
        let mut skipped = 0;

        for finding in self.prior_findings.iter().filter(|f| f.is_relationship_suggestion()) {
            match finding.parse_suggestion() {
                Ok(suggestion) => suggestions.push(suggestion),
                Err(_) => skipped += 1,
            }
        }

        (suggestions, skipped)
    }
}
