//! Findings emitted by analysis stages
//!
//! Each detection kind owns a strongly-typed detail struct. On the wire the
//! detail is an object discriminated by `detection_type`, so consumers never
//! have to guess which fields a payload carries.

use crate::{Direction, EntityId, JobId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline phase a finding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    /// Entity identification
    Identification,

    /// Relationship and attribute enrichment
    Enrichment,

    /// Ontology and graph-shape validation
    GraphValidation,
}

/// GM review state of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Awaiting GM review
    Pending,

    /// GM accepted the finding
    Accepted,

    /// GM dismissed the finding
    Dismissed,
}

/// Detection kinds, without their payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionKind {
    /// Entity with no edges
    OrphanWarning,

    /// Relationship whose endpoint types are not an allowed pair
    InvalidTypePair,

    /// Too many edges of one type in one direction
    CardinalityViolation,

    /// Entity lacking a relationship its type requires
    MissingRequired,

    /// Two edges conveying the same fact
    RedundantEdge,

    /// Generic graph-shape warning
    GraphWarning,
}

impl DetectionKind {
    /// Canonical stored name
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionKind::OrphanWarning => "orphan_warning",
            DetectionKind::InvalidTypePair => "invalid_type_pair",
            DetectionKind::CardinalityViolation => "cardinality_violation",
            DetectionKind::MissingRequired => "missing_required",
            DetectionKind::RedundantEdge => "redundant_edge",
            DetectionKind::GraphWarning => "graph_warning",
        }
    }
}

impl fmt::Display for DetectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity with zero edges of any type or direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanWarning {
    /// Orphaned entity
    pub entity_id: EntityId,
    /// Its display name
    pub entity_name: String,
    /// Its type
    pub entity_type: String,
}

/// A proposed edge whose endpoint types are not an allowed pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidTypePair {
    /// Source entity
    pub source_entity_id: EntityId,
    /// Source display name
    pub source_entity_name: String,
    /// Target entity
    pub target_entity_id: EntityId,
    /// Target display name
    pub target_entity_name: String,
    /// Relationship type name
    pub relationship_type: String,
    /// Observed source entity type
    pub source_type: String,
    /// Observed target entity type
    pub target_type: String,
    /// Human-readable list of the allowed pairs
    pub valid_pairs: String,
}

/// An entity with more edges of one type in one direction than allowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardinalityViolation {
    /// Entity over the limit
    pub entity_id: EntityId,
    /// Its display name
    pub entity_name: String,
    /// Relationship type name
    pub relationship_type: String,
    /// Role the entity plays in the counted edges
    pub direction: Direction,
    /// Edge count, persisted plus proposed
    pub current_count: u32,
    /// Configured limit for this direction
    pub max_allowed: u32,
}

/// An entity with no edge of a type its entity type requires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingRequired {
    /// Entity missing the relationship
    pub entity_id: EntityId,
    /// Its display name
    pub entity_name: String,
    /// Its type
    pub entity_type: String,
    /// Relationship type name it lacks
    pub missing_relationship_type: String,
}

/// Category reported by the semantic checker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticFindingType {
    /// Two edges between the same pair convey the same meaning
    RedundantEdge,

    /// An edge is derivable through an intermediate entity
    ImpliedEdge,
}

impl SemanticFindingType {
    /// Map a model-supplied label onto a category
    ///
    /// Anything unrecognized falls back to [`SemanticFindingType::RedundantEdge`].
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "implied_edge" => SemanticFindingType::ImpliedEdge,
            _ => SemanticFindingType::RedundantEdge,
        }
    }
}

/// A semantic issue reported by the completion provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticIssue {
    /// Category
    pub finding_type: SemanticFindingType,
    /// What the model observed
    pub description: String,
    /// Names of the entities involved
    #[serde(default)]
    pub involved_entities: Vec<String>,
    /// Optional suggested remedy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Typed detail payload, discriminated by detection kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "detection_type", rename_all = "snake_case")]
pub enum FindingDetail {
    /// See [`OrphanWarning`]
    OrphanWarning(OrphanWarning),
    /// See [`InvalidTypePair`]
    InvalidTypePair(InvalidTypePair),
    /// See [`CardinalityViolation`]
    CardinalityViolation(CardinalityViolation),
    /// See [`MissingRequired`]
    MissingRequired(MissingRequired),
    /// Redundant edge from the semantic checker
    RedundantEdge(SemanticIssue),
    /// Any other semantic observation (implied edges)
    GraphWarning(SemanticIssue),
}

impl FindingDetail {
    /// Detection kind of this payload
    pub fn kind(&self) -> DetectionKind {
        match self {
            FindingDetail::OrphanWarning(_) => DetectionKind::OrphanWarning,
            FindingDetail::InvalidTypePair(_) => DetectionKind::InvalidTypePair,
            FindingDetail::CardinalityViolation(_) => DetectionKind::CardinalityViolation,
            FindingDetail::MissingRequired(_) => DetectionKind::MissingRequired,
            FindingDetail::RedundantEdge(_) => DetectionKind::RedundantEdge,
            FindingDetail::GraphWarning(_) => DetectionKind::GraphWarning,
        }
    }

    /// Short headline for the GM review queue
    pub fn title(&self) -> String {
        match self {
            FindingDetail::OrphanWarning(d) => format!("Orphaned entity: {}", d.entity_name),
            FindingDetail::InvalidTypePair(d) => format!(
                "Invalid relationship: {} {} {}",
                d.source_entity_name, d.relationship_type, d.target_entity_name
            ),
            FindingDetail::CardinalityViolation(d) => format!(
                "Too many '{}' relationships: {}",
                d.relationship_type, d.entity_name
            ),
            FindingDetail::MissingRequired(d) => format!(
                "Missing '{}' relationship: {}",
                d.missing_relationship_type, d.entity_name
            ),
            FindingDetail::RedundantEdge(_) => "Redundant relationship".to_string(),
            FindingDetail::GraphWarning(d) => match d.finding_type {
                SemanticFindingType::ImpliedEdge => "Implied relationship".to_string(),
                SemanticFindingType::RedundantEdge => "Graph warning".to_string(),
            },
        }
    }

    /// Longer explanation for the GM review queue
    pub fn describe(&self) -> String {
        match self {
            FindingDetail::OrphanWarning(d) => format!(
                "{} ({}) has no relationships of any type or direction.",
                d.entity_name, d.entity_type
            ),
            FindingDetail::InvalidTypePair(d) => format!(
                "'{}' does not allow {} → {}. Valid pairs: {}.",
                d.relationship_type, d.source_type, d.target_type, d.valid_pairs
            ),
            FindingDetail::CardinalityViolation(d) => format!(
                "{} would have {} '{}' relationships as {}, but at most {} are allowed.",
                d.entity_name, d.current_count, d.relationship_type, d.direction, d.max_allowed
            ),
            FindingDetail::MissingRequired(d) => format!(
                "{} is a {} but has no '{}' relationship.",
                d.entity_name, d.entity_type, d.missing_relationship_type
            ),
            FindingDetail::RedundantEdge(d) | FindingDetail::GraphWarning(d) => {
                d.description.clone()
            }
        }
    }
}

/// An advisory finding awaiting GM review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Analysis job the finding was produced for
    pub job_id: JobId,

    /// Pipeline phase tag
    pub phase: PipelinePhase,

    /// Review state
    pub review_status: ReviewStatus,

    /// Headline
    pub title: String,

    /// Explanation
    pub description: String,

    /// Typed payload
    pub detail: FindingDetail,
}

impl Finding {
    /// Create a pending graph-validation finding
    pub fn new(job_id: JobId, detail: FindingDetail) -> Self {
        Self {
            job_id,
            phase: PipelinePhase::GraphValidation,
            review_status: ReviewStatus::Pending,
            title: detail.title(),
            description: detail.describe(),
            detail,
        }
    }

    /// Detection kind
    pub fn kind(&self) -> DetectionKind {
        self.detail.kind()
    }
}
