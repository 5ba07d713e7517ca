//! Lorekeeper Domain Layer
//!
//! Core model for a campaign knowledge graph: entities, typed relationships,
//! GM-authored ontology rules and the findings produced when the graph is
//! checked against those rules.
//!
//! ## Key Concepts
//!
//! - **Entity**: a named node (NPC, location, item, faction, ...)
//! - **Relationship**: a single stored directed edge, persisted once in its
//!   canonical forward direction
//! - **Suggestion**: a proposed, not-yet-committed relationship from the
//!   enrichment stage
//! - **Ontology rules**: cardinality limits, domain/range pairs, required
//!   relationships and GM overrides
//! - **Finding**: an advisory result, modelled as a sum type keyed by
//!   detection kind
//!
//! ## Architecture
//!
//! - Serde is the only external dependency; findings and job contexts cross
//!   the pipeline boundary as JSON
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions live in [`traits`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entity;
pub mod finding;
pub mod ids;
pub mod job;
pub mod ontology;
pub mod relationship;
pub mod traits;

// Re-exports for convenience
pub use entity::{Entity, RelationshipType};
pub use finding::{
    CardinalityViolation, DetectionKind, Finding, FindingDetail, InvalidTypePair,
    MissingRequired, OrphanWarning, PipelinePhase, ReviewStatus, SemanticFindingType,
    SemanticIssue,
};
pub use ids::{CampaignId, EntityId, JobId, RelationshipTypeId};
pub use job::{JobContext, PriorFinding, RELATIONSHIP_SUGGESTION};
pub use ontology::{
    CardinalityConstraint, ConstraintKind, ConstraintOverride, DomainRangeConstraint,
    RequiredRelationship, TypePair,
};
pub use relationship::{Direction, Relationship, RelationshipSuggestion};
