//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{
    CampaignId, CardinalityConstraint, CardinalityViolation, ConstraintOverride, Direction,
    DomainRangeConstraint, Entity, EntityId, MissingRequired, RelationshipType,
    RelationshipTypeId,
};
use std::collections::HashMap;

/// One `(entity, relationship type, direction)` tuple to count edges for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountKey {
    /// Entity whose edges are counted
    pub entity_id: EntityId,

    /// Relationship type counted
    pub relationship_type_id: RelationshipTypeId,

    /// Role the entity plays
    pub direction: Direction,
}

/// Read-only access to persisted campaign graph state
///
/// Implemented by the infrastructure layer (lorekeeper-store). Every method is
/// a single round trip keyed by the full set of IDs or names requested; callers
/// never loop over entities issuing one query each.
pub trait GraphStore {
    /// Error type for store operations
    type Error;

    /// Cardinality violations already present in committed data
    fn cardinality_violations(
        &self,
        campaign: CampaignId,
    ) -> Result<Vec<CardinalityViolation>, Self::Error>;

    /// Per-type cardinality limits
    fn cardinality_constraints(
        &self,
        campaign: CampaignId,
    ) -> Result<Vec<CardinalityConstraint>, Self::Error>;

    /// Entities lacking a relationship their type requires (persisted state only)
    fn required_relationship_violations(
        &self,
        campaign: CampaignId,
    ) -> Result<Vec<MissingRequired>, Self::Error>;

    /// Batch entity lookup; unknown IDs are simply absent from the result
    fn entities_by_ids(
        &self,
        campaign: CampaignId,
        ids: &[EntityId],
    ) -> Result<Vec<Entity>, Self::Error>;

    /// Batch relationship type lookup by name
    fn relationship_types_by_names(
        &self,
        campaign: CampaignId,
        names: &[String],
    ) -> Result<Vec<RelationshipType>, Self::Error>;

    /// Persisted edge counts for each requested key; keys with no edges map to 0
    fn relationship_counts(
        &self,
        campaign: CampaignId,
        keys: &[CountKey],
    ) -> Result<HashMap<CountKey, u32>, Self::Error>;

    /// Allowed type pairs for the named relationship types
    fn domain_range_constraints(
        &self,
        campaign: CampaignId,
        relationship_types: &[String],
    ) -> Result<Vec<DomainRangeConstraint>, Self::Error>;

    /// Every GM override for the campaign
    fn constraint_overrides(
        &self,
        campaign: CampaignId,
    ) -> Result<Vec<ConstraintOverride>, Self::Error>;
}

/// A single text-completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instructions
    pub system_prompt: String,

    /// User message
    pub user_prompt: String,

    /// Token budget for the response
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

/// Trait for text-completion providers
///
/// Implemented by the infrastructure layer (lorekeeper-llm). The call is
/// blocking; callers that need a deadline run it on a blocking thread.
pub trait CompletionProvider {
    /// Error type for completion operations
    type Error;

    /// Complete the request, returning free text
    fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error>;
}

/// A named stage in the content-analysis pipeline
///
/// The host schedules stages in dependency order.
pub trait AnalysisStage {
    /// Stage name
    fn name(&self) -> &'static str;

    /// Stages that must complete before this one runs
    fn dependencies(&self) -> &'static [&'static str];
}
