//! Relationships, suggestions and edge direction

use crate::{CampaignId, EntityId, RelationshipTypeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single stored directed edge
///
/// Each logical connection is persisted exactly once in its canonical forward
/// direction. Inverse traversal is a read-time projection; no inverse row
/// ever exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Owning campaign
    pub campaign_id: CampaignId,

    /// Source entity
    pub source_entity_id: EntityId,

    /// Target entity
    pub target_entity_id: EntityId,

    /// Relationship type
    pub relationship_type_id: RelationshipTypeId,

    /// Resolved relationship type name
    pub relationship_type: String,

    /// Optional tone (`friendly`, `hostile`, ...)
    #[serde(default)]
    pub tone: Option<String>,

    /// Optional strength (1-10)
    #[serde(default)]
    pub strength: Option<i32>,

    /// Optional free-text description
    #[serde(default)]
    pub description: Option<String>,
}

/// A proposed relationship that has not been committed
///
/// The relationship type is still a name; it is resolved against the campaign
/// vocabulary only when a checker needs its ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipSuggestion {
    /// Source entity
    pub source_entity_id: EntityId,

    /// Source entity display name
    pub source_entity_name: String,

    /// Target entity
    pub target_entity_id: EntityId,

    /// Target entity display name
    pub target_entity_name: String,

    /// Relationship type name
    pub relationship_type: String,

    /// Why the enrichment stage proposed this edge
    #[serde(default)]
    pub description: String,
}

/// Which end of an edge an entity occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The entity is the edge's source
    Source,

    /// The entity is the edge's target
    Target,
}

impl Direction {
    /// Canonical lowercase name, as stored and as embedded in override keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Source => "source",
            Direction::Target => "target",
        }
    }

    /// Parse from the canonical name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "source" => Some(Direction::Source),
            "target" => Some(Direction::Target),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
