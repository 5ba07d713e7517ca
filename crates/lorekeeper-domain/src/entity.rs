//! Entities and relationship types

use crate::{CampaignId, EntityId, RelationshipTypeId};
use serde::{Deserialize, Serialize};

/// A named node in the campaign knowledge graph
///
/// Entities are read-only inputs to validation; nothing in the graph expert
/// mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier
    pub id: EntityId,

    /// Owning campaign
    pub campaign_id: CampaignId,

    /// Type drawn from the campaign's entity-type vocabulary (`npc`, `location`, ...)
    pub entity_type: String,

    /// Display name
    pub name: String,

    /// Free-form attributes
    #[serde(default)]
    pub attributes: serde_json::Value,
}

impl Entity {
    /// Create an entity with no attributes
    pub fn new(
        id: EntityId,
        campaign_id: CampaignId,
        entity_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            campaign_id,
            entity_type: entity_type.into(),
            name: name.into(),
            attributes: serde_json::Value::Null,
        }
    }
}

/// A campaign-scoped category of edge
///
/// The inverse name and symmetry flag drive inverse-direction display
/// elsewhere in the platform; validation only cares about identity and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipType {
    /// Unique identifier
    pub id: RelationshipTypeId,

    /// Owning campaign
    pub campaign_id: CampaignId,

    /// Canonical name (`allied_with`, `located_at`, ...)
    pub name: String,

    /// Name read in the inverse direction (`location_of` for `located_at`)
    pub inverse_name: String,

    /// Whether the relationship reads the same in both directions
    pub is_symmetric: bool,

    /// Label shown for the forward direction
    pub display_label: String,

    /// Label shown for the inverse direction
    pub inverse_display_label: String,
}
