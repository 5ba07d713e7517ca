//! Lorekeeper Storage Layer
//!
//! Implements the read-only `GraphStore` contract on SQLite.
//!
//! # Architecture
//!
//! - SQLite holds entities, relationship types, relationships and the
//!   campaign's ontology rule tables
//! - Each `GraphStore` method is exactly one SQL statement; batched lookups
//!   expand to a numbered placeholder list rather than one query per key
//! - Aggregate reports (committed cardinality violations, missing required
//!   relationships) are computed by the database, which is authoritative for
//!   committed data
//!
//! The seeding helpers (`insert_*`, `set_*`, `add_*`) exist for fixtures and
//! tooling. Validation itself never writes.
//!
//! # Examples
//!
//! ```no_run
//! use lorekeeper_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for graph queries
//! ```

#![warn(missing_docs)]

use lorekeeper_domain::traits::{CountKey, GraphStore};
use lorekeeper_domain::{
    CampaignId, CardinalityConstraint, CardinalityViolation, ConstraintKind, ConstraintOverride,
    Direction, DomainRangeConstraint, Entity, EntityId, MissingRequired, Relationship,
    RelationshipType, RelationshipTypeId,
};
use rusqlite::{params, Connection, ToSql};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-based implementation of GraphStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply the schema
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Insert an entity, keeping its ID
    pub fn insert_entity(&mut self, entity: &Entity) -> Result<EntityId, StoreError> {
        let attributes = serde_json::to_string(&entity.attributes)
            .map_err(|e| StoreError::InvalidData(format!("Unserializable attributes: {}", e)))?;

        self.conn.execute(
            "INSERT INTO entities (id, campaign_id, entity_type, name, attributes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entity.id.value(),
                entity.campaign_id.value(),
                &entity.entity_type,
                &entity.name,
                attributes,
            ],
        )?;

        Ok(entity.id)
    }

    /// Insert a relationship type, keeping its ID
    pub fn insert_relationship_type(
        &mut self,
        relationship_type: &RelationshipType,
    ) -> Result<RelationshipTypeId, StoreError> {
        self.conn.execute(
            "INSERT INTO relationship_types
                 (id, campaign_id, name, inverse_name, is_symmetric, display_label, inverse_display_label)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                relationship_type.id.value(),
                relationship_type.campaign_id.value(),
                &relationship_type.name,
                &relationship_type.inverse_name,
                relationship_type.is_symmetric,
                &relationship_type.display_label,
                &relationship_type.inverse_display_label,
            ],
        )?;

        Ok(relationship_type.id)
    }

    /// Insert a relationship
    ///
    /// The `(campaign, source, target, type)` tuple is unique; inserting it
    /// twice is a database error.
    pub fn insert_relationship(&mut self, relationship: &Relationship) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO relationships
                 (campaign_id, source_entity_id, target_entity_id, relationship_type_id, tone, strength, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                relationship.campaign_id.value(),
                relationship.source_entity_id.value(),
                relationship.target_entity_id.value(),
                relationship.relationship_type_id.value(),
                &relationship.tone,
                relationship.strength,
                &relationship.description,
            ],
        )?;

        Ok(())
    }

    /// Set (or replace) the cardinality limits for a relationship type
    pub fn set_cardinality_limit(
        &mut self,
        campaign: CampaignId,
        relationship_type_id: RelationshipTypeId,
        max_source: Option<u32>,
        max_target: Option<u32>,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO cardinality_constraints (campaign_id, relationship_type_id, max_source, max_target)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(campaign_id, relationship_type_id) DO UPDATE SET
             max_source = excluded.max_source, max_target = excluded.max_target",
            params![campaign.value(), relationship_type_id.value(), max_source, max_target],
        )?;

        Ok(())
    }

    /// Require every entity of `entity_type` to have a `relationship_type_id` edge
    pub fn add_required_relationship(
        &mut self,
        campaign: CampaignId,
        entity_type: &str,
        relationship_type_id: RelationshipTypeId,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO required_relationships (campaign_id, entity_type, relationship_type_id)
             VALUES (?1, ?2, ?3)",
            params![campaign.value(), entity_type, relationship_type_id.value()],
        )?;

        Ok(())
    }

    /// Allow one `(source type, target type)` pair for a relationship type
    pub fn add_domain_range_constraint(
        &mut self,
        campaign: CampaignId,
        relationship_type_id: RelationshipTypeId,
        source_entity_type: &str,
        target_entity_type: &str,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO domain_range_constraints
                 (campaign_id, relationship_type_id, source_entity_type, target_entity_type)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                campaign.value(),
                relationship_type_id.value(),
                source_entity_type,
                target_entity_type,
            ],
        )?;

        Ok(())
    }

    /// Record a GM override
    pub fn add_override(
        &mut self,
        campaign: CampaignId,
        constraint_override: &ConstraintOverride,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO constraint_overrides (campaign_id, constraint_kind, override_key)
             VALUES (?1, ?2, ?3)",
            params![
                campaign.value(),
                constraint_override.constraint_kind.as_str(),
                &constraint_override.override_key,
            ],
        )?;

        Ok(())
    }

    /// Build `?start, ?start+1, ...` for `count` parameters
    fn placeholders(start: usize, count: usize) -> String {
        (start..start + count)
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn conversion_error(idx: usize, err: StoreError) -> rusqlite::Error {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
    }

    fn parse_direction(idx: usize, s: &str) -> Result<Direction, rusqlite::Error> {
        Direction::parse(s).ok_or_else(|| {
            Self::conversion_error(
                idx,
                StoreError::InvalidData(format!("Unknown direction: {}", s)),
            )
        })
    }
}

impl GraphStore for SqliteStore {
    type Error = StoreError;

    fn cardinality_violations(
        &self,
        campaign: CampaignId,
    ) -> Result<Vec<CardinalityViolation>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.name, rt.name, 'source', COUNT(*), cc.max_source
             FROM relationships r
             JOIN relationship_types rt ON rt.id = r.relationship_type_id
             JOIN cardinality_constraints cc
               ON cc.campaign_id = r.campaign_id AND cc.relationship_type_id = r.relationship_type_id
             JOIN entities e ON e.id = r.source_entity_id
             WHERE r.campaign_id = ?1 AND cc.max_source IS NOT NULL
             GROUP BY e.id, e.name, rt.name, cc.max_source
             HAVING COUNT(*) > cc.max_source
             UNION ALL
             SELECT e.id, e.name, rt.name, 'target', COUNT(*), cc.max_target
             FROM relationships r
             JOIN relationship_types rt ON rt.id = r.relationship_type_id
             JOIN cardinality_constraints cc
               ON cc.campaign_id = r.campaign_id AND cc.relationship_type_id = r.relationship_type_id
             JOIN entities e ON e.id = r.target_entity_id
             WHERE r.campaign_id = ?1 AND cc.max_target IS NOT NULL
             GROUP BY e.id, e.name, rt.name, cc.max_target
             HAVING COUNT(*) > cc.max_target
             ORDER BY 1, 3, 4",
        )?;

        let violations = stmt
            .query_map(params![campaign.value()], |row| {
                let direction: String = row.get(3)?;
                Ok(CardinalityViolation {
                    entity_id: EntityId::new(row.get(0)?),
                    entity_name: row.get(1)?,
                    relationship_type: row.get(2)?,
                    direction: Self::parse_direction(3, &direction)?,
                    current_count: row.get(4)?,
                    max_allowed: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Campaign {}: {} committed cardinality violations",
            campaign,
            violations.len()
        );

        Ok(violations)
    }

    fn cardinality_constraints(
        &self,
        campaign: CampaignId,
    ) -> Result<Vec<CardinalityConstraint>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT rt.name, cc.max_source, cc.max_target
             FROM cardinality_constraints cc
             JOIN relationship_types rt ON rt.id = cc.relationship_type_id
             WHERE cc.campaign_id = ?1
             ORDER BY rt.name",
        )?;

        let constraints = stmt
            .query_map(params![campaign.value()], |row| {
                Ok(CardinalityConstraint {
                    relationship_type: row.get(0)?,
                    max_source: row.get(1)?,
                    max_target: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(constraints)
    }

    fn required_relationship_violations(
        &self,
        campaign: CampaignId,
    ) -> Result<Vec<MissingRequired>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.name, e.entity_type, rt.name
             FROM entities e
             JOIN required_relationships rr
               ON rr.campaign_id = e.campaign_id AND rr.entity_type = e.entity_type
             JOIN relationship_types rt ON rt.id = rr.relationship_type_id
             WHERE e.campaign_id = ?1
               AND NOT EXISTS (
                   SELECT 1 FROM relationships r
                   WHERE r.campaign_id = e.campaign_id
                     AND r.relationship_type_id = rr.relationship_type_id
                     AND (r.source_entity_id = e.id OR r.target_entity_id = e.id)
               )
             ORDER BY e.id, rt.name",
        )?;

        let missing = stmt
            .query_map(params![campaign.value()], |row| {
                Ok(MissingRequired {
                    entity_id: EntityId::new(row.get(0)?),
                    entity_name: row.get(1)?,
                    entity_type: row.get(2)?,
                    missing_relationship_type: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(missing)
    }

    fn entities_by_ids(
        &self,
        campaign: CampaignId,
        ids: &[EntityId],
    ) -> Result<Vec<Entity>, Self::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, campaign_id, entity_type, name, attributes
             FROM entities
             WHERE campaign_id = ?1 AND id IN ({})
             ORDER BY id",
            Self::placeholders(2, ids.len())
        );

        let mut params: Vec<i64> = Vec::with_capacity(ids.len() + 1);
        params.push(campaign.value());
        params.extend(ids.iter().map(|id| id.value()));

        let mut stmt = self.conn.prepare(&sql)?;
        let entities = stmt
            .query_map(rusqlite::params_from_iter(params), |row| {
                let attributes: String = row.get(4)?;
                let attributes = serde_json::from_str(&attributes).map_err(|e| {
                    Self::conversion_error(
                        4,
                        StoreError::InvalidData(format!("Invalid attributes JSON: {}", e)),
                    )
                })?;

                Ok(Entity {
                    id: EntityId::new(row.get(0)?),
                    campaign_id: CampaignId::new(row.get(1)?),
                    entity_type: row.get(2)?,
                    name: row.get(3)?,
                    attributes,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entities)
    }

    fn relationship_types_by_names(
        &self,
        campaign: CampaignId,
        names: &[String],
    ) -> Result<Vec<RelationshipType>, Self::Error> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, campaign_id, name, inverse_name, is_symmetric, display_label, inverse_display_label
             FROM relationship_types
             WHERE campaign_id = ?1 AND name IN ({})
             ORDER BY name",
            Self::placeholders(2, names.len())
        );

        let campaign_value = campaign.value();
        let mut params: Vec<&dyn ToSql> = Vec::with_capacity(names.len() + 1);
        params.push(&campaign_value);
        params.extend(names.iter().map(|n| n as &dyn ToSql));

        let mut stmt = self.conn.prepare(&sql)?;
        let types = stmt
            .query_map(&params[..], |row| {
                Ok(RelationshipType {
                    id: RelationshipTypeId::new(row.get(0)?),
                    campaign_id: CampaignId::new(row.get(1)?),
                    name: row.get(2)?,
                    inverse_name: row.get(3)?,
                    is_symmetric: row.get(4)?,
                    display_label: row.get(5)?,
                    inverse_display_label: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(types)
    }

    fn relationship_counts(
        &self,
        campaign: CampaignId,
        keys: &[CountKey],
    ) -> Result<HashMap<CountKey, u32>, Self::Error> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        // ?1 is the campaign; each key contributes three numbered parameters
        let values = (0..keys.len())
            .map(|i| {
                let base = 2 + i * 3;
                format!("(?{}, ?{}, ?{})", base, base + 1, base + 2)
            })
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "WITH keys(entity_id, relationship_type_id, direction) AS (VALUES {})
             SELECT k.entity_id, k.relationship_type_id, k.direction,
                    (SELECT COUNT(*) FROM relationships r
                     WHERE r.campaign_id = ?1
                       AND r.relationship_type_id = k.relationship_type_id
                       AND CASE k.direction
                               WHEN 'source' THEN r.source_entity_id
                               ELSE r.target_entity_id
                           END = k.entity_id)
             FROM keys k",
            values
        );

        let mut params: Vec<Box<dyn ToSql>> = Vec::with_capacity(keys.len() * 3 + 1);
        params.push(Box::new(campaign.value()));
        for key in keys {
            params.push(Box::new(key.entity_id.value()));
            params.push(Box::new(key.relationship_type_id.value()));
            params.push(Box::new(key.direction.as_str()));
        }
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let counts = stmt
            .query_map(&param_refs[..], |row| {
                let direction: String = row.get(2)?;
                let key = CountKey {
                    entity_id: EntityId::new(row.get(0)?),
                    relationship_type_id: RelationshipTypeId::new(row.get(1)?),
                    direction: Self::parse_direction(2, &direction)?,
                };
                Ok((key, row.get::<_, u32>(3)?))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;

        debug!("Counted persisted edges for {} keys", counts.len());

        Ok(counts)
    }

    fn domain_range_constraints(
        &self,
        campaign: CampaignId,
        relationship_types: &[String],
    ) -> Result<Vec<DomainRangeConstraint>, Self::Error> {
        if relationship_types.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT rt.name, drc.source_entity_type, drc.target_entity_type
             FROM domain_range_constraints drc
             JOIN relationship_types rt ON rt.id = drc.relationship_type_id
             WHERE drc.campaign_id = ?1 AND rt.name IN ({})
             ORDER BY rt.name, drc.source_entity_type, drc.target_entity_type",
            Self::placeholders(2, relationship_types.len())
        );

        let campaign_value = campaign.value();
        let mut params: Vec<&dyn ToSql> = Vec::with_capacity(relationship_types.len() + 1);
        params.push(&campaign_value);
        params.extend(relationship_types.iter().map(|n| n as &dyn ToSql));

        let mut stmt = self.conn.prepare(&sql)?;
        let constraints = stmt
            .query_map(&params[..], |row| {
                Ok(DomainRangeConstraint {
                    relationship_type: row.get(0)?,
                    source_entity_type: row.get(1)?,
                    target_entity_type: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(constraints)
    }

    fn constraint_overrides(
        &self,
        campaign: CampaignId,
    ) -> Result<Vec<ConstraintOverride>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT constraint_kind, override_key
             FROM constraint_overrides
             WHERE campaign_id = ?1",
        )?;

        let overrides = stmt
            .query_map(params![campaign.value()], |row| {
                let kind: String = row.get(0)?;
                let constraint_kind = ConstraintKind::parse(&kind).ok_or_else(|| {
                    Self::conversion_error(
                        0,
                        StoreError::InvalidData(format!("Unknown constraint kind: {}", kind)),
                    )
                })?;

                Ok(ConstraintOverride {
                    constraint_kind,
                    override_key: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(overrides)
    }
}
