//! In-memory graph store for unit tests

use lorekeeper_domain::traits::{CountKey, GraphStore};
use lorekeeper_domain::{
    CampaignId, CardinalityConstraint, CardinalityViolation, ConstraintOverride, Direction,
    DomainRangeConstraint, Entity, EntityId, JobId, MissingRequired, Relationship,
    RelationshipSuggestion, RelationshipType, RelationshipTypeId,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

pub(crate) const CAMPAIGN: CampaignId = CampaignId::new(1);
pub(crate) const JOB: JobId = JobId::new(100);

pub(crate) const VIKTOR: EntityId = EntityId::new(1);
pub(crate) const INN: EntityId = EntityId::new(2);
pub(crate) const KEY: EntityId = EntityId::new(3);
pub(crate) const ELARA: EntityId = EntityId::new(4);

pub(crate) const LOCATED_AT: RelationshipTypeId = RelationshipTypeId::new(10);
pub(crate) const ALLIED_WITH: RelationshipTypeId = RelationshipTypeId::new(11);

/// Serves canned rows and records which queries ran
#[derive(Default)]
pub(crate) struct FakeStore {
    pub entities: Vec<Entity>,
    pub relationship_types: Vec<RelationshipType>,
    pub counts: HashMap<CountKey, u32>,
    pub persisted_violations: Vec<CardinalityViolation>,
    pub limits: Vec<CardinalityConstraint>,
    pub missing: Vec<MissingRequired>,
    pub domain_range: Vec<DomainRangeConstraint>,
    pub overrides: Vec<ConstraintOverride>,
    fail: HashSet<&'static str>,
    calls: RefCell<Vec<&'static str>>,
}

impl FakeStore {
    /// Viktor, the Gilded Inn, the Iron Key and Elara, with two relationship types
    pub fn roster() -> Self {
        Self {
            entities: vec![
                Entity::new(VIKTOR, CAMPAIGN, "npc", "Viktor"),
                Entity::new(INN, CAMPAIGN, "location", "The Gilded Inn"),
                Entity::new(KEY, CAMPAIGN, "item", "Iron Key"),
                Entity::new(ELARA, CAMPAIGN, "npc", "Elara"),
            ],
            relationship_types: vec![
                relationship_type(LOCATED_AT, "located_at"),
                relationship_type(ALLIED_WITH, "allied_with"),
            ],
            ..Self::default()
        }
    }

    /// Make one query fail
    pub fn failing(mut self, query: &'static str) -> Self {
        self.fail.insert(query);
        self
    }

    /// Queries issued so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn set_count(
        &mut self,
        entity_id: EntityId,
        relationship_type_id: RelationshipTypeId,
        direction: Direction,
        count: u32,
    ) {
        self.counts.insert(
            CountKey {
                entity_id,
                relationship_type_id,
                direction,
            },
            count,
        );
    }

    fn record(&self, query: &'static str) -> Result<(), String> {
        self.calls.borrow_mut().push(query);
        if self.fail.contains(query) {
            return Err(format!("{} unavailable", query));
        }
        Ok(())
    }
}

impl GraphStore for FakeStore {
    type Error = String;

    fn cardinality_violations(
        &self,
        _campaign: CampaignId,
    ) -> Result<Vec<CardinalityViolation>, String> {
        self.record("cardinality_violations")?;
        Ok(self.persisted_violations.clone())
    }

    fn cardinality_constraints(
        &self,
        _campaign: CampaignId,
    ) -> Result<Vec<CardinalityConstraint>, String> {
        self.record("cardinality_constraints")?;
        Ok(self.limits.clone())
    }

    fn required_relationship_violations(
        &self,
        _campaign: CampaignId,
    ) -> Result<Vec<MissingRequired>, String> {
        self.record("required_relationship_violations")?;
        Ok(self.missing.clone())
    }

    fn entities_by_ids(
        &self,
        _campaign: CampaignId,
        ids: &[EntityId],
    ) -> Result<Vec<Entity>, String> {
        self.record("entities_by_ids")?;
        Ok(self
            .entities
            .iter()
            .filter(|e| ids.contains(&e.id))
            .cloned()
            .collect())
    }

    fn relationship_types_by_names(
        &self,
        _campaign: CampaignId,
        names: &[String],
    ) -> Result<Vec<RelationshipType>, String> {
        self.record("relationship_types_by_names")?;
        Ok(self
            .relationship_types
            .iter()
            .filter(|t| names.contains(&t.name))
            .cloned()
            .collect())
    }

    fn relationship_counts(
        &self,
        _campaign: CampaignId,
        keys: &[CountKey],
    ) -> Result<HashMap<CountKey, u32>, String> {
        self.record("relationship_counts")?;
        Ok(keys
            .iter()
            .map(|k| (*k, self.counts.get(k).copied().unwrap_or(0)))
            .collect())
    }

    fn domain_range_constraints(
        &self,
        _campaign: CampaignId,
        relationship_types: &[String],
    ) -> Result<Vec<DomainRangeConstraint>, String> {
        self.record("domain_range_constraints")?;
        Ok(self
            .domain_range
            .iter()
            .filter(|c| relationship_types.contains(&c.relationship_type))
            .cloned()
            .collect())
    }

    fn constraint_overrides(
        &self,
        _campaign: CampaignId,
    ) -> Result<Vec<ConstraintOverride>, String> {
        self.record("constraint_overrides")?;
        Ok(self.overrides.clone())
    }
}

fn relationship_type(id: RelationshipTypeId, name: &str) -> RelationshipType {
    RelationshipType {
        id,
        campaign_id: CAMPAIGN,
        name: name.to_string(),
        inverse_name: format!("{}_by", name),
        is_symmetric: false,
        display_label: name.replace('_', " "),
        inverse_display_label: format!("{} by", name.replace('_', " ")),
    }
}

pub(crate) fn entity_name(id: EntityId) -> &'static str {
    match id.value() {
        1 => "Viktor",
        2 => "The Gilded Inn",
        3 => "Iron Key",
        4 => "Elara",
        _ => "Unknown",
    }
}

pub(crate) fn suggestion(
    source: EntityId,
    target: EntityId,
    relationship_type: &str,
) -> RelationshipSuggestion {
    RelationshipSuggestion {
        source_entity_id: source,
        source_entity_name: entity_name(source).to_string(),
        target_entity_id: target,
        target_entity_name: entity_name(target).to_string(),
        relationship_type: relationship_type.to_string(),
        description: format!(
            "{} {} {}",
            entity_name(source),
            relationship_type,
            entity_name(target)
        ),
    }
}

pub(crate) fn edge(
    source: EntityId,
    target: EntityId,
    type_id: RelationshipTypeId,
    type_name: &str,
) -> Relationship {
    Relationship {
        campaign_id: CAMPAIGN,
        source_entity_id: source,
        target_entity_id: target,
        relationship_type_id: type_id,
        relationship_type: type_name.to_string(),
        tone: None,
        strength: None,
        description: None,
    }
}
