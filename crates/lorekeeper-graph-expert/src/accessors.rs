//! Batched graph lookups
//!
//! Each helper issues exactly one store query for the whole ID or name set it
//! is given, and returns a map keyed for the checker that asked.

use crate::error::GraphExpertError;
use lorekeeper_domain::traits::{CountKey, GraphStore};
use lorekeeper_domain::{CampaignId, Entity, EntityId, RelationshipTypeId, TypePair};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;
use tracing::debug;

/// Resolve entities by ID
///
/// IDs are de-duplicated before querying. Unknown IDs are absent from the map.
pub fn load_entities<S>(
    store: &S,
    campaign: CampaignId,
    ids: impl IntoIterator<Item = EntityId>,
) -> Result<HashMap<EntityId, Entity>, GraphExpertError>
where
    S: GraphStore,
    S::Error: Display,
{
    let ids: Vec<EntityId> = ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    debug!("Resolving {} entities", ids.len());
    let entities = store
        .entities_by_ids(campaign, &ids)
        .map_err(|e| GraphExpertError::store("entity lookup", e))?;

    Ok(entities.into_iter().map(|e| (e.id, e)).collect())
}

/// Resolve relationship type names to IDs
pub fn relationship_type_ids<'a, S>(
    store: &S,
    campaign: CampaignId,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<HashMap<String, RelationshipTypeId>, GraphExpertError>
where
    S: GraphStore,
    S::Error: Display,
{
    let names = distinct_names(names);
    if names.is_empty() {
        return Ok(HashMap::new());
    }

    debug!("Resolving {} relationship types", names.len());
    let types = store
        .relationship_types_by_names(campaign, &names)
        .map_err(|e| GraphExpertError::store("relationship type lookup", e))?;

    Ok(types.into_iter().map(|t| (t.name, t.id)).collect())
}

/// Persisted edge counts for each key; every requested key is present
pub fn persisted_counts<S>(
    store: &S,
    campaign: CampaignId,
    keys: &[CountKey],
) -> Result<HashMap<CountKey, u32>, GraphExpertError>
where
    S: GraphStore,
    S::Error: Display,
{
    if keys.is_empty() {
        return Ok(HashMap::new());
    }

    debug!("Counting persisted edges for {} keys", keys.len());
    let mut counts = store
        .relationship_counts(campaign, keys)
        .map_err(|e| GraphExpertError::store("relationship counts", e))?;

    for key in keys {
        counts.entry(*key).or_insert(0);
    }
    Ok(counts)
}

/// Allowed type pairs for each named relationship type
///
/// Types with no constraint rows are absent from the map.
pub fn allowed_pairs<'a, S>(
    store: &S,
    campaign: CampaignId,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<HashMap<String, BTreeSet<TypePair>>, GraphExpertError>
where
    S: GraphStore,
    S::Error: Display,
{
    let names = distinct_names(names);
    if names.is_empty() {
        return Ok(HashMap::new());
    }

    let constraints = store
        .domain_range_constraints(campaign, &names)
        .map_err(|e| GraphExpertError::store("domain/range constraints", e))?;

    let mut pairs: HashMap<String, BTreeSet<TypePair>> = HashMap::new();
    for constraint in constraints {
        let pair = constraint.pair();
        pairs.entry(constraint.relationship_type).or_default().insert(pair);
    }
    debug!("Loaded domain/range pairs for {} of {} types", pairs.len(), names.len());
    Ok(pairs)
}

fn distinct_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    names
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
