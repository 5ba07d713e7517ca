//! Orphan detection
//!
//! Pure set difference over entity IDs; never touches the store.

use lorekeeper_domain::{
    Entity, EntityId, Finding, FindingDetail, JobId, OrphanWarning, Relationship,
};
use std::collections::HashSet;

/// Entities that are neither source nor target of any relationship
///
/// Roster order is preserved.
pub fn find_orphans<'a>(entities: &'a [Entity], relationships: &[Relationship]) -> Vec<&'a Entity> {
    let connected: HashSet<EntityId> = relationships
        .iter()
        .flat_map(|r| [r.source_entity_id, r.target_entity_id])
        .collect();

    entities.iter().filter(|e| !connected.contains(&e.id)).collect()
}

/// One `orphan_warning` finding per orphaned entity
pub fn detect_orphans(
    job_id: JobId,
    entities: &[Entity],
    relationships: &[Relationship],
) -> Vec<Finding> {
    find_orphans(entities, relationships)
        .into_iter()
        .map(|e| {
            Finding::new(
                job_id,
                FindingDetail::OrphanWarning(OrphanWarning {
                    entity_id: e.id,
                    entity_name: e.name.clone(),
                    entity_type: e.entity_type.clone(),
                }),
            )
        })
        .collect()
}
