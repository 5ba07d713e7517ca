//! Cardinality checking over persisted and proposed edges
//!
//! Phase one takes the store's own aggregate over committed data as
//! authoritative. Phase two adds what the suggestion batch would contribute,
//! without writing anything, and reports keys that would go over their limit.
//! A key phase one already reported is never reported again.

use crate::accessors::{persisted_counts, relationship_type_ids};
use crate::error::GraphExpertError;
use lorekeeper_domain::traits::{CountKey, GraphStore};
use lorekeeper_domain::{
    CampaignId, CardinalityConstraint, CardinalityViolation, Direction, EntityId, Finding,
    FindingDetail, JobId, RelationshipSuggestion,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Display;
use tracing::debug;

/// `(entity, relationship type name, direction)`
type ViolationKey = (EntityId, String, Direction);

#[derive(Debug)]
struct ProposedTally {
    entity_name: String,
    count: u32,
    max_allowed: u32,
}

/// Report persisted violations plus those the suggestion batch would create
pub fn check_cardinality<S>(
    store: &S,
    campaign: CampaignId,
    job_id: JobId,
    suggestions: &[RelationshipSuggestion],
) -> Result<Vec<Finding>, GraphExpertError>
where
    S: GraphStore,
    S::Error: Display,
{
    let persisted = store
        .cardinality_violations(campaign)
        .map_err(|e| GraphExpertError::store("cardinality violations", e))?;

    let flagged: HashSet<ViolationKey> = persisted
        .iter()
        .map(|v| (v.entity_id, v.relationship_type.clone(), v.direction))
        .collect();
    let mut findings: Vec<Finding> = persisted
        .into_iter()
        .map(|v| Finding::new(job_id, FindingDetail::CardinalityViolation(v)))
        .collect();

    if suggestions.is_empty() {
        return Ok(findings);
    }

    let limits: HashMap<String, CardinalityConstraint> = store
        .cardinality_constraints(campaign)
        .map_err(|e| GraphExpertError::store("cardinality constraints", e))?
        .into_iter()
        .map(|c| (c.relationship_type.clone(), c))
        .collect();

    let mut proposed = tally_proposed(suggestions, &limits);
    proposed.retain(|key, _| !flagged.contains(key));
    if proposed.is_empty() {
        return Ok(findings);
    }
    debug!("Checking {} proposed cardinality keys", proposed.len());

    let type_ids =
        relationship_type_ids(store, campaign, proposed.keys().map(|(_, t, _)| t.as_str()))?;
    let count_key = |(entity_id, relationship_type, direction): &ViolationKey| {
        type_ids.get(relationship_type).map(|id| CountKey {
            entity_id: *entity_id,
            relationship_type_id: *id,
            direction: *direction,
        })
    };

    let keys: Vec<CountKey> = proposed.keys().filter_map(count_key).collect();
    let counts = persisted_counts(store, campaign, &keys)?;

    for (key, tally) in proposed {
        // A type with no row has no persisted edges
        let existing = count_key(&key)
            .and_then(|k| counts.get(&k).copied())
            .unwrap_or(0);
        let total = existing + tally.count;
        if total <= tally.max_allowed {
            continue;
        }

        let (entity_id, relationship_type, direction) = key;
        findings.push(Finding::new(
            job_id,
            FindingDetail::CardinalityViolation(CardinalityViolation {
                entity_id,
                entity_name: tally.entity_name,
                relationship_type,
                direction,
                current_count: total,
                max_allowed: tally.max_allowed,
            }),
        ));
    }

    Ok(findings)
}

/// Count proposed edges per bounded `(entity, type, direction)` key
fn tally_proposed(
    suggestions: &[RelationshipSuggestion],
    limits: &HashMap<String, CardinalityConstraint>,
) -> BTreeMap<ViolationKey, ProposedTally> {
    let mut tallies: BTreeMap<ViolationKey, ProposedTally> = BTreeMap::new();

    for suggestion in suggestions {
        let Some(limit) = limits.get(&suggestion.relationship_type) else {
            continue;
        };

        let ends = [
            (
                suggestion.source_entity_id,
                &suggestion.source_entity_name,
                Direction::Source,
                limit.max_source,
            ),
            (
                suggestion.target_entity_id,
                &suggestion.target_entity_name,
                Direction::Target,
                limit.max_target,
            ),
        ];

        for (entity_id, entity_name, direction, max) in ends {
            let Some(max_allowed) = max else {
                continue;
            };
            tallies
                .entry((entity_id, suggestion.relationship_type.clone(), direction))
                .or_insert_with(|| ProposedTally {
                    entity_name: entity_name.clone(),
                    count: 0,
                    max_allowed,
                })
                .count += 1;
        }
    }

    tallies
}
