//! Domain/range (type-pair) validation of proposed relationships

use crate::accessors::{allowed_pairs, load_entities};
use crate::error::GraphExpertError;
use lorekeeper_domain::traits::GraphStore;
use lorekeeper_domain::{
    CampaignId, Finding, FindingDetail, InvalidTypePair, JobId, RelationshipSuggestion, TypePair,
};
use std::collections::{BTreeSet, HashSet};
use std::fmt::Display;
use tracing::debug;

/// Check each suggestion's endpoint types against its relationship type's allowed pairs
///
/// A relationship type with no constraint rows accepts every pair. Suggestions
/// whose endpoints cannot be resolved are skipped, not flagged. Identical
/// `(source, target, type)` suggestions are reported once.
pub fn check_domain_range<S>(
    store: &S,
    campaign: CampaignId,
    job_id: JobId,
    suggestions: &[RelationshipSuggestion],
) -> Result<Vec<Finding>, GraphExpertError>
where
    S: GraphStore,
    S::Error: Display,
{
    if suggestions.is_empty() {
        return Ok(Vec::new());
    }

    let constraints = allowed_pairs(
        store,
        campaign,
        suggestions.iter().map(|s| s.relationship_type.as_str()),
    )?;
    if constraints.is_empty() {
        debug!("No domain/range constraints for the proposed relationship types");
        return Ok(Vec::new());
    }

    let constrained: Vec<&RelationshipSuggestion> = suggestions
        .iter()
        .filter(|s| constraints.contains_key(&s.relationship_type))
        .collect();
    let entities = load_entities(
        store,
        campaign,
        constrained
            .iter()
            .flat_map(|s| [s.source_entity_id, s.target_entity_id]),
    )?;

    let mut seen = HashSet::new();
    let mut findings = Vec::new();

    for suggestion in constrained {
        let (Some(source), Some(target)) = (
            entities.get(&suggestion.source_entity_id),
            entities.get(&suggestion.target_entity_id),
        ) else {
            debug!(
                "Skipping {} -> {}: endpoint not found",
                suggestion.source_entity_id, suggestion.target_entity_id
            );
            continue;
        };

        let allowed = &constraints[&suggestion.relationship_type];
        let observed = TypePair::new(source.entity_type.as_str(), target.entity_type.as_str());
        if allowed.contains(&observed) {
            continue;
        }

        let identity = (source.id, target.id, suggestion.relationship_type.as_str());
        if !seen.insert(identity) {
            continue;
        }

        findings.push(Finding::new(
            job_id,
            FindingDetail::InvalidTypePair(InvalidTypePair {
                source_entity_id: source.id,
                source_entity_name: source.name.clone(),
                target_entity_id: target.id,
                target_entity_name: target.name.clone(),
                relationship_type: suggestion.relationship_type.clone(),
                source_type: observed.source,
                target_type: observed.target,
                valid_pairs: describe_pairs(allowed),
            }),
        ));
    }

    Ok(findings)
}

/// Human-readable enumeration of allowed pairs, e.g. `npc → location, item → location`
pub fn describe_pairs(pairs: &BTreeSet<TypePair>) -> String {
    pairs
        .iter()
        .map(TypePair::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
