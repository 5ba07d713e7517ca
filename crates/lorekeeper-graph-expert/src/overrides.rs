//! GM override filtering
//!
//! An override silences one exactly-keyed violation. Keys are derived from the
//! finding's typed detail, never from its free text:
//!
//! | Detail | Kind | Key |
//! |---|---|---|
//! | `InvalidTypePair` | `domain_range` | `{relType}:{sourceType}:{targetType}` |
//! | `CardinalityViolation` | `cardinality` | `{relType}:{entityID}:{direction}` |
//! | `MissingRequired` | `required` | `{entityType}:{missingRelType}` |
//!
//! Every other kind is never overridable. A finding whose key cannot be
//! built passes through.

use crate::error::GraphExpertError;
use lorekeeper_domain::traits::GraphStore;
use lorekeeper_domain::{CampaignId, ConstraintKind, ConstraintOverride, Finding, FindingDetail};
use std::collections::HashSet;
use std::fmt::Display;
use tracing::debug;

/// Canonical override key for a finding detail, if it has one
pub fn override_key(detail: &FindingDetail) -> Option<ConstraintOverride> {
    let (kind, key) = match detail {
        FindingDetail::InvalidTypePair(d) => (
            ConstraintKind::DomainRange,
            join_key(&[
                d.relationship_type.as_str(),
                d.source_type.as_str(),
                d.target_type.as_str(),
            ])?,
        ),
        FindingDetail::CardinalityViolation(d) => {
            let entity_id = d.entity_id.to_string();
            (
                ConstraintKind::Cardinality,
                join_key(&[
                    d.relationship_type.as_str(),
                    entity_id.as_str(),
                    d.direction.as_str(),
                ])?,
            )
        }
        FindingDetail::MissingRequired(d) => (
            ConstraintKind::Required,
            join_key(&[d.entity_type.as_str(), d.missing_relationship_type.as_str()])?,
        ),
        FindingDetail::OrphanWarning(_)
        | FindingDetail::RedundantEdge(_)
        | FindingDetail::GraphWarning(_) => return None,
    };

    Some(ConstraintOverride::new(kind, key))
}

/// Override key for a detail stored as raw JSON
///
/// Payloads that do not parse as a [`FindingDetail`] have no key.
pub fn override_key_for_payload(payload: &serde_json::Value) -> Option<ConstraintOverride> {
    let detail: FindingDetail = serde_json::from_value(payload.clone()).ok()?;
    override_key(&detail)
}

fn join_key(parts: &[&str]) -> Option<String> {
    if parts.iter().any(|p| p.trim().is_empty()) {
        return None;
    }
    Some(parts.join(":"))
}

/// Every acknowledged violation for one campaign
#[derive(Debug, Clone, Default)]
pub struct OverrideSet {
    acknowledged: HashSet<ConstraintOverride>,
}

impl OverrideSet {
    /// Load the campaign's overrides in a single query
    pub fn load<S>(store: &S, campaign: CampaignId) -> Result<Self, GraphExpertError>
    where
        S: GraphStore,
        S::Error: Display,
    {
        let overrides = store
            .constraint_overrides(campaign)
            .map_err(|e| GraphExpertError::store("constraint overrides", e))?;

        debug!("Loaded {} constraint overrides", overrides.len());
        Ok(overrides.into_iter().collect())
    }

    /// Number of acknowledged keys
    pub fn len(&self) -> usize {
        self.acknowledged.len()
    }

    /// Whether there are no overrides
    pub fn is_empty(&self) -> bool {
        self.acknowledged.is_empty()
    }

    /// Whether an override silences this finding
    pub fn suppresses(&self, finding: &Finding) -> bool {
        override_key(&finding.detail).is_some_and(|key| self.acknowledged.contains(&key))
    }

    /// Drop suppressed findings, returning the survivors and how many were dropped
    pub fn filter(&self, findings: Vec<Finding>) -> (Vec<Finding>, usize) {
        if self.is_empty() {
            return (findings, 0);
        }

        let before = findings.len();
        let kept: Vec<Finding> = findings.into_iter().filter(|f| !self.suppresses(f)).collect();
        let suppressed = before - kept.len();
        (kept, suppressed)
    }
}

impl FromIterator<ConstraintOverride> for OverrideSet {
    fn from_iter<I: IntoIterator<Item = ConstraintOverride>>(iter: I) -> Self {
        Self {
            acknowledged: iter.into_iter().collect(),
        }
    }
}
