//! Campaign-scoped ontology rules
//!
//! Rules are authored by the GM through campaign configuration. Validation
//! reads them fresh on every run and never caches them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum edge counts for one relationship type
///
/// `None` for a direction means unbounded in that direction, not zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardinalityConstraint {
    /// Relationship type name
    pub relationship_type: String,

    /// Maximum edges where the entity is the source
    pub max_source: Option<u32>,

    /// Maximum edges where the entity is the target
    pub max_target: Option<u32>,
}

/// Every entity of `entity_type` should have at least one `relationship_type` edge
///
/// Satisfaction is direction-agnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredRelationship {
    /// Entity type the rule applies to
    pub entity_type: String,

    /// Relationship type name that must be present
    pub relationship_type: String,
}

/// One allowed `(source type, target type)` pair for a relationship type
///
/// A relationship type with no rows at all is unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRangeConstraint {
    /// Relationship type name
    pub relationship_type: String,

    /// Allowed source entity type
    pub source_entity_type: String,

    /// Allowed target entity type
    pub target_entity_type: String,
}

impl DomainRangeConstraint {
    /// The allowed pair this row describes
    pub fn pair(&self) -> TypePair {
        TypePair::new(&self.source_entity_type, &self.target_entity_type)
    }
}

/// An ordered `(source type, target type)` pair
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypePair {
    /// Source entity type
    pub source: String,

    /// Target entity type
    pub target: String,
}

impl TypePair {
    /// Create a pair
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for TypePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.source, self.target)
    }
}

/// Which family of ontology rule an override silences
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Domain/range (type-pair) violations
    DomainRange,

    /// Cardinality violations
    Cardinality,

    /// Missing required relationships
    Required,
}

impl ConstraintKind {
    /// Canonical stored name
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::DomainRange => "domain_range",
            ConstraintKind::Cardinality => "cardinality",
            ConstraintKind::Required => "required",
        }
    }

    /// Parse from the canonical stored name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "domain_range" => Some(ConstraintKind::DomainRange),
            "cardinality" => Some(ConstraintKind::Cardinality),
            "required" => Some(ConstraintKind::Required),
            _ => None,
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A GM acknowledgement that permanently silences one exactly-keyed violation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConstraintOverride {
    /// Rule family
    pub constraint_kind: ConstraintKind,

    /// Canonical key derived from the violation's identifying fields
    pub override_key: String,
}

impl ConstraintOverride {
    /// Create an override
    pub fn new(constraint_kind: ConstraintKind, override_key: impl Into<String>) -> Self {
        Self {
            constraint_kind,
            override_key: override_key.into(),
        }
    }
}
