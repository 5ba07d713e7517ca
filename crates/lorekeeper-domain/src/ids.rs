//! Identifier newtypes
//!
//! All identifiers are database row IDs. They print as bare integers, which is
//! what override keys embed.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw row ID
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Get the raw row ID
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(
    /// Campaign identifier; every entity, relationship and rule is scoped to one
    CampaignId
);
row_id!(
    /// Entity identifier
    EntityId
);
row_id!(
    /// Relationship type identifier
    RelationshipTypeId
);
row_id!(
    /// Analysis job identifier
    JobId
);
