//! Lorekeeper Graph Expert
//!
//! Checks a campaign knowledge graph, plus a batch of proposed relationships,
//! against the campaign's ontology rules and against provider-judged semantic
//! redundancy. Every finding is advisory; nothing here writes graph data.
//!
//! # Architecture
//!
//! ```text
//! JobContext ─┬─ orphans ──────┐
//!             ├─ domain/range ─┤
//!             ├─ cardinality ──┼─ merge ─ override filter ─ ValidationReport
//!             ├─ required ─────┤
//!             └─ semantic ─────┘ (provider attached, graph non-empty)
//! ```
//!
//! Structural checkers read the store through batched accessors, one query
//! per ID or name set. A checker that fails contributes nothing and is named
//! in the report; it never fails the run.
//!
//! # Example Usage
//!
//! ```no_run
//! use lorekeeper_graph_expert::{GraphExpert, GraphExpertConfig};
//! use lorekeeper_domain::{CampaignId, JobContext, JobId};
//! use lorekeeper_llm::MockProvider;
//! use lorekeeper_store::SqliteStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new("campaign.db")?;
//! let expert = GraphExpert::new(GraphExpertConfig::default())?
//!     .with_provider(MockProvider::new(r#"{"findings": []}"#));
//!
//! let job = JobContext::new(CampaignId::new(1), JobId::new(42), vec![]);
//! let report = expert.validate(&store, &job).await;
//!
//! println!("{} findings", report.findings.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accessors;
pub mod cardinality;
pub mod config;
pub mod domain_range;
pub mod error;
pub mod expert;
pub mod orphans;
pub mod overrides;
pub mod parser;
pub mod prompt;
pub mod report;
pub mod required;
pub mod semantic;

#[cfg(test)]
mod test_support;

pub use config::GraphExpertConfig;
pub use error::GraphExpertError;
pub use expert::{GraphExpert, STAGE_DEPENDENCIES, STAGE_NAME};
pub use overrides::{override_key, OverrideSet};
pub use report::{Checker, RunMetadata, SemanticStatus, ValidationReport};
pub use semantic::SemanticChecker;
