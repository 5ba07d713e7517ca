//! Required-relationship checking
//!
//! Delegates the entity × rule × edge cross-check to one aggregate store
//! query. Only persisted edges count; a pending suggestion does not satisfy a
//! rule until it is committed.

use crate::error::GraphExpertError;
use lorekeeper_domain::traits::GraphStore;
use lorekeeper_domain::{CampaignId, Finding, FindingDetail, JobId};
use std::fmt::Display;
use tracing::debug;

/// One `missing_required` finding per entity lacking a required relationship
pub fn check_required<S>(
    store: &S,
    campaign: CampaignId,
    job_id: JobId,
) -> Result<Vec<Finding>, GraphExpertError>
where
    S: GraphStore,
    S::Error: Display,
{
    let missing = store
        .required_relationship_violations(campaign)
        .map_err(|e| GraphExpertError::store("required relationship violations", e))?;

    debug!("{} entities missing a required relationship", missing.len());
    Ok(missing
        .into_iter()
        .map(|m| Finding::new(job_id, FindingDetail::MissingRequired(m)))
        .collect())
}
