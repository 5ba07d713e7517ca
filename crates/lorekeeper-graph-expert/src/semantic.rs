//! Provider-assisted semantic check
//!
//! Asks the completion provider for redundant and implied edges. The
//! provider call is blocking, so it runs on the blocking pool under the
//! configured deadline.

use crate::config::GraphExpertConfig;
use crate::error::GraphExpertError;
use crate::parser::parse_semantic_response;
use crate::prompt::{SemanticPromptBuilder, SYSTEM_INSTRUCTIONS};
use lorekeeper_domain::traits::{CompletionProvider, CompletionRequest};
use lorekeeper_domain::{
    Finding, FindingDetail, JobContext, RelationshipSuggestion, SemanticFindingType, SemanticIssue,
};
use std::fmt::Display;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info};

/// Semantic checker over one job's graph slice
pub struct SemanticChecker<L> {
    provider: Arc<L>,
    config: GraphExpertConfig,
}

impl<L> SemanticChecker<L>
where
    L: CompletionProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create a new semantic checker
    pub fn new(provider: Arc<L>, config: GraphExpertConfig) -> Self {
        Self { provider, config }
    }

    /// Build the completion request for a job
    pub fn request(
        &self,
        job: &JobContext,
        suggestions: &[RelationshipSuggestion],
    ) -> CompletionRequest {
        let user_prompt = SemanticPromptBuilder::new(&job.entities, &job.relationships, suggestions)
            .with_justification_limit(self.config.justification_max_chars)
            .with_relationship_limit(self.config.max_prompt_relationships)
            .build();

        CompletionRequest {
            system_prompt: SYSTEM_INSTRUCTIONS.to_string(),
            user_prompt,
            max_tokens: self.config.semantic_max_tokens,
            temperature: self.config.semantic_temperature,
        }
    }

    /// Run the check
    ///
    /// # Errors
    ///
    /// Returns error if the provider fails, misses the deadline, or answers
    /// with something that is not the expected JSON object.
    pub async fn check(
        &self,
        job: &JobContext,
        suggestions: &[RelationshipSuggestion],
    ) -> Result<Vec<Finding>, GraphExpertError> {
        let request = self.request(job, suggestions);
        debug!("Semantic prompt length: {} chars", request.user_prompt.len());

        let deadline = self.config.semantic_timeout();
        let response = timeout(deadline, self.call_provider(request))
            .await
            .map_err(|_| GraphExpertError::Timeout(deadline))??;

        debug!("Semantic response length: {} chars", response.len());
        let issues = parse_semantic_response(&response)?;
        info!("Semantic check reported {} issues", issues.len());

        Ok(issues
            .into_iter()
            .map(|issue| Finding::new(job.job_id, semantic_detail(issue)))
            .collect())
    }

    /// Call the provider on the blocking pool
    async fn call_provider(&self, request: CompletionRequest) -> Result<String, GraphExpertError> {
        let provider = Arc::clone(&self.provider);

        tokio::task::spawn_blocking(move || {
            provider
                .complete(&request)
                .map_err(|e| GraphExpertError::Llm(e.to_string()))
        })
        .await
        .map_err(|e| GraphExpertError::Llm(format!("Task join error: {}", e)))?
    }
}

/// Redundant edges keep their own kind; implied edges are graph warnings
pub fn semantic_detail(issue: SemanticIssue) -> FindingDetail {
    match issue.finding_type {
        SemanticFindingType::RedundantEdge => FindingDetail::RedundantEdge(issue),
        SemanticFindingType::ImpliedEdge => FindingDetail::GraphWarning(issue),
    }
}
