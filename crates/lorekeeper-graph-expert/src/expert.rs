//! Main GraphExpert implementation

use crate::cardinality::check_cardinality;
use crate::config::GraphExpertConfig;
use crate::domain_range::check_domain_range;
use crate::error::GraphExpertError;
use crate::orphans::detect_orphans;
use crate::overrides::OverrideSet;
use crate::report::{Checker, RunMetadata, SemanticStatus, ValidationReport};
use crate::required::check_required;
use crate::semantic::SemanticChecker;
use lorekeeper_domain::traits::{AnalysisStage, CompletionProvider, GraphStore};
use lorekeeper_domain::{Finding, JobContext, RelationshipSuggestion};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Stage name in the analysis pipeline
pub const STAGE_NAME: &str = "graph_expert";

/// Stages that must run first
pub const STAGE_DEPENDENCIES: &[&str] = &["enrichment"];

/// The GraphExpert checks a job's graph slice against the campaign ontology
///
/// Structural checks always run. The semantic check runs only when a
/// completion provider is attached. No failure inside a phase escapes
/// [`GraphExpert::validate`]; it is logged, recorded in the report, and the
/// phase contributes nothing.
pub struct GraphExpert<L> {
    provider: Option<Arc<L>>,
    config: GraphExpertConfig,
}

impl<L> GraphExpert<L>
where
    L: CompletionProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create a graph expert with no completion provider
    ///
    /// # Errors
    ///
    /// Returns [`GraphExpertError::Config`] when `config` fails
    /// [`GraphExpertConfig::validate`].
    pub fn new(config: GraphExpertConfig) -> Result<Self, GraphExpertError> {
        config.validate().map_err(GraphExpertError::Config)?;
        Ok(Self {
            provider: None,
            config,
        })
    }

    /// Attach a completion provider
    pub fn with_provider(self, provider: L) -> Self {
        self.with_shared_provider(Arc::new(provider))
    }

    /// Attach a completion provider shared with other stages
    pub fn with_shared_provider(mut self, provider: Arc<L>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &GraphExpertConfig {
        &self.config
    }

    /// Validate one analysis job
    pub async fn validate<S>(&self, store: &S, job: &JobContext) -> ValidationReport
    where
        S: GraphStore,
        S::Error: Display,
    {
        let start = Instant::now();

        if job.entities.is_empty() {
            info!("Job {} has no entities; nothing to validate", job.job_id);
            return ValidationReport {
                job_id: job.job_id,
                findings: Vec::new(),
                metadata: RunMetadata::new(SemanticStatus::Skipped("no entities".to_string())),
            };
        }

        let (suggestions, skipped) = job.relationship_suggestions();
        if skipped > 0 {
            warn!("Skipped {} relationship suggestions with unparseable payloads", skipped);
        }
        info!(
            "Validating job {}: {} entities, {} relationships, {} suggestions",
            job.job_id,
            job.entities.len(),
            job.relationships.len(),
            suggestions.len()
        );

        let mut metadata = RunMetadata::new(SemanticStatus::Skipped("not run".to_string()));
        metadata.skipped_suggestions = skipped;

        // 1. Structural phase
        let mut findings = self.structural_phase(store, job, &suggestions, &mut metadata);
        metadata.structural_findings = findings.len();

        // 2. Semantic phase
        let semantic = self.semantic_phase(job, &suggestions, &mut metadata).await;
        metadata.semantic_findings = semantic.len();
        findings.extend(semantic);

        // 3. Override filter
        if self.config.apply_overrides {
            match OverrideSet::load(store, job.campaign_id) {
                Ok(overrides) => {
                    let (kept, suppressed) = overrides.filter(findings);
                    findings = kept;
                    metadata.suppressed_by_overrides = suppressed;
                }
                Err(e) => {
                    warn!("Override filter failed, returning unfiltered findings: {}", e);
                    metadata.failed_checkers.push(Checker::Overrides);
                }
            }
        }

        metadata.processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Job {} validated: {} findings ({} suppressed) in {}ms",
            job.job_id,
            findings.len(),
            metadata.suppressed_by_overrides,
            metadata.processing_time_ms
        );

        ValidationReport {
            job_id: job.job_id,
            findings,
            metadata,
        }
    }

    fn structural_phase<S>(
        &self,
        store: &S,
        job: &JobContext,
        suggestions: &[RelationshipSuggestion],
        metadata: &mut RunMetadata,
    ) -> Vec<Finding>
    where
        S: GraphStore,
        S::Error: Display,
    {
        let mut findings = Vec::new();

        if self.config.check_orphans {
            findings.extend(detect_orphans(job.job_id, &job.entities, &job.relationships));
        }
        if self.config.check_domain_range {
            let result = check_domain_range(store, job.campaign_id, job.job_id, suggestions);
            findings.extend(absorb(Checker::DomainRange, result, metadata));
        }
        if self.config.check_cardinality {
            let result = check_cardinality(store, job.campaign_id, job.job_id, suggestions);
            findings.extend(absorb(Checker::Cardinality, result, metadata));
        }
        if self.config.check_required {
            let result = check_required(store, job.campaign_id, job.job_id);
            findings.extend(absorb(Checker::Required, result, metadata));
        }

        findings
    }

    async fn semantic_phase(
        &self,
        job: &JobContext,
        suggestions: &[RelationshipSuggestion],
        metadata: &mut RunMetadata,
    ) -> Vec<Finding> {
        let provider = match &self.provider {
            _ if !self.config.check_semantic => Err("disabled"),
            None => Err("no completion provider"),
            Some(_) if job.relationships.is_empty() && suggestions.is_empty() => {
                Err("no relationships or suggestions")
            }
            Some(provider) => Ok(provider),
        };
        let provider = match provider {
            Ok(provider) => provider,
            Err(reason) => {
                debug!("Semantic check skipped: {}", reason);
                metadata.semantic_status = SemanticStatus::Skipped(reason.to_string());
                return Vec::new();
            }
        };

        let checker = SemanticChecker::new(Arc::clone(provider), self.config.clone());
        match checker.check(job, suggestions).await {
            Ok(findings) => {
                metadata.semantic_status = SemanticStatus::Completed;
                findings
            }
            Err(e) => {
                warn!("Semantic check failed, continuing without it: {}", e);
                metadata.semantic_status = match e {
                    GraphExpertError::Timeout(_) => SemanticStatus::TimedOut,
                    other => SemanticStatus::Failed(other.to_string()),
                };
                metadata.failed_checkers.push(Checker::Semantic);
                Vec::new()
            }
        }
    }
}

impl<L> AnalysisStage for GraphExpert<L> {
    fn name(&self) -> &'static str {
        STAGE_NAME
    }

    fn dependencies(&self) -> &'static [&'static str] {
        STAGE_DEPENDENCIES
    }
}

/// Turn a checker's failure into an empty contribution
fn absorb(
    checker: Checker,
    result: Result<Vec<Finding>, GraphExpertError>,
    metadata: &mut RunMetadata,
) -> Vec<Finding> {
    match result {
        Ok(findings) => {
            debug!("{} check produced {} findings", checker, findings.len());
            findings
        }
        Err(e) => {
            warn!("{} check failed, continuing without it: {}", checker, e);
            metadata.failed_checkers.push(checker);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        edge, suggestion, FakeStore, CAMPAIGN, ELARA, INN, JOB, KEY, LOCATED_AT, VIKTOR,
    };
    use lorekeeper_domain::{
        CardinalityConstraint, ConstraintKind, ConstraintOverride, DetectionKind, Entity, EntityId,
        MissingRequired, PipelinePhase, PriorFinding, ReviewStatus, RELATIONSHIP_SUGGESTION,
    };
    use lorekeeper_llm::MockProvider;

    fn job() -> JobContext {
        let mut job = JobContext::new(
            CAMPAIGN,
            JOB,
            vec![
                Entity::new(VIKTOR, CAMPAIGN, "npc", "Viktor"),
                Entity::new(INN, CAMPAIGN, "location", "The Gilded Inn"),
                Entity::new(KEY, CAMPAIGN, "item", "Iron Key"),
            ],
        );
        job.relationships = vec![edge(VIKTOR, INN, LOCATED_AT, "located_at")];
        job
    }

    fn with_suggestion(
        mut job: JobContext,
        source: EntityId,
        target: EntityId,
        relationship_type: &str,
    ) -> JobContext {
        job.prior_findings.push(PriorFinding {
            detection_type: RELATIONSHIP_SUGGESTION.to_string(),
            phase: PipelinePhase::Enrichment,
            payload: serde_json::to_value(suggestion(source, target, relationship_type)).unwrap(),
        });
        job
    }

    fn missing_elara() -> MissingRequired {
        MissingRequired {
            entity_id: ELARA,
            entity_name: "Elara".to_string(),
            entity_type: "npc".to_string(),
            missing_relationship_type: "located_at".to_string(),
        }
    }

    fn expert(config: GraphExpertConfig) -> GraphExpert<MockProvider> {
        GraphExpert::new(config).unwrap()
    }

    #[test]
    fn test_stage_identity() {
        let expert = expert(GraphExpertConfig::default());
        assert_eq!(expert.name(), "graph_expert");
        assert_eq!(expert.dependencies(), &["enrichment"]);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = GraphExpertConfig {
            semantic_timeout_secs: 0,
            ..GraphExpertConfig::default()
        };

        match GraphExpert::<MockProvider>::new(config) {
            Err(GraphExpertError::Config(msg)) => assert!(msg.contains("semantic_timeout_secs")),
            Err(e) => panic!("Expected Config error, got {}", e),
            Ok(_) => panic!("Expected Config error, got a graph expert"),
        }
    }

    #[tokio::test]
    async fn test_empty_roster_does_no_work() {
        let store = FakeStore::roster();
        let empty = JobContext::new(CAMPAIGN, JOB, vec![]);

        let report = expert(GraphExpertConfig::default())
            .with_provider(MockProvider::default())
            .validate(&store, &empty)
            .await;

        assert!(report.findings.is_empty());
        assert!(store.calls().is_empty());
        assert_eq!(
            report.metadata.semantic_status,
            SemanticStatus::Skipped("no entities".to_string())
        );
    }

    #[tokio::test]
    async fn test_findings_tagged_with_job_and_phase() {
        let mut store = FakeStore::roster();
        store.missing = vec![missing_elara()];

        let report = expert(GraphExpertConfig::default()).validate(&store, &job()).await;

        assert_eq!(report.job_id, JOB);
        assert_eq!(report.findings.len(), 2);
        assert!(report.findings.iter().all(|f| f.job_id == JOB
            && f.phase == PipelinePhase::GraphValidation
            && f.review_status == ReviewStatus::Pending));
        assert_eq!(report.findings_of(DetectionKind::OrphanWarning).count(), 1);
        assert_eq!(report.metadata.structural_findings, 2);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_failed_checker_does_not_sink_siblings() {
        let mut store = FakeStore::roster().failing("cardinality_violations");
        store.missing = vec![missing_elara()];

        let report = expert(GraphExpertConfig::default()).validate(&store, &job()).await;

        assert_eq!(report.findings_of(DetectionKind::MissingRequired).count(), 1);
        assert_eq!(report.findings_of(DetectionKind::OrphanWarning).count(), 1);
        assert_eq!(report.metadata.failed_checkers, vec![Checker::Cardinality]);
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_override_failure_fails_open() {
        let mut store = FakeStore::roster().failing("constraint_overrides");
        store.missing = vec![missing_elara()];

        let report = expert(GraphExpertConfig::default()).validate(&store, &job()).await;

        assert_eq!(report.findings_of(DetectionKind::MissingRequired).count(), 1);
        assert_eq!(report.metadata.failed_checkers, vec![Checker::Overrides]);
    }

    #[tokio::test]
    async fn test_overrides_suppress_and_count() {
        let mut store = FakeStore::roster();
        store.missing = vec![missing_elara()];
        store.overrides = vec![ConstraintOverride::new(ConstraintKind::Required, "npc:located_at")];

        let report = expert(GraphExpertConfig::default()).validate(&store, &job()).await;

        assert_eq!(report.findings_of(DetectionKind::MissingRequired).count(), 0);
        assert_eq!(report.metadata.suppressed_by_overrides, 1);
    }

    #[tokio::test]
    async fn test_overrides_can_be_disabled() {
        let mut store = FakeStore::roster();
        store.missing = vec![missing_elara()];
        store.overrides = vec![ConstraintOverride::new(ConstraintKind::Required, "npc:located_at")];
        let mut config = GraphExpertConfig::default();
        config.apply_overrides = false;

        let report = expert(config).validate(&store, &job()).await;

        assert_eq!(report.findings_of(DetectionKind::MissingRequired).count(), 1);
        assert!(!store.calls().contains(&"constraint_overrides"));
    }

    #[tokio::test]
    async fn test_semantic_skipped_without_provider() {
        let store = FakeStore::roster();
        let report = expert(GraphExpertConfig::default()).validate(&store, &job()).await;
        assert_eq!(
            report.metadata.semantic_status,
            SemanticStatus::Skipped("no completion provider".to_string())
        );
    }

    #[tokio::test]
    async fn test_semantic_skipped_without_graph_content() {
        let store = FakeStore::roster();
        let provider = MockProvider::new(r#"{"findings": []}"#);
        let mut bare = job();
        bare.relationships.clear();

        let report = expert(GraphExpertConfig::default())
            .with_provider(provider.clone())
            .validate(&store, &bare)
            .await;

        assert_eq!(provider.call_count(), 0);
        assert_eq!(
            report.metadata.semantic_status,
            SemanticStatus::Skipped("no relationships or suggestions".to_string())
        );
    }

    #[tokio::test]
    async fn test_suggestion_alone_enables_semantic() {
        let store = FakeStore::roster();
        let provider = MockProvider::new(
            r#"{"findings": [{"findingType": "redundant_edge", "description": "allied twice"}]}"#,
        );
        let mut bare = with_suggestion(job(), VIKTOR, KEY, "allied_with");
        bare.relationships.clear();

        let report = expert(GraphExpertConfig::default())
            .with_provider(provider.clone())
            .validate(&store, &bare)
            .await;

        assert_eq!(provider.call_count(), 1);
        assert_eq!(report.metadata.semantic_status, SemanticStatus::Completed);
        assert_eq!(report.metadata.semantic_findings, 1);
        assert_eq!(report.findings_of(DetectionKind::RedundantEdge).count(), 1);
    }

    #[tokio::test]
    async fn test_semantic_failure_keeps_structural_findings() {
        let mut store = FakeStore::roster();
        store.limits = vec![CardinalityConstraint {
            relationship_type: "allied_with".to_string(),
            max_source: Some(0),
            max_target: None,
        }];
        let job = with_suggestion(job(), VIKTOR, KEY, "allied_with");

        let report = expert(GraphExpertConfig::default())
            .with_provider(MockProvider::failing())
            .validate(&store, &job)
            .await;

        assert_eq!(report.findings_of(DetectionKind::CardinalityViolation).count(), 1);
        assert_eq!(report.metadata.semantic_findings, 0);
        assert!(matches!(report.metadata.semantic_status, SemanticStatus::Failed(_)));
        assert_eq!(report.metadata.failed_checkers, vec![Checker::Semantic]);
    }

    #[tokio::test]
    async fn test_unparseable_suggestion_is_counted_and_skipped() {
        let store = FakeStore::roster();
        let mut job = job();
        job.prior_findings.push(PriorFinding {
            detection_type: RELATIONSHIP_SUGGESTION.to_string(),
            phase: PipelinePhase::Enrichment,
            payload: serde_json::json!({"sourceEntityId": "not a number"}),
        });

        let report = expert(GraphExpertConfig::structural_only()).validate(&store, &job).await;

        assert_eq!(report.metadata.skipped_suggestions, 1);
        assert!(report.is_complete());
    }
}
