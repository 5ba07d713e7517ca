//! Integration tests for the validate command

use lorekeeper_cli::cli::ValidateArgs;
use lorekeeper_cli::commands::{execute_validate, read_job};
use lorekeeper_cli::{block_on_bounded, Formatter, OutputFormat};
use lorekeeper_domain::{
    CampaignId, ConstraintKind, ConstraintOverride, Entity, EntityId, RelationshipType,
    RelationshipTypeId,
};
use lorekeeper_graph_expert::{GraphExpert, GraphExpertConfig, SemanticStatus};
use lorekeeper_llm::MockProvider;
use lorekeeper_store::SqliteStore;
use std::io::Write;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const CAMPAIGN: CampaignId = CampaignId::new(1);
const LOCATED_AT: RelationshipTypeId = RelationshipTypeId::new(10);

/// Campaign with Viktor and Elara, both npcs that must be located somewhere
fn seed_campaign(dir: &Path) -> PathBuf {
    let path = dir.join("campaign.db");
    let mut store = SqliteStore::new(&path).unwrap();

    store
        .insert_entity(&Entity::new(EntityId::new(1), CAMPAIGN, "npc", "Viktor"))
        .unwrap();
    store
        .insert_entity(&Entity::new(EntityId::new(4), CAMPAIGN, "npc", "Elara"))
        .unwrap();
    store
        .insert_relationship_type(&RelationshipType {
            id: LOCATED_AT,
            campaign_id: CAMPAIGN,
            name: "located_at".to_string(),
            inverse_name: "location_of".to_string(),
            is_symmetric: false,
            display_label: "located at".to_string(),
            inverse_display_label: "location of".to_string(),
        })
        .unwrap();
    store.add_required_relationship(CAMPAIGN, "npc", LOCATED_AT).unwrap();

    path
}

fn write_job(dir: &Path) -> PathBuf {
    let path = dir.join("job.json");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        r#"{{
            "campaign_id": 1,
            "job_id": 9,
            "entities": [
                {{"id": 1, "campaign_id": 1, "entity_type": "npc", "name": "Viktor"}},
                {{"id": 4, "campaign_id": 1, "entity_type": "npc", "name": "Elara"}}
            ]
        }}"#
    )
    .unwrap();
    path
}

/// Same roster with Viktor located near Elara, so the semantic check has
/// graph content to send
fn write_linked_job(dir: &Path) -> PathBuf {
    let path = dir.join("linked-job.json");
    std::fs::write(
        &path,
        r#"{
            "campaign_id": 1,
            "job_id": 9,
            "entities": [
                {"id": 1, "campaign_id": 1, "entity_type": "npc", "name": "Viktor"},
                {"id": 4, "campaign_id": 1, "entity_type": "npc", "name": "Elara"}
            ],
            "relationships": [
                {
                    "campaign_id": 1,
                    "source_entity_id": 1,
                    "target_entity_id": 4,
                    "relationship_type_id": 10,
                    "relationship_type": "located_at"
                }
            ]
        }"#,
    )
    .unwrap();
    path
}

fn write_config(dir: &Path, timeout_secs: u64) -> PathBuf {
    let path = dir.join("graph-expert.toml");
    std::fs::write(
        &path,
        format!(
            "semantic_timeout_secs = {}\n\
             semantic_max_tokens = 256\n\
             semantic_temperature = 0.0\n\
             justification_max_chars = 50\n\
             max_prompt_relationships = 20\n",
            timeout_secs
        ),
    )
    .unwrap();
    path
}

fn args(db: PathBuf, job: PathBuf, config: Option<PathBuf>) -> ValidateArgs {
    ValidateArgs {
        db,
        job,
        config,
        structural_only: false,
        ollama_model: None,
        ollama_endpoint: "http://127.0.0.1:1".to_string(),
        pretty: false,
    }
}

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let db = seed_campaign(dir.path());
    let job = write_job(dir.path());
    (dir, db, job)
}

#[tokio::test]
async fn test_validate_json_report() {
    let (_dir, db, job) = setup();
    let formatter = Formatter::new(OutputFormat::Json, false);

    let output = execute_validate(args(db, job, None), &formatter).await.unwrap();
    let report: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(report["job_id"], 9);
    // Two orphans and two missing located_at
    assert_eq!(report["findings"].as_array().unwrap().len(), 4);
    assert_eq!(report["metadata"]["semantic_status"]["status"], "skipped");
}

#[tokio::test]
async fn test_validate_applies_overrides() {
    let (_dir, db, job) = setup();
    {
        let mut store = SqliteStore::new(&db).unwrap();
        store
            .add_override(
                CAMPAIGN,
                &ConstraintOverride::new(ConstraintKind::Required, "npc:located_at"),
            )
            .unwrap();
    }
    let formatter = Formatter::new(OutputFormat::Quiet, false);

    let output = execute_validate(args(db, job, None), &formatter).await.unwrap();

    let kinds: Vec<&str> = output.lines().filter_map(|l| l.split('\t').next()).collect();
    assert_eq!(kinds, vec!["orphan_warning", "orphan_warning"]);
}

#[tokio::test]
async fn test_validate_with_config_file() {
    let (dir, db, job) = setup();
    let config_path = dir.path().join("graph-expert.toml");
    std::fs::write(
        &config_path,
        "check_orphans = false\n\
         semantic_timeout_secs = 5\n\
         semantic_max_tokens = 256\n\
         semantic_temperature = 0.0\n\
         justification_max_chars = 50\n\
         max_prompt_relationships = 20\n",
    )
    .unwrap();
    let formatter = Formatter::new(OutputFormat::Quiet, false);

    let output = execute_validate(args(db, job, Some(config_path)), &formatter)
        .await
        .unwrap();

    assert_eq!(output.lines().count(), 2);
    assert!(output.lines().all(|l| l.starts_with("missing_required")));
}

#[tokio::test]
async fn test_provider_not_called_without_graph_content() {
    let (_dir, db, job) = setup();
    let mut validate = args(db, job, None);
    validate.ollama_model = Some("llama3".to_string());
    // Entities exist but there are no relationships or suggestions, so the
    // semantic check is skipped before any request is made
    let formatter = Formatter::new(OutputFormat::Json, false);

    let output = execute_validate(validate, &formatter).await.unwrap();
    let report: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(
        report["metadata"]["semantic_status"]["detail"],
        "no relationships or suggestions"
    );
    assert_eq!(report["findings"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_missing_database_directory_fails() {
    let (dir, _db, job) = setup();
    let formatter = Formatter::new(OutputFormat::Json, false);
    let db = dir.path().join("missing").join("campaign.db");

    assert!(execute_validate(args(db, job, None), &formatter).await.is_err());
}

#[test]
fn test_unresponsive_ollama_bounded_by_deadline() {
    let (dir, db, _job) = setup();
    let job = write_linked_job(dir.path());
    let config = write_config(dir.path(), 1);

    // Accepts connections into the backlog but never answers
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let mut validate = args(db, job, Some(config));
    validate.ollama_model = Some("llama3".to_string());
    validate.ollama_endpoint = format!("http://{}", listener.local_addr().unwrap());

    let formatter = Formatter::new(OutputFormat::Json, false);
    let start = Instant::now();
    let output = block_on_bounded(execute_validate(validate, &formatter))
        .unwrap()
        .unwrap();
    let elapsed = start.elapsed();

    let report: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["metadata"]["failed_checkers"], serde_json::json!(["semantic"]));
    // Structural findings still come from the persisted graph
    assert_eq!(report["findings"].as_array().unwrap().len(), 2);
    assert!(
        elapsed < Duration::from_secs(4),
        "Validation with a 1s deadline took {:?}",
        elapsed
    );
    drop(listener);
}

#[test]
fn test_slow_provider_does_not_hold_process() {
    let (dir, db, _job) = setup();
    let job = read_job(&write_linked_job(dir.path())).unwrap();
    let store = SqliteStore::new(&db).unwrap();
    let config = GraphExpertConfig {
        semantic_timeout_secs: 1,
        ..GraphExpertConfig::default()
    };
    let provider = MockProvider::new(r#"{"findings": []}"#).with_delay(Duration::from_secs(6));

    let start = Instant::now();
    let report = block_on_bounded(async {
        GraphExpert::new(config)
            .unwrap()
            .with_provider(provider)
            .validate(&store, &job)
            .await
    })
    .unwrap();

    assert_eq!(report.metadata.semantic_status, SemanticStatus::TimedOut);
    assert!(
        start.elapsed() < Duration::from_secs(3),
        "Runtime shutdown waited {:?} for the provider",
        start.elapsed()
    );
}
