//! Validate command implementation.

use crate::cli::ValidateArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use lorekeeper_domain::traits::CompletionProvider;
use lorekeeper_domain::JobContext;
use lorekeeper_graph_expert::{GraphExpert, GraphExpertConfig};
use lorekeeper_llm::OllamaProvider;
use lorekeeper_store::SqliteStore;
use std::fmt::Display;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Run one validation job and format the report.
pub async fn execute_validate(args: ValidateArgs, formatter: &Formatter) -> Result<String> {
    let mut config = load_config(args.config.as_deref())?;
    if args.structural_only {
        config.check_semantic = false;
    }

    let job = read_job(&args.job)?;
    let store = SqliteStore::new(&args.db)?;

    let report = match args.ollama_model {
        Some(model) if config.check_semantic => {
            info!("Semantic check via Ollama model {} at {}", model, args.ollama_endpoint);
            // A single attempt, so the request ends with the semantic deadline
            let provider = OllamaProvider::new(args.ollama_endpoint, model)
                .with_max_retries(1)
                .with_timeout(config.semantic_timeout());
            expert(config)?
                .with_provider(provider)
                .validate(&store, &job)
                .await
        }
        _ => expert::<OllamaProvider>(config)?.validate(&store, &job).await,
    };

    formatter.format_report(&report, args.pretty)
}

fn expert<L>(config: GraphExpertConfig) -> Result<GraphExpert<L>>
where
    L: CompletionProvider + Send + Sync + 'static,
    L::Error: Display,
{
    GraphExpert::new(config).map_err(|e| CliError::Config(e.to_string()))
}

/// Load and validate a configuration file, or use the defaults.
pub fn load_config(path: Option<&Path>) -> Result<GraphExpertConfig> {
    let config = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path).map_err(|source| CliError::Read {
                path: path.display().to_string(),
                source,
            })?;
            GraphExpertConfig::from_toml(&contents).map_err(CliError::Config)?
        }
        None => GraphExpertConfig::default(),
    };

    config.validate().map_err(CliError::Config)?;
    Ok(config)
}

/// Read a job context from a JSON file, or stdin for `-`.
pub fn read_job(path: &Path) -> Result<JobContext> {
    let read_error = |source| CliError::Read {
        path: path.display().to_string(),
        source,
    };

    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map_err(read_error)?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(read_error)?
    };

    serde_json::from_str(&contents).map_err(|e| {
        CliError::InvalidInput(format!("{} is not a job context: {}", path.display(), e))
    })
}
