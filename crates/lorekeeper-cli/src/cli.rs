//! CLI command definitions and argument parsing.

use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use lorekeeper_llm::ollama::DEFAULT_ENDPOINT;
use std::path::PathBuf;

/// Lorekeeper CLI - Validate campaign knowledge graphs against their ontology.
#[derive(Debug, Parser)]
#[command(name = "lorekeeper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate one analysis job against a campaign database
    Validate(ValidateArgs),

    /// Print a configuration preset as TOML
    Config(ConfigArgs),
}

/// Arguments for the validate command.
#[derive(Debug, Parser)]
pub struct ValidateArgs {
    /// SQLite campaign database
    #[arg(long, env = "LOREKEEPER_DB")]
    pub db: PathBuf,

    /// Job context JSON file ("-" for stdin)
    #[arg(long)]
    pub job: PathBuf,

    /// Graph expert configuration (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Skip the semantic check regardless of configuration
    #[arg(long)]
    pub structural_only: bool,

    /// Ollama model for the semantic check; without it the check is skipped
    #[arg(long, env = "LOREKEEPER_OLLAMA_MODEL")]
    pub ollama_model: Option<String>,

    /// Ollama endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub ollama_endpoint: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Preset to print
    #[arg(short, long, value_enum, default_value = "default")]
    pub preset: PresetArg,
}

/// Configuration presets.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    /// All checks, standard budgets
    Default,
    /// Structural checks only
    StructuralOnly,
    /// All checks, longer deadline and larger budgets
    Thorough,
}

impl From<PresetArg> for lorekeeper_graph_expert::GraphExpertConfig {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Default => Self::default(),
            PresetArg::StructuralOnly => Self::structural_only(),
            PresetArg::Thorough => Self::thorough(),
        }
    }
}
