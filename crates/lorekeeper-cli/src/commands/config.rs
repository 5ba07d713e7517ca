//! Config command implementation.

use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use lorekeeper_graph_expert::GraphExpertConfig;

/// Render the chosen preset as TOML.
pub fn execute_config(args: ConfigArgs) -> Result<String> {
    let config: GraphExpertConfig = args.preset.into();
    config.to_toml().map_err(CliError::Config)
}
