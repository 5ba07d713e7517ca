//! Command implementations.

mod config;
mod validate;

pub use config::execute_config;
pub use validate::{execute_validate, load_config, read_job};
