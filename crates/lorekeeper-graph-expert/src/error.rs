//! Error types for the graph expert

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur inside a single checker
///
/// None of these escape [`crate::GraphExpert::validate`]; each is absorbed by
/// the phase that produced it.
#[derive(Error, Debug)]
pub enum GraphExpertError {
    /// Graph store query failed
    #[error("Store error: {0}")]
    Store(String),

    /// Completion provider failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// Completion call exceeded its deadline
    #[error("Semantic check timed out after {0:?}")]
    Timeout(Duration),

    /// Provider text did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GraphExpertError {
    /// Wrap a store error
    pub(crate) fn store(context: &str, err: impl std::fmt::Display) -> Self {
        GraphExpertError::Store(format!("{}: {}", context, err))
    }
}

impl From<serde_json::Error> for GraphExpertError {
    fn from(e: serde_json::Error) -> Self {
        GraphExpertError::InvalidResponse(format!("JSON parse error: {}", e))
    }
}
