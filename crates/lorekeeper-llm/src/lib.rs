//! Lorekeeper LLM Provider Layer
//!
//! Implementations of the `CompletionProvider` trait from `lorekeeper-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use lorekeeper_llm::MockProvider;
//! use lorekeeper_domain::traits::{CompletionProvider, CompletionRequest};
//!
//! let provider = MockProvider::new(r#"{"findings": []}"#);
//! let request = CompletionRequest {
//!     system_prompt: "You are a graph expert.".to_string(),
//!     user_prompt: "Check this graph.".to_string(),
//!     max_tokens: 512,
//!     temperature: 0.2,
//! };
//! assert_eq!(provider.complete(&request).unwrap(), r#"{"findings": []}"#);
//! ```

#![warn(missing_docs)]

pub mod ollama;

use lorekeeper_domain::traits::{CompletionProvider, CompletionRequest};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error,
}

/// Mock completion provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Replies are keyed by user prompt; anything else gets the default.
///
/// # Examples
///
/// ```
/// use lorekeeper_llm::MockProvider;
/// use lorekeeper_domain::traits::{CompletionProvider, CompletionRequest};
///
/// let mut provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
///
/// let request = CompletionRequest {
///     system_prompt: String::new(),
///     user_prompt: "prompt1".to_string(),
///     max_tokens: 16,
///     temperature: 0.0,
/// };
/// assert_eq!(provider.complete(&request).unwrap(), "response1");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_reply: MockReply,
    responses: Arc<Mutex<HashMap<String, MockReply>>>,
    call_count: Arc<Mutex<usize>>,
    last_request: Arc<Mutex<Option<CompletionRequest>>>,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_reply: MockReply::Text(response.into()),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_request: Arc::new(Mutex::new(None)),
            delay: None,
        }
    }

    /// Create a MockProvider that fails every call
    pub fn failing() -> Self {
        Self {
            default_reply: MockReply::Error,
            ..Self::default()
        }
    }

    /// Sleep for `delay` before answering (for exercising timeouts)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add a specific response for a given user prompt
    pub fn add_response(&mut self, user_prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(user_prompt.into(), MockReply::Text(response.into()));
    }

    /// Configure to return an error for a specific user prompt
    pub fn add_error(&mut self, user_prompt: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(user_prompt.into(), MockReply::Error);
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl CompletionProvider for MockProvider {
    type Error = LlmError;

    fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap() += 1;
        *self.last_request.lock().unwrap() = Some(request.clone());

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let reply = self
            .responses
            .lock()
            .unwrap()
            .get(&request.user_prompt)
            .cloned()
            .unwrap_or_else(|| self.default_reply.clone());

        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Error => Err(LlmError::Other("Mock error".to_string())),
        }
    }
}
