//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API.
//!
//! # Features
//!
//! - Blocking HTTP communication with Ollama's `/api/generate`
//! - System prompt, token budget and temperature passed through as options
//! - Retry logic with exponential backoff
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use lorekeeper_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3");
//! ```

use crate::LlmError;
use lorekeeper_domain::traits::{CompletionProvider, CompletionRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for a single HTTP request (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama API provider for local LLM inference
///
/// A blocking client is built per call, so the provider itself can be
/// created and dropped from async code and only `complete` needs a thread
/// that may block.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    timeout: Duration,
    max_retries: u32,
}

#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Create a new Ollama provider against `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the per-request HTTP timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Model name requests are sent to
    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> Result<reqwest::blocking::Client, LlmError> {
        reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))
    }
}

impl CompletionProvider for OllamaProvider {
    type Error = LlmError;

    /// Generate a completion
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running
    /// - Model is not available
    /// - Network communication fails after all retries
    /// - Response format is invalid
    fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        let url = format!("{}/api/generate", self.endpoint);
        let client = self.client()?;

        let body = OllamaGenerateRequest {
            model: &self.model,
            system: &request.system_prompt,
            prompt: &request.user_prompt,
            stream: false,
            options: OllamaOptions {
                num_predict: request.max_tokens,
                temperature: request.temperature,
            },
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match client.post(&url).json(&body).send() {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<OllamaGenerateResponse>()
                        .map(|r| {
                            debug!("Ollama returned {} chars", r.response.len());
                            r.response
                        })
                        .map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                        });
                }
                Ok(response) if response.status() == reqwest::StatusCode::NOT_FOUND => {
                    return Err(LlmError::ModelNotAvailable(self.model.clone()));
                }
                Ok(response) if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    last_error = Some(LlmError::RateLimitExceeded);
                }
                Ok(response) => {
                    let status = response.status();
                    let error_text = response
                        .text()
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    last_error = Some(LlmError::Communication(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("Ollama attempt {} failed, retrying in {:?}", attempts, delay);
                std::thread::sleep(delay);
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llama3");
        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(provider.model(), "llama3");
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_ollama_provider_default_endpoint() {
        let provider = OllamaProvider::default_endpoint("mistral");
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model, "mistral");
    }

    #[test]
    fn test_ollama_provider_builders() {
        let provider = OllamaProvider::new("http://localhost:11434", "llama3")
            .with_max_retries(0)
            .with_timeout(Duration::from_secs(5));
        assert_eq!(provider.max_retries, 1);
        assert_eq!(provider.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_request_body_shape() {
        let body = OllamaGenerateRequest {
            model: "llama3",
            system: "sys",
            prompt: "user",
            stream: false,
            options: OllamaOptions {
                num_predict: 256,
                temperature: 0.5,
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["system"], "sys");
        assert_eq!(json["options"]["num_predict"], 256);
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_ollama_error_handling() {
        // Port 1 is never an Ollama server
        let provider = OllamaProvider::new("http://127.0.0.1:1", "llama3")
            .with_max_retries(1)
            .with_timeout(Duration::from_secs(2));

        let request = CompletionRequest {
            system_prompt: String::new(),
            user_prompt: "test".to_string(),
            max_tokens: 8,
            temperature: 0.0,
        };

        match provider.complete(&request) {
            Err(LlmError::Communication(_)) => {}
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }

    #[test]
    #[ignore] // Only run when Ollama is available
    fn test_ollama_complete_integration() {
        let provider = OllamaProvider::default_endpoint("llama3");
        let request = CompletionRequest {
            system_prompt: "Answer tersely.".to_string(),
            user_prompt: "Say 'hello' and nothing else".to_string(),
            max_tokens: 16,
            temperature: 0.0,
        };

        if let Ok(response) = provider.complete(&request) {
            assert!(!response.is_empty());
        }
    }
}
