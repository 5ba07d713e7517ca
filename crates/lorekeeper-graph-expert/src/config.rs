//! Configuration for the graph expert

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a validation run
///
/// Rules themselves are campaign data and are always read fresh from the
/// store; this only controls which checks run and how the semantic check
/// talks to its provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphExpertConfig {
    /// Report entities with no edges
    #[serde(default = "default_true")]
    pub check_orphans: bool,

    /// Check proposed edges against allowed type pairs
    #[serde(default = "default_true")]
    pub check_domain_range: bool,

    /// Check persisted and proposed edge counts against limits
    #[serde(default = "default_true")]
    pub check_cardinality: bool,

    /// Report entities missing a required relationship
    #[serde(default = "default_true")]
    pub check_required: bool,

    /// Ask the completion provider for redundant and implied edges
    #[serde(default = "default_true")]
    pub check_semantic: bool,

    /// Drop findings the GM has acknowledged
    #[serde(default = "default_true")]
    pub apply_overrides: bool,

    /// Deadline for the completion call (seconds)
    pub semantic_timeout_secs: u64,

    /// Token budget for the completion response
    pub semantic_max_tokens: u32,

    /// Sampling temperature for the completion call
    pub semantic_temperature: f32,

    /// Suggestion justifications longer than this are truncated in the prompt
    pub justification_max_chars: usize,

    /// At most this many existing relationships are listed in the prompt
    pub max_prompt_relationships: usize,
}

fn default_true() -> bool {
    true
}

impl GraphExpertConfig {
    /// Get the semantic timeout as a Duration
    pub fn semantic_timeout(&self) -> Duration {
        Duration::from_secs(self.semantic_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.semantic_timeout_secs == 0 {
            return Err("semantic_timeout_secs must be greater than 0".to_string());
        }
        if self.semantic_max_tokens == 0 {
            return Err("semantic_max_tokens must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.semantic_temperature) {
            return Err("semantic_temperature must be within [0.0, 2.0]".to_string());
        }
        if self.justification_max_chars == 0 {
            return Err("justification_max_chars must be greater than 0".to_string());
        }
        if self.max_prompt_relationships == 0 {
            return Err("max_prompt_relationships must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Structural checks only; the provider is never called
    pub fn structural_only() -> Self {
        Self {
            check_semantic: false,
            ..Self::default()
        }
    }

    /// Longer deadline and larger prompt budgets
    pub fn thorough() -> Self {
        Self {
            semantic_timeout_secs: 180,
            semantic_max_tokens: 4096,
            justification_max_chars: 400,
            max_prompt_relationships: 500,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for GraphExpertConfig {
    fn default() -> Self {
        Self {
            check_orphans: true,
            check_domain_range: true,
            check_cardinality: true,
            check_required: true,
            check_semantic: true,
            apply_overrides: true,
            semantic_timeout_secs: 60,
            semantic_max_tokens: 2048,
            semantic_temperature: 0.2,
            justification_max_chars: 200,
            max_prompt_relationships: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(GraphExpertConfig::default().validate().is_ok());
        assert!(GraphExpertConfig::structural_only().validate().is_ok());
        assert!(GraphExpertConfig::thorough().validate().is_ok());
    }

    #[test]
    fn test_structural_only_disables_semantic() {
        let config = GraphExpertConfig::structural_only();
        assert!(!config.check_semantic);
        assert!(config.check_cardinality);
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = GraphExpertConfig::default();
        config.semantic_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_temperature() {
        let mut config = GraphExpertConfig::default();
        config.semantic_temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = GraphExpertConfig::thorough();
        let toml_str = config.to_toml().unwrap();
        let parsed = GraphExpertConfig::from_toml(&toml_str).unwrap();

        assert_eq!(parsed.semantic_timeout_secs, 180);
        assert_eq!(parsed.semantic_max_tokens, 4096);
        assert_eq!(parsed.max_prompt_relationships, 500);
    }

    #[test]
    fn test_toml_check_flags_default_on() {
        let toml_str = r#"
            semantic_timeout_secs = 30
            semantic_max_tokens = 1024
            semantic_temperature = 0.0
            justification_max_chars = 100
            max_prompt_relationships = 50
            check_semantic = false
        "#;

        let config = GraphExpertConfig::from_toml(toml_str).unwrap();
        assert!(!config.check_semantic);
        assert!(config.check_orphans);
        assert!(config.apply_overrides);
        assert_eq!(config.semantic_timeout(), Duration::from_secs(30));
    }
}
