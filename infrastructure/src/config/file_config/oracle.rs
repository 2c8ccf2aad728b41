//! Oracle (language model) configuration (`[oracle]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOracleConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
    /// Extra attempts after a transient failure.
    pub max_retries: u32,
    /// Backoff before the first retry; doubles on each further retry.
    pub backoff_ms: u64,
}

impl Default for FileOracleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            timeout_secs: 30,
            temperature: 0.1,
            max_retries: 2,
            backoff_ms: 500,
        }
    }
}

impl FileOracleConfig {
    /// API key from the config file, or else from `api_key_env`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_key_wins() {
        let config = FileOracleConfig {
            api_key: Some("sk-file".to_string()),
            api_key_env: "MEMBER_QA_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-file"));
    }

    #[test]
    fn test_missing_key() {
        let config = FileOracleConfig {
            api_key: Some("  ".to_string()),
            api_key_env: "MEMBER_QA_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert!(config.resolve_api_key().is_none());
    }
}
