//! Provider configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::mock::MockModel;
use super::openai::OpenAiClient;
use super::provider::{LanguageModel, ProviderError};

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Which language-model implementation to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Mock,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Mock => "mock",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(ProviderError::NotConfigured(format!(
                "unsupported provider '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language-model provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl LlmConfig {
    /// Mock provider configuration
    pub fn mock() -> Self {
        Self {
            provider: ProviderKind::Mock,
            ..Default::default()
        }
    }

    /// Same settings with a different API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Build the configured model
    pub fn build_model(&self) -> Result<Arc<dyn LanguageModel>, ProviderError> {
        match self.provider {
            ProviderKind::OpenAi => Ok(Arc::new(OpenAiClient::from_config(self)?)),
            ProviderKind::Mock => Ok(Arc::new(MockModel::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" MOCK ".parse::<ProviderKind>().unwrap(), ProviderKind::Mock);
        assert!("anthropic".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_build_model() {
        let mock = LlmConfig::mock().build_model().unwrap();
        assert_eq!(mock.name(), "mock");

        assert!(LlmConfig::default().build_model().is_err());

        let openai = LlmConfig::default().with_api_key("sk-test").build_model().unwrap();
        assert_eq!(openai.name(), "gpt-4");
    }

    #[test]
    fn test_humantime_timeout_serde() {
        let config: LlmConfig =
            serde_json::from_str(r#"{"provider": "mock", "timeout": "90s"}"#).unwrap();
        assert_eq!(config.provider, ProviderKind::Mock);
        assert_eq!(config.timeout, Duration::from_secs(90));
        assert_eq!(config.model, "gpt-4");

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["timeout"], "1m 30s");
    }
}
