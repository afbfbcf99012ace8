//! # Configuration Module
//!
//! Loads the CLI's settings from the environment (and an optional `.env`
//! file) into the engine's and provider's configuration types.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use workflow_engine::{LlmConfig, PregelConfig, ProviderKind};

/// Default directory for the file-backed workflow store
pub const DEFAULT_STORE_DIR: &str = "./workflows";

// =============================================================================
// CONFIGURATION STRUCT
// =============================================================================
/// Main configuration for the workflow CLI.
#[derive(Debug, Clone)]
pub struct Config {
    /// Language-model provider settings
    pub llm: LlmConfig,

    /// Superstep engine settings
    pub engine: PregelConfig,

    /// Where saved workflows live
    pub store_dir: PathBuf,

    /// `RUST_LOG` filter directive, if set
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            engine: PregelConfig::default(),
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            log_filter: None,
        }
    }
}

// =============================================================================
// CONFIGURATION LOADING
// =============================================================================
impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// Unset variables keep their defaults; malformed values are errors.
    ///
    /// # Example
    /// ```ignore
    /// let config = Config::from_env()?;
    /// println!("Using model: {}", config.llm.model);
    /// ```
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(val) = var("LLM_PROVIDER") {
            config.llm.provider = val
                .parse::<ProviderKind>()
                .context("LLM_PROVIDER must be 'openai' or 'mock'")?;
        }

        if let Some(val) = var("LLM_API_KEY") {
            config.llm.api_key = Some(val);
        }

        if let Some(val) = var("LLM_MODEL") {
            config.llm.model = val;
        }

        if let Some(val) = var("LLM_BASE_URL") {
            config.llm.base_url = val;
        }

        if let Some(val) = var("LLM_MAX_TOKENS") {
            config.llm.max_tokens = val
                .parse()
                .context("LLM_MAX_TOKENS must be a valid positive integer")?;
        }

        if let Some(val) = var("LLM_TIMEOUT_SECS") {
            let secs: u64 = val
                .parse()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?;
            config.llm.timeout = Duration::from_secs(secs);
        }

        if let Some(val) = var("MAX_SUPERSTEPS") {
            config.engine.max_supersteps = val
                .parse()
                .context("MAX_SUPERSTEPS must be a valid positive integer")?;
        }

        if let Some(val) = var("WORKFLOW_PARALLELISM") {
            let parallelism: usize = val
                .parse()
                .context("WORKFLOW_PARALLELISM must be a valid positive integer")?;
            config.engine = config.engine.with_parallelism(parallelism);
        }

        if let Some(val) = var("WORKFLOW_STORE_DIR") {
            config.store_dir = PathBuf::from(val);
        }

        config.log_filter = var("RUST_LOG");

        Ok(config)
    }

    /// Validate the settings needed to execute workflows.
    ///
    /// Store-only commands (save, list, show, graph) skip this.
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            anyhow::bail!("LLM_MODEL cannot be empty");
        }

        if self.llm.max_tokens == 0 {
            anyhow::bail!("LLM_MAX_TOKENS must be at least 1");
        }

        if self.engine.max_supersteps == 0 {
            anyhow::bail!("MAX_SUPERSTEPS must be at least 1");
        }

        let has_key = self
            .llm
            .api_key
            .as_deref()
            .is_some_and(|key| !key.is_empty());
        if self.llm.provider == ProviderKind::OpenAi && !has_key {
            anyhow::bail!("LLM_API_KEY (or --api-key, or the workflow's openai_api_key) is required for the openai provider; use --mock to run offline");
        }

        Ok(())
    }
}
