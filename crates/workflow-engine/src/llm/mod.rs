//! Language-model capability
//!
//! The engine needs one thing from a model: turn a prompt into text.
//! [`LanguageModel`] is that seam; [`OpenAiClient`] talks to any
//! OpenAI-compatible `/chat/completions` endpoint and [`MockModel`] is a
//! deterministic stand-in for tests and offline runs.

pub mod config;
pub mod mock;
pub mod openai;
pub mod provider;

pub use config::{LlmConfig, ProviderKind};
pub use mock::MockModel;
pub use openai::OpenAiClient;
pub use provider::{LanguageModel, ProviderError};
