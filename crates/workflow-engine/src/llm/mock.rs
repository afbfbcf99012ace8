//! Deterministic model for tests and offline runs

use async_trait::async_trait;

use super::provider::{LanguageModel, ProviderError};

/// Echoes the prompt as `"[MOCK] Response to: {prompt}"`
#[derive(Debug, Clone, Copy, Default)]
pub struct MockModel;

impl MockModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        Ok(format!("[MOCK] Response to: {}", prompt))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
