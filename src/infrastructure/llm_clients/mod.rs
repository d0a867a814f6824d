pub mod gemini;
pub mod openai;

use crate::domain::error::Result;
use crate::domain::llm_config::{LLMConfig, LLMProvider, ResponseMode};
use async_trait::async_trait;
use gemini::GeminiClient;
use openai::OpenAIClient;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[async_trait]
pub trait LLMClient {
    /// Send one prompt and return the raw text of the first completion.
    async fn generate(
        &self,
        config: &LLMConfig,
        system: &str,
        user: &str,
        mode: ResponseMode,
    ) -> Result<String>;
}

pub struct RouterClient {
    openai: OpenAIClient,
    gemini: GeminiClient,
}

impl RouterClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            openai: OpenAIClient::new(timeout),
            gemini: GeminiClient::new(timeout),
        }
    }
}

impl Default for RouterClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for RouterClient {
    async fn generate(
        &self,
        config: &LLMConfig,
        system: &str,
        user: &str,
        mode: ResponseMode,
    ) -> Result<String> {
        match config.provider {
            LLMProvider::Google => self.gemini.generate(config, system, user, mode).await,
            _ => self.openai.generate(config, system, user, mode).await,
        }
    }
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    if base_url.ends_with('/') {
        format!("{}{}", base_url, path)
    } else {
        format!("{}/{}", base_url, path)
    }
}
