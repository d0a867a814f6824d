use super::{endpoint, LLMClient};
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::{LLMConfig, LLMProvider, ResponseMode};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAIClient {
    client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn build_body(config: &LLMConfig, system: &str, user: &str, mode: ResponseMode) -> serde_json::Value {
        let mut body = json!({
            "model": config.model,
            "messages": [
                {
                    "role": "system",
                    "content": system
                },
                {
                    "role": "user",
                    "content": user
                }
            ],
            "max_tokens": config.max_tokens,
            "temperature": config.temperature,
        });

        if mode == ResponseMode::JsonObject {
            body["response_format"] = json!({ "type": "json_object" });
        }

        body
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate(
        &self,
        config: &LLMConfig,
        system: &str,
        user: &str,
        mode: ResponseMode,
    ) -> Result<String> {
        let url = endpoint(&config.base_url, "chat/completions");
        let body = Self::build_body(config, system, user, mode);

        let mut request = self.client.post(&url).json(&body);
        match (&config.api_key, &config.provider) {
            (Some(api_key), _) => request = request.bearer_auth(api_key),
            (None, LLMProvider::Local) => {}
            (None, _) => {
                return Err(AppError::GenerationService(
                    "Missing API key for OpenAI provider".to_string(),
                ))
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::GenerationService(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::GenerationService(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::GenerationService(format!("Failed to parse JSON: {}", e)))?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::GenerationService("Invalid response format".to_string()))
    }
}
