mod prompts;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::dataset::{DatasetProfile, Row};
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::{LLMConfig, ResponseMode};
use crate::infrastructure::llm_clients::LLMClient;

use prompts::{
    build_insight_system_prompt, build_insight_user_prompt, build_narrative_system_prompt,
    build_narrative_user_prompt,
};

/// Produces the narrative and structured-insight artifacts through the
/// text-generation service. Responses are returned trimmed and otherwise
/// untouched; the JSON answer is not parsed here.
pub struct SummaryUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
}

impl SummaryUseCase {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>, config: LLMConfig) -> Self {
        Self { llm_client, config }
    }

    pub async fn narrative_summary(&self, rows: &[Row], profile: &DatasetProfile) -> Result<String> {
        let system_prompt = build_narrative_system_prompt();
        let user_prompt = build_narrative_user_prompt(rows, profile);
        self.generate("narrative", &system_prompt, &user_prompt, ResponseMode::FreeText)
            .await
    }

    pub async fn structured_insight(&self, profile: &DatasetProfile) -> Result<String> {
        let system_prompt = build_insight_system_prompt();
        let user_prompt = build_insight_user_prompt(profile);
        self.generate(
            "structured insight",
            &system_prompt,
            &user_prompt,
            ResponseMode::JsonObject,
        )
        .await
    }

    async fn generate(
        &self,
        label: &str,
        system_prompt: &str,
        user_prompt: &str,
        mode: ResponseMode,
    ) -> Result<String> {
        debug!(
            artifact = label,
            model = %self.config.model,
            prompt_chars = user_prompt.len(),
            "Requesting summary"
        );

        let raw_output = self
            .llm_client
            .generate(&self.config, system_prompt, user_prompt, mode)
            .await
            .map_err(|e| {
                warn!(artifact = label, error = %e, "Summary request failed");
                AppError::SummaryGeneration(format!("{} request failed: {}", label, e))
            })?;

        let text = raw_output.trim();
        if text.is_empty() {
            return Err(AppError::SummaryGeneration(format!(
                "{} response was empty",
                label
            )));
        }

        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::profiler::profile;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedClient {
        reply: std::result::Result<String, String>,
        calls: Mutex<Vec<(String, ResponseMode)>>,
    }

    impl ScriptedClient {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMClient for ScriptedClient {
        async fn generate(
            &self,
            _config: &LLMConfig,
            _system: &str,
            user: &str,
            mode: ResponseMode,
        ) -> Result<String> {
            self.calls.lock().unwrap().push((user.to_string(), mode));
            self.reply
                .clone()
                .map_err(AppError::GenerationService)
        }
    }

    fn amt_rows() -> Vec<Row> {
        ["10", "20", "x"]
            .iter()
            .map(|v| {
                let mut row = Row::new();
                row.insert("amt".to_string(), v.to_string());
                row
            })
            .collect()
    }

    #[tokio::test]
    async fn test_narrative_is_trimmed_and_free_text() {
        let client = Arc::new(ScriptedClient::replying("\n  Sales rose steadily.  \n"));
        let use_case = SummaryUseCase::new(client.clone(), LLMConfig::default());
        let rows = amt_rows();

        let text = use_case
            .narrative_summary(&rows, &profile(&rows))
            .await
            .unwrap();

        assert_eq!(text, "Sales rose steadily.");
        let calls = client.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, ResponseMode::FreeText);
        assert!(calls[0].0.contains("Row count: 3"));
    }

    #[tokio::test]
    async fn test_structured_insight_passes_through_unvalidated() {
        let client = Arc::new(ScriptedClient::replying("{\"insights\": [\"unterminated\""));
        let use_case = SummaryUseCase::new(client.clone(), LLMConfig::default());

        let text = use_case
            .structured_insight(&profile(&amt_rows()))
            .await
            .unwrap();

        assert_eq!(text, "{\"insights\": [\"unterminated\"");
        assert_eq!(client.calls.lock().unwrap()[0].1, ResponseMode::JsonObject);
    }

    #[tokio::test]
    async fn test_service_error_becomes_summary_error() {
        let client = Arc::new(ScriptedClient::failing("429 Too Many Requests"));
        let use_case = SummaryUseCase::new(client, LLMConfig::default());

        let result = use_case.structured_insight(&DatasetProfile::empty()).await;
        match result {
            Err(AppError::SummaryGeneration(msg)) => assert!(msg.contains("429")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blank_response_is_an_error() {
        let client = Arc::new(ScriptedClient::replying("   \n"));
        let use_case = SummaryUseCase::new(client, LLMConfig::default());

        let result = use_case.narrative_summary(&[], &DatasetProfile::empty()).await;
        assert!(matches!(result, Err(AppError::SummaryGeneration(_))));
    }
}
