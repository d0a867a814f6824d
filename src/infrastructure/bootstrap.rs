use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::application::{PipelineUseCase, SummaryUseCase};
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::llm_clients::{LLMClient, RouterClient};
use crate::infrastructure::storage::{BucketStores, ObjectStorage};

/// Wire storage, the LLM router and the pipeline from loaded configuration.
pub fn build_pipeline(config: &AppConfig) -> Result<Arc<PipelineUseCase>> {
    let mut buckets = vec![config.output.bucket.as_str()];
    if let Some(input) = config.input.bucket.as_deref() {
        buckets.push(input);
    }

    let storage: Arc<dyn ObjectStorage + Send + Sync> =
        Arc::new(BucketStores::from_config(&config.storage, &buckets)?);
    let llm_client: Arc<dyn LLMClient + Send + Sync> = Arc::new(RouterClient::with_timeout(
        Duration::from_secs(config.server.llm_timeout_secs),
    ));

    info!(
        backend = ?config.storage.backend,
        output_bucket = %config.output.bucket,
        output_prefix = %config.output.prefix,
        provider = ?config.llm.provider,
        model = %config.llm.model,
        "Pipeline configured"
    );

    Ok(Arc::new(PipelineUseCase::new(
        storage,
        SummaryUseCase::new(llm_client, config.llm.clone()),
        config.output.bucket.clone(),
        config.output.prefix.clone(),
    )))
}
