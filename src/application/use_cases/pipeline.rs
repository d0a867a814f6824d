//! One pipeline run per trigger record:
//! fetch, decode, profile, generate the three artifacts concurrently, then
//! write all three. The first failure ends the run; nothing is retried or
//! cleaned up here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::application::use_cases::profiler;
use crate::application::use_cases::stats_export::export_table;
use crate::application::use_cases::summary::SummaryUseCase;
use crate::domain::artifact::{ArtifactKind, OutputArtifact, OutputNaming};
use crate::domain::dataset::InputFormat;
use crate::domain::error::Result;
use crate::domain::trigger::TriggerRecord;
use crate::infrastructure::decoders;
use crate::infrastructure::storage::ObjectStorage;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub run_id: String,
    pub bucket: String,
    pub input_key: String,
    pub base_name: String,
    pub format: InputFormat,
    pub row_count: usize,
    pub numeric_columns: usize,
    pub output_bucket: String,
    pub output_keys: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

pub struct PipelineUseCase {
    storage: Arc<dyn ObjectStorage + Send + Sync>,
    summaries: SummaryUseCase,
    output_bucket: String,
    output_prefix: String,
}

impl PipelineUseCase {
    pub fn new(
        storage: Arc<dyn ObjectStorage + Send + Sync>,
        summaries: SummaryUseCase,
        output_bucket: String,
        output_prefix: String,
    ) -> Self {
        Self {
            storage,
            summaries,
            output_bucket,
            output_prefix,
        }
    }

    pub async fn execute(&self, record: &TriggerRecord) -> Result<PipelineReport> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("pipeline", run_id = %run_id, bucket = %record.bucket, key = %record.key);
        self.run(run_id, record).instrument(span).await
    }

    async fn run(&self, run_id: String, record: &TriggerRecord) -> Result<PipelineReport> {
        // Rejected before any storage or generation call.
        let format = InputFormat::from_key(&record.key)?;
        let naming = OutputNaming::new(&record.key, &self.output_prefix);

        info!(format = %format, base_name = naming.base_name(), "Processing input object");

        let payload = self.storage.get(&record.bucket, &record.key).await?;
        let rows = decoders::decode(format, &payload)?;
        let profile = profiler::profile(&rows);

        info!(
            rows = profile.row_count,
            numeric_columns = profile.numeric_cols.len(),
            "Profiled dataset"
        );

        let (narrative, insight, table) = tokio::try_join!(
            self.summaries.narrative_summary(&rows, &profile),
            self.summaries.structured_insight(&profile),
            async { export_table(&profile) },
        )?;

        let artifacts = [
            OutputArtifact::new(ArtifactKind::Narrative, narrative),
            OutputArtifact::new(ArtifactKind::StructuredInsight, insight),
            OutputArtifact::new(ArtifactKind::StatsTable, table),
        ];
        let output_keys = self.persist(&naming, &artifacts).await?;

        info!(outputs = ?output_keys, "Pipeline completed");

        Ok(PipelineReport {
            run_id,
            bucket: record.bucket.clone(),
            input_key: record.key.clone(),
            base_name: naming.base_name().to_string(),
            format,
            row_count: profile.row_count,
            numeric_columns: profile.numeric_cols.len(),
            output_bucket: self.output_bucket.clone(),
            output_keys,
            completed_at: Utc::now(),
        })
    }

    /// Every write is attempted; the run fails if any of them failed.
    async fn persist(
        &self,
        naming: &OutputNaming,
        artifacts: &[OutputArtifact; 3],
    ) -> Result<Vec<String>> {
        let [narrative, insight, table] = artifacts;
        let (narrative_result, insight_result, table_result) = tokio::join!(
            self.write(naming, narrative),
            self.write(naming, insight),
            self.write(naming, table),
        );

        let mut output_keys = Vec::with_capacity(artifacts.len());
        let mut first_error = None;
        for result in [narrative_result, insight_result, table_result] {
            match result {
                Ok(key) => output_keys.push(key),
                Err(e) => {
                    error!(error = %e, "Failed to write artifact");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(output_keys),
        }
    }

    async fn write(&self, naming: &OutputNaming, artifact: &OutputArtifact) -> Result<String> {
        let key = naming.key_for(artifact.kind);
        self.storage
            .put(&self.output_bucket, &key, artifact.payload.clone().into_bytes())
            .await?;
        info!(artifact = %artifact.kind, key = %key, "Wrote artifact");
        Ok(key)
    }
}
