//! Output artifacts and the naming convention for their object keys.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_OUTPUT_PREFIX: &str = "summaries";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactKind {
    /// Free-text analysis of the dataset
    Narrative,

    /// JSON document with insights, trends, anomalies and recommendations
    StructuredInsight,

    /// Flattened per-column statistics table
    StatsTable,
}

impl ArtifactKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Narrative => "txt",
            ArtifactKind::StructuredInsight => "json",
            ArtifactKind::StatsTable => "csv",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Narrative => write!(f, "narrative"),
            Self::StructuredInsight => write!(f, "structured_insight"),
            Self::StatsTable => write!(f, "stats_table"),
        }
    }
}

/// A derived artifact. Built once per run and handed to storage as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub kind: ArtifactKind,
    pub payload: String,
}

impl OutputArtifact {
    pub fn new(kind: ArtifactKind, payload: String) -> Self {
        Self { kind, payload }
    }
}

/// Base name of an input key: the final path segment cut at its first `.`.
///
/// `folder/report.2024.xlsx` yields `report`.
pub fn base_name(key: &str) -> &str {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    file_name.split('.').next().unwrap_or(file_name)
}

/// Output keys for every artifact derived from one input key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    prefix: String,
    base_name: String,
}

impl OutputNaming {
    pub fn new(input_key: &str, prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_matches('/').to_string(),
            base_name: base_name(input_key).to_string(),
        }
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn key_for(&self, kind: ArtifactKind) -> String {
        if self.prefix.is_empty() {
            format!("{}.{}", self.base_name, kind.extension())
        } else {
            format!("{}/{}.{}", self.prefix, self.base_name, kind.extension())
        }
    }
}
