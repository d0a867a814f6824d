// ============================================================
// DATASET PROFILE
// ============================================================
// Canonical statistical view of one decoded input file

use super::ColumnStat;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Row count plus statistics for every column holding numeric values.
///
/// `numeric_cols` keeps the order in which columns appear in the source
/// header. It only holds columns with at least one parsed value, and it is
/// empty whenever `row_count` is zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetProfile {
    pub row_count: usize,
    pub numeric_cols: IndexMap<String, ColumnStat>,
}

impl DatasetProfile {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Deterministic JSON rendering used when embedding the profile in prompts
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
