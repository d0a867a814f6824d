// ============================================================
// COLUMN STATISTICS
// ============================================================
// Aggregates over the values of one column that parsed as numbers

use serde::{Deserialize, Serialize};

/// Statistics for a single numeric column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStat {
    /// Number of values that parsed (not the number of rows)
    pub count: usize,

    /// Arithmetic sum of parsed values, saturated at `±f64::MAX`
    pub sum: f64,

    /// sum / count
    pub avg: f64,

    /// Smallest parsed value
    pub min: f64,

    /// Largest parsed value
    pub max: f64,
}

impl ColumnStat {
    /// Build statistics from parsed values.
    /// Returns `None` when there is nothing to aggregate.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let (&first, rest) = values.split_first()?;

        let mut sum = first;
        let mut min = first;
        let mut max = first;
        for &value in rest {
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        let count = values.len();
        let (sum, avg) = if sum.is_finite() {
            (sum, sum / count as f64)
        } else {
            // Overflowed: the mean of finite values is still finite
            let avg: f64 = values.iter().map(|value| value / count as f64).sum();
            (sum.clamp(f64::MIN, f64::MAX), avg)
        };

        Some(Self {
            count,
            sum,
            avg,
            min,
            max,
        })
    }
}
