//! Flattened statistics table.
//!
//! Layout: the fixed header, a sentinel row carrying the dataset row count,
//! then one row per numeric column in profile order.

use csv::{Terminator, WriterBuilder};

use crate::domain::dataset::DatasetProfile;
use crate::domain::error::{AppError, Result};

pub const STATS_HEADER: [&str; 6] = ["Column", "Count", "Sum", "Avg", "Min", "Max"];

/// `Column` value of the row that carries the total row count
pub const ROW_COUNT_SENTINEL: &str = "__ROWCOUNT__";

pub fn export_table(profile: &DatasetProfile) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(STATS_HEADER).map_err(write_error)?;
    writer
        .write_record([
            ROW_COUNT_SENTINEL,
            &profile.row_count.to_string(),
            "",
            "",
            "",
            "",
        ])
        .map_err(write_error)?;

    for (column, stat) in &profile.numeric_cols {
        writer
            .write_record([
                column.as_str(),
                &stat.count.to_string(),
                &format_number(stat.sum),
                &format_number(stat.avg),
                &format_number(stat.min),
                &format_number(stat.max),
            ])
            .map_err(write_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush stats table: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(format!("Stats table is not valid UTF-8: {}", e)))
}

/// Shortest decimal text that reads back to the same value (`30`, `2.5`).
fn format_number(value: f64) -> String {
    value.to_string()
}

fn write_error(err: csv::Error) -> AppError {
    AppError::Internal(format!("Failed to write stats table: {}", err))
}
