// ============================================================
// DATASET DOMAIN LAYER
// ============================================================
// Rows, numeric column statistics and the dataset profile
// No I/O, no async

mod column_stat;
mod input_format;
mod profile;

pub use column_stat::ColumnStat;
pub use input_format::InputFormat;
pub use profile::DatasetProfile;

use indexmap::IndexMap;

/// One decoded record: column name to raw cell text, in header order.
pub type Row = IndexMap<String, String>;
