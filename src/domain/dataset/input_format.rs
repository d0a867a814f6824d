// ============================================================
// INPUT FORMAT
// ============================================================
// Which row decoder applies to an input object

use crate::domain::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported tabular input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Delimited text with a header row (`.csv`)
    Delimited,

    /// First sheet of an Office Open XML workbook (`.xlsx`)
    Spreadsheet,
}

impl InputFormat {
    /// Select the format from an object key's file extension.
    pub fn from_key(key: &str) -> Result<Self> {
        let file_name = key.rsplit('/').next().unwrap_or(key);
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Delimited),
            "xlsx" => Ok(Self::Spreadsheet),
            _ => Err(AppError::UnsupportedFormat(format!(
                "Unsupported file type for key '{}'",
                key
            ))),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delimited => write!(f, "delimited"),
            Self::Spreadsheet => write!(f, "spreadsheet"),
        }
    }
}

impl std::str::FromStr for InputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "delimited" | "csv" => Ok(Self::Delimited),
            "spreadsheet" | "xlsx" => Ok(Self::Spreadsheet),
            _ => Err(AppError::UnsupportedFormat(format!(
                "Unknown input format: {}",
                s
            ))),
        }
    }
}
