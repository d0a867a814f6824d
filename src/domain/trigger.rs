//! Object-created notifications and object key decoding.

use crate::domain::error::{AppError, Result};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

/// One `(bucket, key)` pair; a pipeline invocation handles exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRecord {
    pub bucket: String,
    /// Decoded object key
    pub key: String,
}

impl TriggerRecord {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Build a record from a key as it appears in a notification payload.
    pub fn from_encoded(bucket: impl Into<String>, raw_key: &str) -> Result<Self> {
        Ok(Self::new(bucket, decode_object_key(raw_key)?))
    }
}

/// Decode a notification key: `+` becomes a space, then `%XX` escapes are
/// resolved. An escaped plus (`%2B`) survives as a literal `+`.
pub fn decode_object_key(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|key| key.into_owned())
        .map_err(|e| AppError::Decode(format!("Object key is not valid UTF-8: {}", e)))
}

// S3-style event notification body

#[derive(Debug, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Deserialize)]
pub struct S3EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct S3Object {
    pub key: String,
}

impl S3Event {
    /// Every record in the batch, keys decoded, in delivery order.
    pub fn trigger_records(&self) -> Result<Vec<TriggerRecord>> {
        self.records
            .iter()
            .map(|record| TriggerRecord::from_encoded(&record.s3.bucket.name, &record.s3.object.key))
            .collect()
    }
}
