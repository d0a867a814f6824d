//! Object storage access by `(bucket, key)`.
//!
//! Stores are bucket-scoped `object_store` clients. Buckets known at startup
//! get a client up front; any other bucket named by a trigger gets one built
//! on demand from the same settings and kept for later calls.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{ClientOptions, ObjectStore, PutPayload, RetryConfig};
use tracing::{debug, info};

use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::{StorageBackend, StorageConfig};

#[async_trait]
pub trait ObjectStorage {
    /// Fetch a whole object.
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Create or overwrite an object.
    async fn put(&self, bucket: &str, key: &str, payload: Vec<u8>) -> Result<()>;
}

pub struct BucketStores {
    stores: RwLock<HashMap<String, Arc<dyn ObjectStore>>>,
    config: Option<StorageConfig>,
}

impl BucketStores {
    /// Pre-build clients for `buckets`; others are built when first named.
    pub fn from_config(config: &StorageConfig, buckets: &[&str]) -> Result<Self> {
        let mut stores = HashMap::new();
        for bucket in buckets.iter().filter(|b| !b.trim().is_empty()) {
            validate_bucket_name(bucket)?;
            stores.insert(bucket.to_string(), build_store(config, bucket)?);
        }
        Ok(Self {
            stores: RwLock::new(stores),
            config: Some(config.clone()),
        })
    }

    /// Fixed set of stores; naming any other bucket is an access error.
    pub fn with_stores(stores: HashMap<String, Arc<dyn ObjectStore>>) -> Self {
        Self {
            stores: RwLock::new(stores),
            config: None,
        }
    }

    fn store_for(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        validate_bucket_name(bucket)?;

        let cached = self
            .stores
            .read()
            .map_err(|_| lock_error())?
            .get(bucket)
            .cloned();
        if let Some(store) = cached {
            return Ok(store);
        }

        let config = self.config.as_ref().ok_or_else(|| {
            AppError::StorageAccess(format!("No store configured for bucket '{}'", bucket))
        })?;
        let store = build_store(config, bucket)?;

        let mut stores = self.stores.write().map_err(|_| lock_error())?;
        Ok(stores.entry(bucket.to_string()).or_insert(store).clone())
    }
}

#[async_trait]
impl ObjectStorage for BucketStores {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let store = self.store_for(bucket)?;
        let path = ObjectPath::from(key);

        let result = store
            .get(&path)
            .await
            .map_err(|e| storage_error("read", bucket, key, e))?;
        let bytes = result
            .bytes()
            .await
            .map_err(|e| storage_error("read", bucket, key, e))?;

        debug!(bucket = %bucket, key = %key, size = bytes.len(), "Fetched object");
        Ok(bytes.to_vec())
    }

    async fn put(&self, bucket: &str, key: &str, payload: Vec<u8>) -> Result<()> {
        let store = self.store_for(bucket)?;
        let path = ObjectPath::from(key);
        let size = payload.len();

        store
            .put(&path, PutPayload::from(payload))
            .await
            .map_err(|e| storage_error("write", bucket, key, e))?;

        debug!(bucket = %bucket, key = %key, size, "Wrote object");
        Ok(())
    }
}

fn lock_error() -> AppError {
    AppError::Internal("Bucket store registry lock poisoned".to_string())
}

/// Bucket names become path segments for the local backend and must not
/// resolve outside the storage root.
pub fn validate_bucket_name(bucket: &str) -> Result<()> {
    let invalid = bucket.trim().is_empty()
        || bucket.starts_with('.')
        || bucket.contains("..")
        || bucket.contains(&['/', '\\', '\0'][..]);
    if invalid {
        return Err(AppError::StorageAccess(format!(
            "Invalid bucket name '{}'",
            bucket
        )));
    }
    Ok(())
}

fn storage_error(op: &str, bucket: &str, key: &str, err: object_store::Error) -> AppError {
    match err {
        object_store::Error::NotFound { .. } => {
            AppError::ObjectNotFound(format!("{}/{}", bucket, key))
        }
        other => AppError::StorageAccess(format!(
            "Failed to {} {}/{}: {}",
            op, bucket, key, other
        )),
    }
}

fn client_options(config: &StorageConfig) -> ClientOptions {
    ClientOptions::new()
        .with_connect_timeout(Duration::from_secs(5))
        .with_timeout(Duration::from_secs(config.timeout_secs))
        .with_allow_http(config.allow_http)
}

/// Failures surface to the invoker, which owns redelivery.
fn no_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 0,
        ..RetryConfig::default()
    }
}

pub fn build_store(config: &StorageConfig, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
    match config.backend {
        StorageBackend::S3 => {
            info!("Creating S3 client for bucket: {}", bucket);

            let mut builder = AmazonS3Builder::from_env()
                .with_bucket_name(bucket)
                .with_client_options(client_options(config))
                .with_retry(no_retry());
            if let Some(region) = &config.region {
                builder = builder.with_region(region);
            }
            if let Some(endpoint) = &config.endpoint {
                builder = builder.with_endpoint(endpoint);
            }

            Ok(Arc::new(builder.build()?))
        }
        StorageBackend::Local => {
            let root = config.local_root.as_deref().ok_or_else(|| {
                AppError::Config("storage.local_root is required for the local backend".to_string())
            })?;
            let dir = root.join(bucket);
            ensure_dir(&dir)?;

            info!("Creating LocalFileSystem store at: {}", dir.display());
            Ok(Arc::new(LocalFileSystem::new_with_prefix(&dir)?))
        }
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| {
            AppError::StorageAccess(format!("Failed to create dir {}: {}", path.display(), e))
        })?;
    }
    Ok(())
}
