//! Service configuration: defaults, then an optional TOML file, then
//! `DATASET_SUMMARY_*` environment variables (`__` separates sections).

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::artifact::DEFAULT_OUTPUT_PREFIX;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::{LLMConfig, LLMProvider};

pub const DEFAULT_CONFIG_FILE: &str = "dataset-summary.toml";
pub const ENV_PREFIX: &str = "DATASET_SUMMARY_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub llm: LLMConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3-compatible object storage, credentials from the environment
    S3,
    /// Directory per bucket under `local_root`
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// AWS region; falls back to `AWS_REGION` / `AWS_DEFAULT_REGION`
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub allow_http: bool,
    /// Root directory for the local backend
    #[serde(default)]
    pub local_root: Option<PathBuf>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::S3,
            region: None,
            endpoint: None,
            allow_http: false,
            local_root: None,
            timeout_secs: 30,
        }
    }
}

/// The bucket actually read always comes from the trigger record; this one
/// is only used to pre-build a client at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub bucket: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub bucket: String,
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Timeout for a single generation request, in seconds
    pub llm_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            llm_timeout_secs: 120,
        }
    }
}

impl AppConfig {
    /// Layered sources without touching the process environment beyond reads.
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let mut config: AppConfig = figment.extract()?;
        config.apply_api_key_fallback();
        config.validate()?;
        Ok(config)
    }

    /// Load `.env`, then the layered configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_figment(Self::figment(path))
    }

    fn apply_api_key_fallback(&mut self) {
        if self.llm.api_key.is_some() {
            return;
        }
        let var = match self.llm.provider {
            LLMProvider::OpenAI => "OPENAI_API_KEY",
            LLMProvider::Google => "GEMINI_API_KEY",
            LLMProvider::Local => return,
        };
        self.llm.api_key = std::env::var(var).ok().filter(|key| !key.trim().is_empty());
    }

    pub fn validate(&self) -> Result<()> {
        if self.output.bucket.trim().is_empty() {
            return Err(AppError::Config(
                "output.bucket must be set".to_string(),
            ));
        }
        if self.storage.backend == StorageBackend::Local && self.storage.local_root.is_none() {
            return Err(AppError::Config(
                "storage.local_root is required for the local backend".to_string(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(AppError::Config("llm.model must be set".to_string()));
        }
        Ok(())
    }
}
