pub mod artifact;
pub mod dataset;
pub mod error;
pub mod llm_config;
pub mod trigger;
