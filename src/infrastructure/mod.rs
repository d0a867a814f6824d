pub mod bootstrap;
pub mod config;
pub mod decoders;
pub mod llm_clients;
pub mod storage;
