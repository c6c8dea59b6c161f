use thiserror::Error;

pub type Result<T> = std::result::Result<T, IntentError>;

#[derive(Error, Debug)]
pub enum IntentError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] normalizer::FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod commands;
pub mod config;
pub mod dataset;
pub mod features;
pub mod model;
pub mod normalizer;
pub mod service;
pub mod training;
