//! Error types for the config module.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading a resolved configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Resolved configuration not found at path: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration format in file {path}: {message}")]
    InvalidFormat { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}
