//! Error types for IaC module.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for IaC operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur while inspecting a module or emitting artifacts.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("Failed to parse terraform module at {path}: {message}")]
    ModuleParse { path: PathBuf, message: String },

    #[error("Failed to scan terraform source: {0}")]
    SourceScan(String),

    #[error(
        "Found remote_state settings in {config_path} but no backend block in the Terraform code in {working_dir}. \
         You must define a backend block (it can be empty!) in your Terraform code or your remote state settings \
         will have no effect! It should look something like this:\n\n\
         terraform {{\n  backend \"{backend}\" {{}}\n}}\n"
    )]
    BackendNotDeclared {
        config_path: PathBuf,
        working_dir: PathBuf,
        backend: String,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed backend argument '{line}': {reason}")]
    MalformedArgLine { line: String, reason: String },

    #[error("Refusing to replace {path} (if_exists = {policy})")]
    GenerateConflict { path: PathBuf, policy: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
