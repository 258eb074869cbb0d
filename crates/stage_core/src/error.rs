//! Error types for the core module.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while staging a module.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unsupported module source (only local paths can be staged): {0}")]
    UnsupportedSource(String),

    #[error("Module source not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Invalid stage subdirectory '{0}': must be a relative path inside the staging directory")]
    InvalidStageSubdir(String),

    #[error("Refusing to stage into {stage_dir}: it contains the module source {source_dir}")]
    UnsafeStageDir { stage_dir: PathBuf, source_dir: PathBuf },

    #[error("Refusing to stage into {stage_dir}: emptying it would delete {protected}")]
    StageDirOverlapsWorkDir { stage_dir: PathBuf, protected: PathBuf },

    #[error("IaC error: {0}")]
    Iac(#[from] stage_iac::IacError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Copy error: {0}")]
    Copy(#[from] fs_extra::error::Error),
}
