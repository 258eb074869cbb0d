//! Staging context containing run parameters.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stage_config::RESOLVED_CONFIG_FILE;
use stage_iac::{DEBUG_TFVARS_FILE, STAGE_TFVARS_FILE};

/// Input variable naming the per-module staging subdirectory by default.
pub const DEFAULT_SUBDIR_VAR: &str = "module_path";

/// Defaults for one kind of staging run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    /// Stage a module for a direct terraform run.
    #[default]
    Stage,
    /// Reproduce terragrunt's debug output.
    Debug,
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stage => "stage",
            Self::Debug => "debug",
        }
    }

    /// Variables file name written into the working directory.
    pub fn tfvars_file(&self) -> &'static str {
        match self {
            Self::Stage => STAGE_TFVARS_FILE,
            Self::Debug => DEBUG_TFVARS_FILE,
        }
    }

    /// Staging directory name used when none is given.
    pub fn stage_dir_name(&self) -> &'static str {
        match self {
            Self::Stage => ".terrastage",
            Self::Debug => ".terragrunt-cache",
        }
    }

    /// Whether the profile logs at debug level by default.
    pub fn debug_logging(&self) -> bool {
        matches!(self, Self::Debug)
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameters of one staging run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingContext {
    /// Directory holding the deployment unit's configuration
    pub work_dir: PathBuf,
    /// Directory modules are staged into
    pub stage_dir: PathBuf,
    /// Resolved configuration document
    pub config_path: PathBuf,
    /// Input variable naming the staging subdirectory
    pub subdir_var: String,
    /// Variables file name
    pub tfvars_file: String,
    pub profile: Profile,
    pub verbose: bool,
}

impl StagingContext {
    /// Create a context with the stage profile defaults.
    pub fn new(work_dir: impl Into<PathBuf>, stage_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        let profile = Profile::default();
        Self {
            config_path: work_dir.join(RESOLVED_CONFIG_FILE),
            work_dir,
            stage_dir: stage_dir.into(),
            subdir_var: DEFAULT_SUBDIR_VAR.to_string(),
            tfvars_file: profile.tfvars_file().to_string(),
            profile,
            verbose: false,
        }
    }

    /// Switch profile, taking its variables file name.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self.tfvars_file = profile.tfvars_file().to_string();
        self
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    pub fn with_subdir_var(mut self, name: impl Into<String>) -> Self {
        self.subdir_var = name.into();
        self
    }

    pub fn with_tfvars_file(mut self, name: impl Into<String>) -> Self {
        self.tfvars_file = name.into();
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Resolve a `--workdir` flag: `.` means the current directory.
pub fn resolve_work_dir(cwd: &Path, flag: &Path) -> PathBuf {
    if flag == Path::new(".") {
        cwd.to_path_buf()
    } else {
        cwd.join(flag)
    }
}

/// Resolve a `--stagedir` flag: `.` means the profile's directory under the
/// current directory.
pub fn resolve_stage_dir(cwd: &Path, flag: &Path, profile: Profile) -> PathBuf {
    if flag == Path::new(".") {
        cwd.join(profile.stage_dir_name())
    } else {
        cwd.join(flag)
    }
}
