//! Command line definition.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use stage_core::{Profile, DEFAULT_SUBDIR_VAR};

/// terrastage - stage a terragrunt unit for a direct terraform run
#[derive(Parser, Debug)]
#[command(name = "terrastage")]
#[command(version, about = "Stage a terragrunt deployment unit for a direct terraform run")]
#[command(long_about = r#"
terrastage reproduces the files terragrunt would have handed to terraform:
the staged module source, generated files, backend.config and a variables
file holding the inputs the module declares. Run terraform directly in the
staged directory afterwards.

The resolved configuration is read from terragrunt_rendered.json in the
working directory (see `terragrunt render-json`), or from --config.

EXIT CODES:
  0 - Every stage completed, warned or was skipped
  1 - General error
  2 - Invalid arguments
  3 - At least one staging stage failed
"#)]
pub struct Cli {
    /// Directory modules are staged into ("." means ./.terrastage)
    #[arg(long, default_value = ".", env = "TERRASTAGE_STAGEDIR")]
    pub stagedir: PathBuf,

    /// Directory holding the terragrunt configuration
    #[arg(long, default_value = ".", env = "TERRASTAGE_WORKDIR")]
    pub workdir: PathBuf,

    /// Input variable whose value names the staging subdirectory
    #[arg(long, default_value = DEFAULT_SUBDIR_VAR, env = "TERRASTAGE_SUBDIRVAR")]
    pub subdirvar: String,

    /// Log the run parameters
    #[arg(short, long, env = "TERRASTAGE_VERBOSE")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, env = "TERRASTAGE_DEBUG")]
    pub debug: bool,

    /// Resolved configuration document (JSON or YAML)
    #[arg(long, env = "TERRASTAGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Staging profile
    #[arg(long, value_enum, default_value_t = ProfileArg::Stage, env = "TERRASTAGE_PROFILE")]
    pub profile: ProfileArg,

    /// Variables file name, overriding the profile's
    #[arg(long, env = "TERRASTAGE_VAR_FILE_NAME")]
    pub var_file_name: Option<String>,

    /// Emit logs as JSON
    #[arg(long, env = "TERRASTAGE_LOG_JSON")]
    pub log_json: bool,
}

impl Cli {
    /// Whether logging should run at debug level.
    pub fn debug_logging(&self) -> bool {
        self.debug || Profile::from(self.profile).debug_logging()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfileArg {
    Stage,
    Debug,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Stage => Profile::Stage,
            ProfileArg::Debug => Profile::Debug,
        }
    }
}
