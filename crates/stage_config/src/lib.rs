//! # stage_config
//!
//! Resolved configuration model and environment snapshot for terrastage.
//!
//! terrastage does not evaluate terragrunt configuration itself. It consumes
//! the fully resolved document a configuration resolver produces (the shape
//! written by `terragrunt render-json`) and a one-time snapshot of the host
//! environment.
//!
//! ## Example
//!
//! ```rust,no_run
//! use stage_config::{ConfigReader, EnvSnapshot};
//!
//! let config = ConfigReader::read("./live/prod/terragrunt_rendered.json").unwrap();
//! let env = EnvSnapshot::from_process();
//!
//! for (name, _) in &config.inputs {
//!     if let Some(value) = env.tf_var_override(name) {
//!         println!("{} is overridden by the environment: {}", name, value);
//!     }
//! }
//! ```

pub mod env;
pub mod error;
pub mod models;
pub mod reader;

pub use env::{EnvSnapshot, TF_VAR_PREFIX};
pub use error::{ConfigError, ConfigResult};
pub use models::*;
pub use reader::{ConfigReader, RESOLVED_CONFIG_FILE};
