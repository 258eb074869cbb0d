//! # stage_iac
//!
//! Terraform module inspection and staging artifact emission for terrastage.
//!
//! This crate holds every decision the staging pipeline makes about a
//! downloaded module: which variables it declares, whether it declares the
//! configured backend, which resolved inputs may be written to a variables
//! file, and how backend arguments become a `backend.config` file.
//!
//! ## Features
//!
//! - Declared variable extraction from `*.tf` and `*.tf.json` files
//! - Backend declaration scanning in both native and JSON syntax
//! - Input reconciliation against declared variables and `TF_VAR_` overrides
//! - Deterministic, owner-only variables and backend config files
//! - Generate block and backend block writing
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use stage_config::{ConfigReader, EnvSnapshot};
//! use stage_iac::{reconcile, write_variables_file, ModuleVariableReader, STAGE_TFVARS_FILE};
//!
//! let config = ConfigReader::read("terragrunt_rendered.json").unwrap();
//! let module = Path::new(".terrastage/vpc");
//!
//! let declared = ModuleVariableReader::read_declared_variables(module).unwrap();
//! let reconciliation = reconcile(&config.inputs, &declared, &EnvSnapshot::from_process());
//!
//! write_variables_file(module.join(STAGE_TFVARS_FILE), &reconciliation.variables).unwrap();
//! ```

pub mod backend;
pub mod backend_config;
pub mod codegen;
pub mod error;
pub mod fsutil;
pub mod module;
pub mod reconcile;
pub mod tfvars;

pub use backend::BackendScanner;
pub use backend_config::{render_backend_config, write_backend_config, BackendArg, BACKEND_CONFIG_FILE};
pub use codegen::{backend_block, write_generated, GenerateOutcome, GENERATED_SIGNATURE};
pub use error::{IacError, IacResult};
pub use module::{ModuleVariableReader, ModuleVariableSet};
pub use reconcile::{reconcile, Omission, OmissionReason, ReconciledVariables, Reconciliation};
pub use tfvars::{render_variables, write_variables_file, DEBUG_TFVARS_FILE, STAGE_TFVARS_FILE};
