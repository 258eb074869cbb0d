//! # stage_core
//!
//! Staging pipeline driver for terrastage.
//!
//! The pipeline reproduces the files terragrunt would have handed to
//! terraform, without running terraform:
//!
//! 1. **Source**: stage the module named by `terraform.source` into the
//!    staging directory
//! 2. **Generate**: write `generate` blocks and the remote state backend block
//! 3. **Backend**: check the module declares the backend, then write
//!    `backend.config`
//! 4. **Variables**: reconcile inputs and write the variables file
//!
//! Every stage is fail-soft. A failure is logged, recorded in the
//! [`StagingReport`] and the next independent stage still runs.
//!
//! # Example
//!
//! ```rust,no_run
//! use stage_config::EnvSnapshot;
//! use stage_core::{StagingContext, StagingPipeline};
//!
//! let ctx = StagingContext::new("./live/prod/vpc", "./.terrastage");
//! let report = StagingPipeline::new().run(&ctx, &EnvSnapshot::from_process());
//!
//! if report.has_failures() {
//!     eprintln!("staging finished with failures");
//! }
//! ```

pub mod context;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod report;
pub mod source;

pub use context::{Profile, StagingContext, DEFAULT_SUBDIR_VAR};
pub use error::{CoreError, CoreResult};
pub use generate::{CodeGenerator, FileGenerator};
pub use pipeline::StagingPipeline;
pub use report::{Stage, StageOutcome, StageRecord, StagingReport};
pub use source::{LocalSourceFetcher, SourceFetcher, SourceSpec};
