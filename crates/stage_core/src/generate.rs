//! Code generation seam.

use std::path::Path;

use stage_config::GenerateBlock;
use stage_iac::{write_generated, GenerateOutcome};

use crate::error::CoreResult;

/// Writes generated files into a working directory.
pub trait CodeGenerator {
    fn generate(&self, working_dir: &Path, block: &GenerateBlock) -> CoreResult<GenerateOutcome>;
}

/// Generator writing pre-rendered block contents to disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileGenerator;

impl CodeGenerator for FileGenerator {
    fn generate(&self, working_dir: &Path, block: &GenerateBlock) -> CoreResult<GenerateOutcome> {
        Ok(write_generated(working_dir, block)?)
    }
}
