//! Variables file emission.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::IacResult;
use crate::fsutil::write_private;
use crate::reconcile::ReconciledVariables;

/// Variables file name used when staging a module.
pub const STAGE_TFVARS_FILE: &str = "test.auto.tfvars.json";

/// Variables file name used by the debug profile.
pub const DEBUG_TFVARS_FILE: &str = "terragrunt-debug.tfvars.json";

/// Render variables as a two-space indented JSON object with sorted keys.
pub fn render_variables(vars: &ReconciledVariables) -> IacResult<String> {
    Ok(serde_json::to_string_pretty(vars)?)
}

/// Write `vars` to `path` (owner-only) and return the path written.
pub fn write_variables_file(path: impl AsRef<Path>, vars: &ReconciledVariables) -> IacResult<PathBuf> {
    let path = path.as_ref();
    let content = render_variables(vars)?;
    write_private(path, content.as_bytes())?;
    debug!(path = %path.display(), count = vars.len(), "Wrote variables file");
    Ok(path.to_path_buf())
}
