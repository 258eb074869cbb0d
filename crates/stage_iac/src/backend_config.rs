//! `backend.config` emission from `terraform init` backend arguments.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use stage_config::BACKEND_CONFIG_FLAG;
use tracing::debug;

use crate::error::{IacError, IacResult};
use crate::fsutil::write_private;

/// Backend config file name, used as `terraform init -backend-config=backend.config`.
pub const BACKEND_CONFIG_FILE: &str = "backend.config";

/// One `-backend-config=key=value` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendArg {
    pub key: String,
    pub value: String,
}

impl BackendArg {
    /// Parse a `-backend-config=key=value` argument.
    ///
    /// The payload may be wrapped in double quotes. It is split on its first
    /// `=` only, so values may themselves contain `=`.
    pub fn parse(line: &str) -> IacResult<Self> {
        let malformed = |reason: &str| IacError::MalformedArgLine {
            line: line.to_string(),
            reason: reason.to_string(),
        };

        let payload = line
            .strip_prefix(BACKEND_CONFIG_FLAG)
            .ok_or_else(|| malformed("expected a -backend-config= argument"))?;
        let payload = payload
            .strip_prefix('"')
            .and_then(|p| p.strip_suffix('"'))
            .unwrap_or(payload);

        let (key, value) = payload
            .split_once('=')
            .ok_or_else(|| malformed("expected key=value"))?;
        if key.trim().is_empty() {
            return Err(malformed("empty key"));
        }

        Ok(Self {
            key: key.trim().to_string(),
            value: value.to_string(),
        })
    }

    /// The `key="value"` line for this argument, without the newline.
    pub fn to_line(&self) -> String {
        let escaped = self.value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("{}=\"{}\"", self.key, escaped)
    }
}

impl FromStr for BackendArg {
    type Err = IacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Render argument lines as `backend.config` content.
///
/// Any malformed line fails the whole render.
pub fn render_backend_config<S: AsRef<str>>(arg_lines: &[S]) -> IacResult<String> {
    let mut content = String::new();
    for line in arg_lines {
        let arg = BackendArg::parse(line.as_ref())?;
        content.push_str(&arg.to_line());
        content.push('\n');
    }
    Ok(content)
}

/// Write `backend.config` content for `arg_lines` to `path` (owner-only).
///
/// Nothing is written when a line is malformed.
pub fn write_backend_config<S: AsRef<str>>(path: impl AsRef<Path>, arg_lines: &[S]) -> IacResult<PathBuf> {
    let path = path.as_ref();
    let content = render_backend_config(arg_lines)?;
    write_private(path, content.as_bytes())?;
    debug!(path = %path.display(), settings = arg_lines.len(), "Wrote backend config");
    Ok(path.to_path_buf())
}
