//! Generated file writing.
//!
//! Writes `generate` blocks and the backend block derived from remote state
//! settings into a working directory, honoring each block's `if_exists`
//! policy.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde_json::Value;
use stage_config::{GenerateBlock, IfExists, RemoteState};
use tracing::{debug, info};

use crate::error::{IacError, IacResult};

/// Marker placed on the first line of generated files.
pub const GENERATED_SIGNATURE: &str = "Generated by terrastage. Sig: terrastage-generated";

/// What happened to a generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    Written(PathBuf),
    Skipped(PathBuf),
}

/// Write `block` relative to `working_dir`.
pub fn write_generated(working_dir: &Path, block: &GenerateBlock) -> IacResult<GenerateOutcome> {
    let target = working_dir.join(&block.path);

    if target.exists() {
        match block.if_exists {
            IfExists::Overwrite => {}
            IfExists::Skip => {
                debug!(path = %target.display(), "Generated file exists, skipping");
                return Ok(GenerateOutcome::Skipped(target));
            }
            IfExists::OverwriteTerragrunt if carries_signature(&target).map_err(|e| write_error(&target, e))? => {}
            policy => {
                return Err(IacError::GenerateConflict {
                    path: target,
                    policy: policy.to_string(),
                })
            }
        }
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
    }

    let contents = if block.disable_signature {
        block.contents.clone()
    } else {
        format!("{}{}\n{}", block.comment_prefix, GENERATED_SIGNATURE, block.contents)
    };
    fs::write(&target, contents).map_err(|e| write_error(&target, e))?;

    info!(path = %target.display(), "Generated file");
    Ok(GenerateOutcome::Written(target))
}

fn write_error(path: &Path, source: std::io::Error) -> IacError {
    IacError::Write {
        path: path.to_path_buf(),
        source,
    }
}

fn carries_signature(path: &Path) -> std::io::Result<bool> {
    let mut first_line = String::new();
    BufReader::new(fs::File::open(path)?).read_line(&mut first_line)?;
    Ok(first_line.contains(GENERATED_SIGNATURE))
}

/// A `terraform { backend "<type>" { ... } }` block for `remote`.
pub fn backend_block(remote: &RemoteState) -> String {
    let settings: Vec<(&String, &Value)> = remote.backend_settings().collect();
    let width = settings.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

    let mut content = format!("terraform {{\n  backend \"{}\" {{\n", remote.backend);
    for (key, value) in settings {
        content.push_str(&format!("    {:<width$} = {}\n", key, hcl_literal(value), width = width));
    }
    content.push_str("  }\n}\n");
    content
}

/// HCL literal for `value`; strings at any depth have template sequences escaped.
fn hcl_literal(value: &Value) -> String {
    match value {
        Value::String(s) => hcl_string(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(hcl_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{} = {}", hcl_string(key), hcl_literal(value)))
                .collect();
            format!("{{ {} }}", entries.join(", "))
        }
        other => other.to_string(),
    }
}

fn hcl_string(s: &str) -> String {
    serde_json::to_string(s)
        .unwrap_or_default()
        .replace("${", "$${")
        .replace("%{", "%%{")
}
