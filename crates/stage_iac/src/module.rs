//! Declared variable extraction from a terraform module directory.
//!
//! Native files are parsed with `hcl-rs`; only the labels of top-level
//! `variable` blocks are kept.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{IacError, IacResult};

/// Names of the variables a module declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleVariableSet {
    names: BTreeSet<String>,
}

impl ModuleVariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ModuleVariableSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Reader for module variable declarations.
pub struct ModuleVariableReader;

impl ModuleVariableReader {
    /// Read the variable names declared by the module at `module_path`.
    ///
    /// Every `*.tf` and `*.tf.json` file directly inside the directory is
    /// read; subdirectories (nested modules) are not.
    pub fn read_declared_variables(module_path: &Path) -> IacResult<ModuleVariableSet> {
        if !module_path.is_dir() {
            return Err(parse_error(module_path, "not a module directory"));
        }

        let mut names = BTreeSet::new();
        for entry in WalkDir::new(module_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| parse_error(module_path, e.to_string()))?;
            let path = entry.path();
            let file_name = entry.file_name().to_string_lossy();
            if !path.is_file() || is_ignored_file(&file_name) {
                continue;
            }

            let found = if file_name.ends_with(".tf.json") {
                json_variables(&read_source(path)?).map_err(|m| parse_error(path, m))?
            } else if file_name.ends_with(".tf") {
                native_variables(&read_source(path)?).map_err(|m| parse_error(path, m))?
            } else {
                continue;
            };

            debug!(file = %path.display(), count = found.len(), "Read variable declarations");
            names.extend(found);
        }

        Ok(ModuleVariableSet { names })
    }
}

/// Editor and hidden files terraform itself skips.
fn is_ignored_file(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('#') || name.ends_with('~')
}

/// Source text with a leading byte order mark removed.
fn read_source(path: &Path) -> IacResult<String> {
    let content = fs::read_to_string(path).map_err(|e| parse_error(path, e.to_string()))?;
    Ok(match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

fn parse_error(path: &Path, message: impl Into<String>) -> IacError {
    IacError::ModuleParse {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn json_variables(content: &str) -> Result<Vec<String>, String> {
    let root: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    let root = root
        .as_object()
        .ok_or_else(|| "root of a JSON configuration must be an object".to_string())?;

    match root.get("variable") {
        None => Ok(Vec::new()),
        Some(Value::Object(vars)) => Ok(vars.keys().cloned().collect()),
        Some(Value::Array(blocks)) => {
            let mut names = Vec::new();
            for block in blocks {
                let vars = block
                    .as_object()
                    .ok_or_else(|| "each \"variable\" list item must be an object".to_string())?;
                names.extend(vars.keys().cloned());
            }
            Ok(names)
        }
        Some(_) => Err("\"variable\" must be an object or a list of objects".to_string()),
    }
}

fn native_variables(content: &str) -> Result<Vec<String>, String> {
    let body = hcl::parse(content).map_err(|e| e.to_string())?;

    let mut names = Vec::new();
    for block in body.blocks().filter(|b| b.identifier() == "variable") {
        match block.labels() {
            [label] => names.push(label.as_str().to_string()),
            labels => {
                return Err(format!(
                    "variable block must have exactly one label, found {}",
                    labels.len()
                ))
            }
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn names(content: &str) -> Vec<String> {
        native_variables(content).unwrap()
    }

    #[test]
    fn test_native_variables() {
        let src = r#"
variable "region" {
  type    = string
  default = "us-east-1"
}

variable   "tags" {
  type = map(string)
}

variable legacy {}
"#;
        assert_eq!(names(src), vec!["region", "tags", "legacy"]);
    }

    #[test]
    fn test_native_ignores_commented_and_nested() {
        let src = r#"
# variable "commented" {}
// variable "also_commented" {}
/* variable "block_commented" {
} */
module "vpc" {
  source = "./vpc"
  variable "nested" {}
}
locals {
  greeting = "${var.name}-{"
  doc = <<-EOT
    variable "in_heredoc" {
    }}}
  EOT
}
variable "real" {}
"#;
        assert_eq!(names(src), vec!["real"]);
    }

    #[test]
    fn test_native_invalid_syntax() {
        assert!(native_variables("variable \"a\" {\n").is_err());
        assert!(native_variables("}\n").is_err());
        assert!(native_variables("variable \"a\n").is_err());
        assert!(native_variables("variable {}\n").is_err());
    }

    #[test]
    fn test_json_variables() {
        let vars = json_variables(r#"{"variable": {"region": {}, "zone": {"default": "a"}}}"#).unwrap();
        assert_eq!(vars, vec!["region", "zone"]);

        let vars = json_variables(r#"{"variable": [{"a": {}}, {"b": {}}]}"#).unwrap();
        assert_eq!(vars, vec!["a", "b"]);

        assert!(json_variables(r#"{"resource": {}}"#).unwrap().is_empty());
        assert!(json_variables(r#"{"variable": "x"}"#).is_err());
        assert!(json_variables("[1, 2]").is_err());
        assert!(json_variables("{").is_err());
    }

    #[test]
    fn test_read_declared_variables_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("variables.tf"), "variable \"region\" {}\n").unwrap();
        fs::write(
            dir.path().join("extra.tf.json"),
            r#"{"variable": {"zone": {}}}"#,
        )
        .unwrap();
        fs::write(dir.path().join(".hidden.tf"), "variable \"hidden\" {}\n").unwrap();
        fs::write(dir.path().join("backup.tf~"), "variable \"backup\" {}\n").unwrap();
        fs::write(dir.path().join("README.md"), "variable \"doc\" {}\n").unwrap();
        fs::create_dir(dir.path().join("modules")).unwrap();
        fs::write(dir.path().join("modules").join("x.tf"), "variable \"child\" {}\n").unwrap();

        let set = ModuleVariableReader::read_declared_variables(dir.path()).unwrap();

        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["region", "zone"]);
    }

    #[test]
    fn test_read_declared_variables_with_byte_order_mark() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("variables.tf"),
            "\u{feff}variable \"region\" {}\nvariable \"zone\" {}\n",
        )
        .unwrap();

        let set = ModuleVariableReader::read_declared_variables(dir.path()).unwrap();

        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["region", "zone"]);
    }

    #[test]
    fn test_read_declared_variables_missing_dir() {
        let dir = tempdir().unwrap();
        let err = ModuleVariableReader::read_declared_variables(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, IacError::ModuleParse { .. }));
    }

    #[test]
    fn test_read_declared_variables_bad_syntax() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.tf"), "variable \"region\" {\n").unwrap();

        let err = ModuleVariableReader::read_declared_variables(dir.path()).unwrap_err();
        match err {
            IacError::ModuleParse { path, .. } => assert!(path.ends_with("main.tf")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_declared_variables_bad_json() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.tf.json"), "{ not json").unwrap();

        let err = ModuleVariableReader::read_declared_variables(dir.path()).unwrap_err();
        match err {
            IacError::ModuleParse { path, .. } => assert!(path.ends_with("main.tf.json")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
