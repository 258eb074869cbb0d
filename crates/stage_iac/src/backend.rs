//! Backend declaration scanning.

use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::error::{IacError, IacResult};

/// Scans module source for a `backend "<type>"` declaration.
pub struct BackendScanner;

impl BackendScanner {
    /// Whether any source file under `working_dir` declares a backend of
    /// `backend_type`.
    ///
    /// Native `*.tf` files are searched first, then `*.tf.json` files for
    /// the JSON form (`"backend": { "<type>": ... }`).
    pub fn verifies_backend_declared(working_dir: &Path, backend_type: &str) -> IacResult<bool> {
        let backend = regex::escape(backend_type);

        let native = compile(&format!(r#"backend[[:blank:]]+"{}""#, backend))?;
        if Self::grep(&native, working_dir, "**/*.tf")? {
            return Ok(true);
        }

        let json = compile(&format!(
            r#"(?m)"backend":[[:space:]]*\{{[[:space:]]*"{}""#,
            backend
        ))?;
        Self::grep(&json, working_dir, "**/*.tf.json")
    }

    /// Like [`Self::verifies_backend_declared`], but a missing declaration
    /// is a [`IacError::BackendNotDeclared`] naming `config_path`.
    pub fn ensure_backend_declared(
        working_dir: &Path,
        backend_type: &str,
        config_path: &Path,
    ) -> IacResult<()> {
        if Self::verifies_backend_declared(working_dir, backend_type)? {
            return Ok(());
        }
        Err(IacError::BackendNotDeclared {
            config_path: config_path.to_path_buf(),
            working_dir: working_dir.to_path_buf(),
            backend: backend_type.to_string(),
        })
    }

    /// Whether any file matching `pattern` below `dir` matches `regex`.
    fn grep(regex: &Regex, dir: &Path, pattern: &str) -> IacResult<bool> {
        let base = glob::Pattern::escape(&dir.to_string_lossy());
        let full_pattern = format!("{}/{}", base.trim_end_matches('/'), pattern);

        let paths = glob::glob(&full_pattern)
            .map_err(|e| IacError::SourceScan(format!("invalid pattern {}: {}", full_pattern, e)))?;

        for entry in paths {
            let path = entry.map_err(|e| IacError::SourceScan(e.to_string()))?;
            if !path.is_file() {
                continue;
            }
            let content = fs::read_to_string(&path)
                .map_err(|e| IacError::SourceScan(format!("{}: {}", path.display(), e)))?;
            if regex.is_match(&content) {
                debug!(file = %path.display(), pattern = regex.as_str(), "Found backend declaration");
                return Ok(true);
            }
        }

        Ok(false)
    }
}

fn compile(pattern: &str) -> IacResult<Regex> {
    Regex::new(pattern).map_err(|e| IacError::SourceScan(format!("invalid backend pattern: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_native_backend() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("main.tf"),
            "terraform {\n  backend \"s3\" {}\n}\n",
        )
        .unwrap();

        assert!(BackendScanner::verifies_backend_declared(dir.path(), "s3").unwrap());
        assert!(!BackendScanner::verifies_backend_declared(dir.path(), "gcs").unwrap());
    }

    #[test]
    fn test_backend_requires_blank_separator() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.tf"), "backend\n\"s3\" {}\n").unwrap();

        assert!(!BackendScanner::verifies_backend_declared(dir.path(), "s3").unwrap());
    }

    #[test]
    fn test_backend_is_case_sensitive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.tf"), "terraform {\n  backend \"S3\" {}\n}\n").unwrap();

        assert!(!BackendScanner::verifies_backend_declared(dir.path(), "s3").unwrap());
    }

    #[test]
    fn test_json_backend_in_subdirectory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("generated");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            nested.join("backend.tf.json"),
            "{\n  \"terraform\": {\n    \"backend\": {\n      \"gcs\": {}\n    }\n  }\n}\n",
        )
        .unwrap();

        assert!(BackendScanner::verifies_backend_declared(dir.path(), "gcs").unwrap());
        assert!(!BackendScanner::verifies_backend_declared(dir.path(), "s3").unwrap());
    }

    #[test]
    fn test_backend_type_is_literal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.tf"), "backend \"s3\" {}\n").unwrap();

        assert!(!BackendScanner::verifies_backend_declared(dir.path(), "s.").unwrap());
    }

    #[test]
    fn test_unreadable_source_is_scan_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("00-binary.tf"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
        fs::write(dir.path().join("main.tf"), "backend \"s3\" {}\n").unwrap();

        let err = BackendScanner::verifies_backend_declared(dir.path(), "s3").unwrap_err();
        assert!(matches!(err, IacError::SourceScan(ref m) if m.contains("00-binary.tf")), "{}", err);

        let err = BackendScanner::ensure_backend_declared(dir.path(), "s3", Path::new("/live/terragrunt.hcl"))
            .unwrap_err();
        assert!(matches!(err, IacError::SourceScan(_)));
    }

    #[test]
    fn test_ensure_backend_declared_message() {
        let dir = tempdir().unwrap();
        let err = BackendScanner::ensure_backend_declared(
            dir.path(),
            "azurerm",
            Path::new("/live/prod/terragrunt.hcl"),
        )
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("/live/prod/terragrunt.hcl"));
        assert!(message.contains("backend \"azurerm\" {}"));
    }
}
