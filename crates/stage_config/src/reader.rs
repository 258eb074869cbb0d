//! Resolved configuration loading.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::models::ResolvedConfig;

/// File name `terragrunt render-json` writes by default.
pub const RESOLVED_CONFIG_FILE: &str = "terragrunt_rendered.json";

/// Reader for resolved configuration documents.
pub struct ConfigReader;

impl ConfigReader {
    /// Read a resolved configuration, choosing YAML or JSON by extension.
    pub fn read(path: impl AsRef<Path>) -> ConfigResult<ResolvedConfig> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        debug!("Reading resolved configuration from {:?}", path);

        let content = fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .map_or(false, |ext| ext == "yaml" || ext == "yml");

        let parsed = if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        };
        parsed.map_err(|e| ConfigError::InvalidFormat {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn from_json(content: &str) -> ConfigResult<ResolvedConfig> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> ConfigResult<ResolvedConfig> {
        Ok(serde_yaml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_render_shape() {
        let config = ConfigReader::from_json(
            r#"{
                "inputs": {"region": "us-east-1", "count": 2},
                "remote_state": {
                    "backend": "s3",
                    "config": {"bucket": "state"},
                    "generate": {"path": "backend.tf", "if_exists": "overwrite_terragrunt"}
                },
                "terraform": {"source": "../modules//vpc"},
                "generate": {
                    "provider": {"path": "provider.tf", "if_exists": "skip", "contents": "provider \"aws\" {}"}
                },
                "locals": {"ignored": true}
            }"#,
        )
        .unwrap();

        assert_eq!(config.inputs["count"], json!(2));
        assert_eq!(config.source(), Some("../modules//vpc"));
        let remote = config.remote_state.unwrap();
        assert_eq!(remote.backend, "s3");
        assert_eq!(remote.generate.unwrap().path, "backend.tf");
        assert_eq!(config.generate["provider"].comment_prefix, "# ");
    }

    #[test]
    fn test_from_yaml() {
        let config = ConfigReader::from_yaml("inputs:\n  region: eu-west-1\n  tags:\n    team: core\n").unwrap();
        assert_eq!(config.inputs["tags"], json!({"team": "core"}));
        assert!(config.remote_state.is_none());
        assert!(config.source().is_none());
    }
}
