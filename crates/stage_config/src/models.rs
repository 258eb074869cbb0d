//! Data models for resolved configurations.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Flag prefix of every backend argument handed to `terraform init`.
pub const BACKEND_CONFIG_FLAG: &str = "-backend-config=";

/// Remote state settings only terragrunt itself understands.
///
/// These drive terragrunt's bucket/table bootstrapping and are rejected by
/// `terraform init`, so they never become backend arguments.
const S3_TERRAGRUNT_ONLY: &[&str] = &[
    "s3_bucket_tags",
    "dynamotable_tags",
    "accesslogging_bucket_tags",
    "skip_bucket_versioning",
    "skip_bucket_ssencryption",
    "skip_bucket_accesslogging",
    "skip_bucket_root_access",
    "skip_bucket_enforced_tls",
    "skip_bucket_public_access_blocking",
    "skip_credentials_validation",
    "disable_bucket_update",
    "disable_aws_client_checksums",
    "enable_lock_table_ssencryption",
    "accesslogging_bucket_name",
    "accesslogging_target_prefix",
    "bucket_sse_algorithm",
    "bucket_sse_kms_key_id",
];

const GCS_TERRAGRUNT_ONLY: &[&str] = &[
    "project",
    "location",
    "gcs_bucket_labels",
    "skip_bucket_versioning",
    "skip_bucket_creation",
    "enable_bucket_policy_only",
];

/// Fully evaluated configuration of one deployment unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolvedConfig {
    /// Input variables, name to resolved value.
    #[serde(default, deserialize_with = "lenient_inputs")]
    pub inputs: BTreeMap<String, Value>,
    /// Remote state settings, if any.
    #[serde(default)]
    pub remote_state: Option<RemoteState>,
    /// The `terraform` block (module source).
    #[serde(default)]
    pub terraform: Option<TerraformBlock>,
    /// Generate blocks keyed by block name.
    #[serde(default, deserialize_with = "nullable_map")]
    pub generate: BTreeMap<String, GenerateBlock>,
}

impl ResolvedConfig {
    /// Module source URL, when the config names one.
    pub fn source(&self) -> Option<&str> {
        self.terraform
            .as_ref()
            .and_then(|t| t.source.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// The subset of the `terraform` block terrastage consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerraformBlock {
    #[serde(default)]
    pub source: Option<String>,
}

/// Remote state descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteState {
    /// Backend type, e.g. `s3`, `gcs`, `azurerm`.
    pub backend: String,
    /// Backend settings.
    #[serde(default, deserialize_with = "nullable_map")]
    pub config: BTreeMap<String, Value>,
    /// Generate a backend block into the module.
    #[serde(default)]
    pub generate: Option<RemoteStateGenerate>,
    /// Skip backend initialization entirely.
    #[serde(default)]
    pub disable_init: bool,
}

impl RemoteState {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            config: BTreeMap::new(),
            generate: None,
            disable_init: false,
        }
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Backend settings `terraform init` accepts, in key order.
    pub fn backend_settings(&self) -> impl Iterator<Item = (&String, &Value)> {
        let skipped: &[&str] = match self.backend.as_str() {
            "s3" => S3_TERRAGRUNT_ONLY,
            "gcs" => GCS_TERRAGRUNT_ONLY,
            _ => &[],
        };
        self.config
            .iter()
            .filter(move |(key, value)| !value.is_null() && !skipped.contains(&key.as_str()))
    }

    /// Backend arguments for `terraform init`, each `-backend-config=key=value`.
    pub fn to_init_args(&self) -> Vec<String> {
        if self.disable_init {
            return Vec::new();
        }
        self.backend_settings()
            .map(|(key, value)| format!("{}{}={}", BACKEND_CONFIG_FLAG, key, value_as_arg(value)))
            .collect()
    }
}

/// Render a config value the way it appears on the command line.
pub fn value_as_arg(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Settings for generating a backend block from remote state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteStateGenerate {
    pub path: String,
    #[serde(default)]
    pub if_exists: IfExists,
}

/// A `generate` block with pre-rendered contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateBlock {
    /// Target path, relative to the working directory.
    pub path: String,
    #[serde(default)]
    pub if_exists: IfExists,
    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: String,
    #[serde(default)]
    pub contents: String,
    #[serde(default)]
    pub disable_signature: bool,
    #[serde(default)]
    pub disable: bool,
}

impl GenerateBlock {
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            if_exists: IfExists::default(),
            comment_prefix: default_comment_prefix(),
            contents: contents.into(),
            disable_signature: false,
            disable: false,
        }
    }

    pub fn with_if_exists(mut self, if_exists: IfExists) -> Self {
        self.if_exists = if_exists;
        self
    }
}

fn default_comment_prefix() -> String {
    "# ".to_string()
}

/// What to do when a generated file already exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IfExists {
    #[default]
    Overwrite,
    /// Only replace files this tool generated earlier.
    OverwriteTerragrunt,
    Skip,
    Error,
}

impl std::fmt::Display for IfExists {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Overwrite => "overwrite",
            Self::OverwriteTerragrunt => "overwrite_terragrunt",
            Self::Skip => "skip",
            Self::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Inputs that are not an object are treated as empty.
fn lenient_inputs<'de, D>(deserializer: D) -> Result<BTreeMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Null => Ok(BTreeMap::new()),
        other => {
            warn!("Ignoring malformed inputs (expected an object, found {})", kind_of(&other));
            Ok(BTreeMap::new())
        }
    }
}

fn nullable_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<BTreeMap<String, T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
