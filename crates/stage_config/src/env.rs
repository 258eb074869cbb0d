//! Snapshot of the host process environment.

use std::collections::BTreeMap;

/// Prefix terraform uses to read variable values from the environment.
pub const TF_VAR_PREFIX: &str = "TF_VAR_";

/// Immutable name/value view of the environment, taken once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    ///
    /// Non UTF-8 names and values are converted lossily.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect()
    }

    /// Build a snapshot from `NAME=value` entries.
    ///
    /// Entries are split on the first `=`; the name is trimmed and entries
    /// without `=` are dropped.
    pub fn parse<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        entries
            .into_iter()
            .filter_map(|entry| {
                entry
                    .as_ref()
                    .split_once('=')
                    .map(|(k, v)| (k.trim().to_string(), v.to_string()))
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Terraform variables set through the environment, as
    /// `(variable, value)` pairs without the `TF_VAR_` prefix.
    pub fn tf_var_overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars
            .iter()
            .filter_map(|(k, v)| k.strip_prefix(TF_VAR_PREFIX).map(|name| (name, v.as_str())))
    }

    /// Environment variable name terraform reads for `variable`.
    pub fn tf_var_alias(variable: &str) -> String {
        format!("{}{}", TF_VAR_PREFIX, variable)
    }

    /// Value of the `TF_VAR_` override for `variable`, if set.
    pub fn tf_var_override(&self, variable: &str) -> Option<&str> {
        self.get(&Self::tf_var_alias(variable))
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
