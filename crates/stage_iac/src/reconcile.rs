//! Reconciliation of resolved inputs against a module and the environment.
//!
//! Terraform gives `TF_VAR_` environment variables lower precedence than a
//! `-var-file`, so an input that the environment already overrides must not
//! be written to the variables file: a later direct terraform run would
//! silently pick the file value over the user's override. Inputs the module
//! does not declare are dropped because terraform rejects or warns about
//! values for undeclared variables.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use stage_config::EnvSnapshot;

use crate::module::ModuleVariableSet;

/// Variables that may be written to the variables file, in name order.
pub type ReconciledVariables = BTreeMap<String, Value>;

/// Why an input was left out of the variables file.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OmissionReason {
    AlreadyOverriddenByEnv,
    NotDeclaredByModule,
}

impl OmissionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyOverriddenByEnv => "already-overridden-by-env",
            Self::NotDeclaredByModule => "not-declared-by-module",
        }
    }
}

impl std::fmt::Display for OmissionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An input left out of the variables file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Omission {
    pub name: String,
    pub reason: OmissionReason,
    /// The overriding environment variable, for env omissions.
    pub env_var: Option<String>,
}

/// Outcome of reconciling one set of inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub variables: ReconciledVariables,
    /// One record per omitted input, in input name order.
    pub omitted: Vec<Omission>,
}

/// Select the inputs to write: those the module declares and the
/// environment does not already override through `TF_VAR_<name>`.
///
/// An environment override wins over the declaration check, so an input
/// that is both overridden and undeclared is reported as overridden.
pub fn reconcile(
    inputs: &BTreeMap<String, Value>,
    declared: &ModuleVariableSet,
    env: &EnvSnapshot,
) -> Reconciliation {
    let mut result = Reconciliation::default();

    for (name, value) in inputs {
        let alias = EnvSnapshot::tf_var_alias(name);
        if env.contains(&alias) {
            result.omitted.push(Omission {
                name: name.clone(),
                reason: OmissionReason::AlreadyOverriddenByEnv,
                env_var: Some(alias),
            });
        } else if !declared.contains(name) {
            result.omitted.push(Omission {
                name: name.clone(),
                reason: OmissionReason::NotDeclaredByModule,
                env_var: None,
            });
        } else {
            result.variables.insert(name.clone(), value.clone());
        }
    }

    result
}
