//! Staging run report.

use std::path::PathBuf;

use serde::Serialize;
use stage_iac::Omission;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Config,
    Source,
    Generate,
    Backend,
    Variables,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Source => "source",
            Self::Generate => "generate",
            Self::Backend => "backend",
            Self::Variables => "variables",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a stage ended.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum StageOutcome {
    Completed { artifacts: Vec<PathBuf> },
    /// Finished, but something needs a human look.
    Warned { message: String, artifacts: Vec<PathBuf> },
    Failed { message: String },
    Skipped { reason: String },
}

impl StageOutcome {
    pub fn completed(artifact: impl Into<PathBuf>) -> Self {
        Self::Completed {
            artifacts: vec![artifact.into()],
        }
    }

    pub fn failed(message: impl ToString) -> Self {
        Self::Failed {
            message: message.to_string(),
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn artifacts(&self) -> &[PathBuf] {
        match self {
            Self::Completed { artifacts } | Self::Warned { artifacts, .. } => artifacts.as_slice(),
            Self::Failed { .. } | Self::Skipped { .. } => &[],
        }
    }
}

/// Outcome of one stage, or of one item within a stage.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StageRecord {
    pub stage: Stage,
    /// The item within the stage, e.g. a generate block name.
    pub subject: Option<String>,
    #[serde(flatten)]
    pub outcome: StageOutcome,
}

/// Everything a staging run did.
#[derive(Debug, Clone, Serialize)]
pub struct StagingReport {
    /// Directory terraform should run in
    pub working_dir: PathBuf,
    pub records: Vec<StageRecord>,
    /// Inputs left out of the variables file
    pub omitted: Vec<Omission>,
}

impl StagingReport {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            records: Vec::new(),
            omitted: Vec::new(),
        }
    }

    pub fn record(&mut self, stage: Stage, outcome: StageOutcome) {
        self.records.push(StageRecord {
            stage,
            subject: None,
            outcome,
        });
    }

    pub fn record_item(&mut self, stage: Stage, subject: impl Into<String>, outcome: StageOutcome) {
        self.records.push(StageRecord {
            stage,
            subject: Some(subject.into()),
            outcome,
        });
    }

    pub fn has_failures(&self) -> bool {
        self.records.iter().any(|r| r.outcome.is_failure())
    }

    /// Records of `stage`, in the order they happened.
    pub fn stage(&self, stage: Stage) -> impl Iterator<Item = &StageRecord> {
        self.records.iter().filter(move |r| r.stage == stage)
    }

    /// Every file the run wrote.
    pub fn artifacts(&self) -> Vec<&PathBuf> {
        self.records.iter().flat_map(|r| r.outcome.artifacts()).collect()
    }
}
