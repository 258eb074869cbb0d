//! Staging pipeline driver.

use std::path::{Path, PathBuf};

use serde_json::Value;
use stage_config::{ConfigReader, EnvSnapshot, GenerateBlock, ResolvedConfig};
use stage_iac::{
    backend_block, reconcile, write_backend_config, write_variables_file, BackendScanner,
    GenerateOutcome, IacError, ModuleVariableReader, Reconciliation, BACKEND_CONFIG_FILE,
};
use tracing::{debug, error, info, warn};

use crate::context::StagingContext;
use crate::error::CoreResult;
use crate::generate::{CodeGenerator, FileGenerator};
use crate::report::{Stage, StageOutcome, StagingReport};
use crate::source::{checked_subdir, LocalSourceFetcher, SourceFetcher};

/// Subject of the generate record for the remote state backend block.
const REMOTE_STATE_SUBJECT: &str = "remote_state";

/// Runs the staging stages for one deployment unit.
pub struct StagingPipeline {
    fetcher: Box<dyn SourceFetcher>,
    generator: Box<dyn CodeGenerator>,
}

impl Default for StagingPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl StagingPipeline {
    /// Create a pipeline staging local sources and writing generate blocks to disk.
    pub fn new() -> Self {
        Self {
            fetcher: Box::new(LocalSourceFetcher::new()),
            generator: Box::new(FileGenerator),
        }
    }

    pub fn with_fetcher(mut self, fetcher: impl SourceFetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    pub fn with_generator(mut self, generator: impl CodeGenerator + 'static) -> Self {
        self.generator = Box::new(generator);
        self
    }

    /// Load the resolved configuration from `ctx.config_path` and stage it.
    ///
    /// Never fails: every problem ends up in the returned report.
    pub fn run(&self, ctx: &StagingContext, env: &EnvSnapshot) -> StagingReport {
        let mut report = StagingReport::new(&ctx.work_dir);

        let config = match ConfigReader::read(&ctx.config_path) {
            Ok(config) => config,
            Err(e) => {
                error!(stage = "config", "Failed to load configuration: {}", e);
                report.record(Stage::Config, StageOutcome::failed(e));
                for stage in [Stage::Source, Stage::Generate, Stage::Backend, Stage::Variables] {
                    report.record(stage, StageOutcome::skipped("configuration could not be loaded"));
                }
                return report;
            }
        };

        info!(stage = "config", path = %ctx.config_path.display(), "Loaded configuration");
        report.record(
            Stage::Config,
            StageOutcome::Completed {
                artifacts: Vec::new(),
            },
        );
        self.stage_all(ctx, &config, env, &mut report);
        report
    }

    /// Stage an already loaded configuration.
    pub fn run_resolved(&self, ctx: &StagingContext, config: &ResolvedConfig, env: &EnvSnapshot) -> StagingReport {
        let mut report = StagingReport::new(&ctx.work_dir);
        self.stage_all(ctx, config, env, &mut report);
        report
    }

    fn stage_all(&self, ctx: &StagingContext, config: &ResolvedConfig, env: &EnvSnapshot, report: &mut StagingReport) {
        info!(profile = %ctx.profile, work_dir = %ctx.work_dir.display(), "Starting staging run");
        if ctx.verbose {
            info!(
                stage_dir = %ctx.stage_dir.display(),
                subdir_var = %ctx.subdir_var,
                tfvars_file = %ctx.tfvars_file,
                inputs = config.inputs.len(),
                "Staging parameters"
            );
            for (variable, _) in env.tf_var_overrides() {
                info!(variable = variable, "Variable set through the environment");
            }
        }

        let working_dir = match self.stage_source(ctx, config, report) {
            Some(dir) => dir,
            None => {
                for stage in [Stage::Generate, Stage::Backend, Stage::Variables] {
                    report.record(stage, StageOutcome::skipped("module source was not staged"));
                }
                return;
            }
        };
        report.working_dir = working_dir.clone();

        self.stage_generate(&working_dir, config, report);
        self.stage_backend(ctx, &working_dir, config, report);
        self.stage_variables(ctx, &working_dir, config, env, report);

        info!(
            working_dir = %working_dir.display(),
            failed = report.has_failures(),
            "Staging run finished"
        );
    }

    /// Returns the directory later stages work in, or `None` when staging failed.
    fn stage_source(&self, ctx: &StagingContext, config: &ResolvedConfig, report: &mut StagingReport) -> Option<PathBuf> {
        let Some(source) = config.source() else {
            debug!("No terraform source configured, staging in place");
            report.record(Stage::Source, StageOutcome::skipped("no terraform source configured"));
            return Some(ctx.work_dir.clone());
        };

        match self.fetch_source(source, ctx, config) {
            Ok(dir) => {
                info!(stage = "source", source = source, dir = %dir.display(), "Staged module source");
                report.record(Stage::Source, StageOutcome::completed(&dir));
                Some(dir)
            }
            Err(e) => {
                error!(stage = "source", source = source, "Failed to stage module source: {}", e);
                report.record(Stage::Source, StageOutcome::failed(e));
                None
            }
        }
    }

    fn fetch_source(&self, source: &str, ctx: &StagingContext, config: &ResolvedConfig) -> CoreResult<PathBuf> {
        let subdir = stage_subdir(config, &ctx.subdir_var)?;
        if ctx.verbose {
            info!(
                subdir_var = %ctx.subdir_var,
                subdir = %subdir.display(),
                "Stage subdirectory from input variable"
            );
        }
        let dest = ctx.stage_dir.join(subdir);
        self.fetcher.fetch(source, ctx, &dest)
    }

    fn stage_generate(&self, working_dir: &Path, config: &ResolvedConfig, report: &mut StagingReport) {
        let mut blocks: Vec<(&str, GenerateBlock)> = config
            .generate
            .iter()
            .map(|(name, block)| (name.as_str(), block.clone()))
            .collect();

        if let Some(remote) = &config.remote_state {
            if let Some(settings) = &remote.generate {
                let block =
                    GenerateBlock::new(settings.path.as_str(), backend_block(remote)).with_if_exists(settings.if_exists);
                blocks.push((REMOTE_STATE_SUBJECT, block));
            }
        }

        if blocks.is_empty() {
            report.record(Stage::Generate, StageOutcome::skipped("no generate blocks configured"));
            return;
        }

        for (name, block) in &blocks {
            if block.disable {
                debug!(block = name, "Generate block disabled");
                report.record_item(Stage::Generate, *name, StageOutcome::skipped("generate block is disabled"));
                continue;
            }

            let outcome = match self.generator.generate(working_dir, block) {
                Ok(GenerateOutcome::Written(path)) => {
                    info!(stage = "generate", block = name, path = %path.display(), "Generated file");
                    StageOutcome::completed(path)
                }
                Ok(GenerateOutcome::Skipped(path)) => {
                    info!(stage = "generate", block = name, path = %path.display(), "File exists, skipping");
                    StageOutcome::skipped(format!("{} already exists", path.display()))
                }
                Err(e) => {
                    error!(stage = "generate", block = name, "Failed to generate file: {}", e);
                    StageOutcome::failed(e)
                }
            };
            report.record_item(Stage::Generate, *name, outcome);
        }
    }

    fn stage_backend(&self, ctx: &StagingContext, working_dir: &Path, config: &ResolvedConfig, report: &mut StagingReport) {
        let Some(remote) = &config.remote_state else {
            report.record(Stage::Backend, StageOutcome::skipped("no remote_state configured"));
            return;
        };
        if remote.disable_init {
            debug!(backend = %remote.backend, "Backend initialization disabled");
            report.record(Stage::Backend, StageOutcome::skipped("remote_state.disable_init is set"));
            return;
        }

        let warning = match BackendScanner::ensure_backend_declared(working_dir, &remote.backend, &ctx.config_path) {
            Ok(()) => {
                debug!(backend = %remote.backend, "Module declares backend");
                None
            }
            Err(e @ IacError::BackendNotDeclared { .. }) => {
                warn!(stage = "backend", "{}", e);
                Some(e.to_string())
            }
            Err(e) => {
                error!(stage = "backend", "Backend declaration scan failed: {}", e);
                Some(e.to_string())
            }
        };

        let outcome = match write_backend_config(working_dir.join(BACKEND_CONFIG_FILE), &remote.to_init_args()) {
            Ok(path) => {
                info!(stage = "backend", path = %path.display(), "Wrote backend config");
                match warning {
                    Some(message) => StageOutcome::Warned {
                        message,
                        artifacts: vec![path],
                    },
                    None => StageOutcome::completed(path),
                }
            }
            Err(e) => {
                error!(stage = "backend", "Failed to write backend config: {}", e);
                StageOutcome::failed(e)
            }
        };
        report.record(Stage::Backend, outcome);
    }

    fn stage_variables(
        &self,
        ctx: &StagingContext,
        working_dir: &Path,
        config: &ResolvedConfig,
        env: &EnvSnapshot,
        report: &mut StagingReport,
    ) {
        let declared = match ModuleVariableReader::read_declared_variables(working_dir) {
            Ok(declared) => declared,
            Err(e) => {
                error!(stage = "variables", "Could not read module variables, skipping variables file: {}", e);
                report.record(Stage::Variables, StageOutcome::failed(e));
                return;
            }
        };
        debug!(declared = declared.len(), "Read module variables");

        let Reconciliation { variables, omitted } = reconcile(&config.inputs, &declared, env);
        for omission in &omitted {
            info!(
                variable = %omission.name,
                reason = %omission.reason,
                env_var = ?omission.env_var,
                "Omitting input from variables file"
            );
        }
        report.omitted = omitted;

        let outcome = match write_variables_file(working_dir.join(&ctx.tfvars_file), &variables) {
            Ok(path) => {
                info!(stage = "variables", path = %path.display(), variables = variables.len(), "Wrote variables file");
                log_replication_hint(working_dir, &ctx.tfvars_file);
                StageOutcome::completed(path)
            }
            Err(e) => {
                error!(stage = "variables", "Failed to write variables file: {}", e);
                StageOutcome::failed(e)
            }
        };
        report.record(Stage::Variables, outcome);
    }
}

/// Stage subdirectory named by the `subdir_var` input.
fn stage_subdir(config: &ResolvedConfig, subdir_var: &str) -> CoreResult<PathBuf> {
    let value = match config.inputs.get(subdir_var) {
        None | Some(Value::Null) => "",
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            warn!(variable = subdir_var, "Ignoring non-string stage subdirectory input: {}", other);
            ""
        }
    };
    checked_subdir(value)
}

fn log_replication_hint(working_dir: &Path, tfvars_file: &str) {
    if working_dir.join(BACKEND_CONFIG_FILE).is_file() {
        info!(
            "To replicate: terraform -chdir=\"{}\" init -backend-config={}",
            working_dir.display(),
            BACKEND_CONFIG_FILE
        );
    }
    info!(
        "To replicate: terraform -chdir=\"{}\" plan -var-file=\"{}\"",
        working_dir.display(),
        tfvars_file
    );
}
