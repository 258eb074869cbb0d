//! Stage command - run the staging pipeline for one deployment unit.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use stage_config::EnvSnapshot;
use stage_core::context::{resolve_stage_dir, resolve_work_dir};
use stage_core::{Profile, StageOutcome, StagingContext, StagingPipeline, StagingReport};

use crate::cli::Cli;

pub fn execute(cli: &Cli) -> Result<StagingReport> {
    let cwd = std::env::current_dir().context("Failed to determine the current directory")?;
    let ctx = build_context(&cwd, cli)?;
    debug!(?ctx, "Resolved staging context");

    let report = StagingPipeline::new().run(&ctx, &EnvSnapshot::from_process());
    print_summary(&report);
    Ok(report)
}

/// Turn command line flags into a staging context rooted at `cwd`.
pub fn build_context(cwd: &Path, cli: &Cli) -> Result<StagingContext> {
    let profile = Profile::from(cli.profile);
    let work_dir = resolve_work_dir(cwd, &cli.workdir);
    if !work_dir.is_dir() {
        anyhow::bail!("Working directory not found: {}", work_dir.display());
    }

    let mut ctx = StagingContext::new(&work_dir, resolve_stage_dir(cwd, &cli.stagedir, profile))
        .with_profile(profile)
        .with_subdir_var(&cli.subdirvar)
        .verbose(cli.verbose);
    if let Some(config) = &cli.config {
        ctx = ctx.with_config_path(cwd.join(config));
    }
    if let Some(name) = &cli.var_file_name {
        ctx = ctx.with_tfvars_file(name);
    }
    Ok(ctx)
}

fn print_summary(report: &StagingReport) {
    println!("📦 Staged {}", report.working_dir.display());
    for record in &report.records {
        let label = match &record.subject {
            Some(subject) => format!("{} ({})", record.stage, subject),
            None => record.stage.to_string(),
        };
        match &record.outcome {
            StageOutcome::Completed { artifacts } => match artifacts.first() {
                Some(path) => println!("   ✅ {}: {}", label, path.display()),
                None => println!("   ✅ {}", label),
            },
            StageOutcome::Warned { message, .. } => println!("   ⚠️  {}: {}", label, message),
            StageOutcome::Failed { message } => println!("   ❌ {}: {}", label, message),
            StageOutcome::Skipped { reason } => println!("   ⏭️  {}: {}", label, reason),
        }
    }
    if !report.omitted.is_empty() {
        println!("   Omitted inputs:");
        for omission in &report.omitted {
            println!("      - {} ({})", omission.name, omission.reason);
        }
    }
}
