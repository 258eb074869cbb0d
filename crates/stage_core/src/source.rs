//! Module source staging.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::context::StagingContext;
use crate::error::{CoreError, CoreResult};

/// Directories never copied into a staged module.
const SKIPPED_DIRS: &[&str] = &[".git", ".terraform", ".terragrunt-cache", ".terrastage"];

/// Populates a staging directory with module source.
pub trait SourceFetcher {
    /// Stage the module named by `source` into `dest` and return the
    /// directory terraform should run in.
    fn fetch(&self, source: &str, ctx: &StagingContext, dest: &Path) -> CoreResult<PathBuf>;
}

/// A module source split at its `//` subdirectory marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub root: String,
    pub subdir: Option<String>,
}

impl SourceSpec {
    /// Split `source` into its root and optional `//subdir`.
    ///
    /// The `//` of a URL scheme (`https://`) is not a subdirectory marker.
    pub fn parse(source: &str) -> Self {
        let search_from = source.find("://").map_or(0, |i| i + 3);
        match source[search_from..].find("//") {
            Some(offset) => {
                let split = search_from + offset;
                let subdir = source[split + 2..].trim_matches('/');
                Self {
                    root: source[..split].to_string(),
                    subdir: (!subdir.is_empty()).then(|| subdir.to_string()),
                }
            }
            None => Self {
                root: source.to_string(),
                subdir: None,
            },
        }
    }

    /// Whether the root needs a network fetch (`git::`, `https://`, ...).
    pub fn is_remote(&self) -> bool {
        let root = self.root.strip_prefix("file://").unwrap_or(&self.root);
        root.contains("::") || root.contains("://")
    }
}

/// Fetcher for sources on the local filesystem.
///
/// Only the module directory (the `//subdir` part, when given) is copied;
/// the staging destination is emptied first.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalSourceFetcher;

impl LocalSourceFetcher {
    pub fn new() -> Self {
        Self
    }

    fn module_dir(&self, spec: &SourceSpec, ctx: &StagingContext) -> PathBuf {
        let root = spec.root.strip_prefix("file://").unwrap_or(&spec.root);
        let root = ctx.work_dir.join(root);
        match &spec.subdir {
            Some(subdir) => root.join(subdir),
            None => root,
        }
    }
}

impl SourceFetcher for LocalSourceFetcher {
    fn fetch(&self, source: &str, ctx: &StagingContext, dest: &Path) -> CoreResult<PathBuf> {
        let spec = SourceSpec::parse(source);
        if spec.is_remote() {
            return Err(CoreError::UnsupportedSource(source.to_string()));
        }

        let module_dir = self.module_dir(&spec, ctx);
        if !module_dir.is_dir() {
            return Err(CoreError::SourceNotFound(module_dir));
        }
        let module_dir = module_dir.canonicalize()?;

        fs::create_dir_all(dest)?;
        let dest = dest.canonicalize()?;
        ensure_disposable(&dest, &module_dir, ctx)?;

        info!("Staging module {} into {}", module_dir.display(), dest.display());
        fs_extra::dir::create_all(&dest, true)?;

        let mut options = fs_extra::file::CopyOptions::new();
        options.overwrite = true;
        let mut copied = 0usize;
        for entry in WalkDir::new(&module_dir)
            .min_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !is_skipped(e.path(), &dest))
        {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(&module_dir)
                .map_err(|_| CoreError::SourceNotFound(entry.path().to_path_buf()))?;
            let target = dest.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else {
                fs_extra::file::copy(entry.path(), &target, &options)?;
                copied += 1;
            }
        }

        debug!(files = copied, "Staged module source");
        Ok(dest)
    }
}

/// The staging destination is emptied before copying, so it must not hold
/// the module itself, the working directory or the resolved configuration.
fn ensure_disposable(dest: &Path, module_dir: &Path, ctx: &StagingContext) -> CoreResult<()> {
    if module_dir.starts_with(dest) {
        return Err(CoreError::UnsafeStageDir {
            stage_dir: dest.to_path_buf(),
            source_dir: module_dir.to_path_buf(),
        });
    }

    for protected in [&ctx.work_dir, &ctx.config_path] {
        if !protected.exists() {
            continue;
        }
        let protected = protected.canonicalize()?;
        if protected.starts_with(dest) {
            return Err(CoreError::StageDirOverlapsWorkDir {
                stage_dir: dest.to_path_buf(),
                protected,
            });
        }
    }
    Ok(())
}

fn is_skipped(path: &Path, dest: &Path) -> bool {
    path == dest
        || path
            .file_name()
            .map_or(false, |name| SKIPPED_DIRS.iter().any(|d| name == *d) && path.is_dir())
}

/// Validate a stage subdirectory taken from configuration input.
pub fn checked_subdir(subdir: &str) -> CoreResult<PathBuf> {
    let path = Path::new(subdir);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(CoreError::InvalidStageSubdir(subdir.to_string()));
    }
    Ok(path.to_path_buf())
}
