//! Resolve-then-install orchestration
//!
//! This is the core of depot: given a manifest path and a target directory,
//! compute the dependency closure implied by the companion lock file
//! (falling back to fresh resolution when the lock is absent) and fetch and
//! unpack every resolved package into the target directory, one subtree per
//! package pointing at nothing outside the target.
//!
//! All state for a run lives in an explicit per-call context. There is no
//! process-wide memoized configuration and no shared package cache: tarball
//! downloads go to a cache directory under the target that is dropped once
//! the run succeeds, so repeated invocations within one process each start
//! from a clean slate and two successive runs against different manifests
//! cannot leak settings into each other.
//!
//! # Examples
//!
//! ```no_run
//! use depot::install_from_manifest;
//!
//! let outcome = install_from_manifest("dist/vendor", "project/depot.json");
//! if !outcome.success {
//!     eprintln!("vendoring failed: {}", outcome.message.unwrap_or_default());
//! }
//! ```

use crate::installer::{install_package, verify_checksum};
use crate::resolver::{resolution_to_lockfile, resolve_dependencies, ResolvedPackage};
use crate::{
    Config, Error, FailureKind, Lockfile, Manifest, ProgressCallback, RegistryClient, Result,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable naming the active manifest file, set before each
/// resolution. This is the only process-global the orchestrator touches;
/// because of it, concurrent in-process invocations are not supported.
pub const MANIFEST_ENV: &str = "DEPOT_MANIFEST";

/// Directory under the target holding per-run tarball downloads
pub const TARGET_CACHE_DIR: &str = ".depot-cache";

/// Result of a vendoring run: a success flag plus an optional message.
///
/// On failure the message has already been written to standard output for
/// operator visibility, and `failure_kind` records which stage failed so
/// callers needing finer handling are not forced through string matching.
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub success: bool,
    pub message: Option<String>,
    pub failure_kind: Option<FailureKind>,
}

impl InstallOutcome {
    fn succeeded() -> Self {
        Self {
            success: true,
            message: None,
            failure_kind: None,
        }
    }

    fn failed(err: &Error) -> Self {
        Self {
            success: false,
            message: Some(err.to_string()),
            failure_kind: Some(err.kind()),
        }
    }
}

/// Per-call installation context
///
/// Carries everything a single run needs, constructed fresh on every
/// invocation so nothing persists between runs.
struct InstallContext {
    target_dir: PathBuf,
    manifest_path: PathBuf,
    lock_path: PathBuf,
    registry: RegistryClient,
    config: Config,
    progress: Option<ProgressCallback>,
}

impl InstallContext {
    fn new(
        target_dir: &Path,
        manifest_path: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<Self> {
        let config = Config::load()?;
        let lock_path = Manifest::lock_path(manifest_path);

        // Downloads are cached under the target itself: no shared or global
        // package store is ever consulted
        let cache_dir = target_dir.join(TARGET_CACHE_DIR);
        let registry = RegistryClient::from_config(&config, &cache_dir)?;

        Ok(Self {
            target_dir: target_dir.to_path_buf(),
            manifest_path: manifest_path.to_path_buf(),
            lock_path,
            registry,
            config,
            progress,
        })
    }
}

/// Resolve the manifest's dependency closure and install it into the target
/// directory.
///
/// The lock file is looked up as `<manifest filename>.lock` next to the
/// manifest; when absent, resolution runs fresh and the resulting pins are
/// written there. Any failure during configuration, resolution, fetch, or
/// unpack terminates the run: the failure message goes to standard output
/// and the returned outcome carries it together with the failure kind. No
/// retry is attempted and partially installed packages are left in place.
pub fn install_from_manifest<P: AsRef<Path>, Q: AsRef<Path>>(
    target_dir: P,
    manifest_path: Q,
) -> InstallOutcome {
    install_from_manifest_with_progress(target_dir.as_ref(), manifest_path.as_ref(), None)
}

/// Same as [`install_from_manifest`], reporting progress through a callback
pub fn install_from_manifest_with_progress(
    target_dir: &Path,
    manifest_path: &Path,
    progress: Option<ProgressCallback>,
) -> InstallOutcome {
    match run_install(target_dir, manifest_path, progress) {
        Ok(()) => InstallOutcome::succeeded(),
        Err(e) => {
            // Operator visibility, independent of what the caller does with
            // the returned message
            println!("{}", e);
            InstallOutcome::failed(&e)
        }
    }
}

fn run_install(
    target_dir: &Path,
    manifest_path: &Path,
    progress: Option<ProgressCallback>,
) -> Result<()> {
    let ctx = InstallContext::new(target_dir, manifest_path, progress)?;

    // Point the process at the active manifest before resolution
    std::env::set_var(MANIFEST_ENV, &ctx.manifest_path);

    let manifest = Manifest::load_path(&ctx.manifest_path)?;
    let lock = Lockfile::load_from(&ctx.lock_path)?;
    let had_lock = lock.is_some();

    let resolved = resolve_dependencies(
        &manifest.dependencies,
        &ctx.registry,
        lock.as_ref(),
        &ctx.config.resolver,
    )?;

    install_resolved(&ctx, &resolved)?;

    // A fresh resolution writes its pins next to the manifest; an existing
    // lock is never rewritten on the success path
    if !had_lock && !resolved.is_empty() {
        resolution_to_lockfile(&resolved).save_to(&ctx.lock_path)?;
    }

    // The target ships as-is into a deployable archive: after a successful
    // run it holds the resolved closure and nothing else, so the per-run
    // download cache is dropped
    let cache_dir = ctx.target_dir.join(TARGET_CACHE_DIR);
    if cache_dir.exists() {
        std::fs::remove_dir_all(&cache_dir)?;
    }

    Ok(())
}

fn install_resolved(
    ctx: &InstallContext,
    resolved: &HashMap<String, ResolvedPackage>,
) -> Result<()> {
    std::fs::create_dir_all(&ctx.target_dir)?;

    // Deterministic install order
    let mut names: Vec<&String> = resolved.keys().collect();
    names.sort();

    for name in names {
        let pkg = &resolved[name];

        if let Some(ref cb) = ctx.progress {
            cb(&format!("Installing {}@{}", pkg.name, pkg.version), 0, 100);
        }

        let tarball = ctx
            .registry
            .fetch_tarball(&pkg.name, &pkg.version, &pkg.checksum)?;
        verify_checksum(&tarball, &pkg.name, &pkg.checksum, ctx.progress.clone())?;
        install_package(&tarball, &ctx.target_dir, &pkg.name, ctx.progress.clone())?;
    }

    Ok(())
}
