use anyhow::Result;
use depot::resolver::{resolution_to_lockfile, resolve_dependencies};
use depot::vendor::TARGET_CACHE_DIR;
use depot::{Config, Manifest, RegistryClient, MANIFEST_NAME};
use std::path::PathBuf;

pub fn run(manifest: Option<String>) -> Result<()> {
    let manifest_path = match manifest {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir()?.join(MANIFEST_NAME),
    };

    let manifest = Manifest::load_path(&manifest_path)?;
    let lock_path = Manifest::lock_path(&manifest_path);

    println!("Resolving {}...", manifest_path.display());

    let config = Config::load()?;
    let cache_dir = Manifest::project_root(&manifest_path).join(TARGET_CACHE_DIR);
    let registry = RegistryClient::from_config(&config, &cache_dir)?;

    // Always resolve afresh; an existing lock is replaced, not consulted.
    let resolved = resolve_dependencies(&manifest.dependencies, &registry, None, &config.resolver)?;

    let lockfile = resolution_to_lockfile(&resolved);
    lockfile.save_to(&lock_path)?;

    println!(
        "✓ Locked {} package(s) in {}",
        lockfile.package_count(),
        lock_path.display()
    );

    Ok(())
}
