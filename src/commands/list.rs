use anyhow::Result;
use depot::vendor::TARGET_CACHE_DIR;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn run(target: String) -> Result<()> {
    let target_dir = PathBuf::from(target);

    if !target_dir.exists() {
        println!("No vendored packages ({} does not exist)", target_dir.display());
        return Ok(());
    }

    let mut packages: Vec<(String, usize)> = Vec::new();
    for entry in std::fs::read_dir(&target_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == TARGET_CACHE_DIR || name.starts_with('.') {
            continue;
        }
        packages.push((name, count_files(&entry.path())));
    }

    if packages.is_empty() {
        println!("No vendored packages in {}", target_dir.display());
        return Ok(());
    }

    packages.sort();

    println!("Vendored packages in {}:", target_dir.display());
    for (name, files) in &packages {
        println!("  {} ({} files)", name, files);
    }
    println!();
    println!("{} package(s)", packages.len());

    Ok(())
}

fn count_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count()
}
