use anyhow::{bail, Result};
use depot::Manifest;

pub fn run() -> Result<()> {
    let current_dir = std::env::current_dir()?;

    if Manifest::exists(&current_dir) {
        bail!("A depot.json already exists in this directory");
    }

    let dir_name = current_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("my-project")
        .to_lowercase();

    let mut manifest = Manifest::new();
    manifest.name = Some(dir_name);
    manifest.save(&current_dir)?;

    println!("Created depot.json");
    println!("Add dependencies to the \"dependencies\" table, then run: depot vendor");

    Ok(())
}
