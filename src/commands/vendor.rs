use anyhow::{bail, Result};
use depot::{install_from_manifest_with_progress, ProgressCallback, MANIFEST_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;

/// Create an indicatif-based progress callback for CLI display
fn create_spinner_callback() -> ProgressCallback {
    let spinner = Arc::new(std::sync::Mutex::new(ProgressBar::new_spinner()));
    {
        let s = spinner.lock().unwrap();
        s.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        s.enable_steady_tick(std::time::Duration::from_millis(80));
    }

    let spinner_clone = spinner.clone();
    Arc::new(move |msg: &str, current: u64, total: u64| {
        let s = spinner_clone.lock().unwrap();
        if current >= total && total > 0 {
            s.finish_with_message(format!("✓ {}", msg));
        } else {
            s.set_message(msg.to_string());
        }
    })
}

pub fn run(manifest: Option<String>, target: String, quiet: bool) -> Result<()> {
    let manifest_path = match manifest {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir()?.join(MANIFEST_NAME),
    };
    let target_dir = PathBuf::from(target);

    if !quiet {
        println!("Vendoring {} into {}", manifest_path.display(), target_dir.display());
        println!();
    }

    let progress = if quiet {
        None
    } else {
        Some(create_spinner_callback())
    };

    let outcome = install_from_manifest_with_progress(&target_dir, &manifest_path, progress);

    if !outcome.success {
        // The failure message has already been reported on stdout.
        match outcome.failure_kind {
            Some(kind) => bail!("vendoring failed ({})", kind),
            None => bail!("vendoring failed"),
        }
    }

    if !quiet {
        println!();
        println!("✓ Packages vendored into {}", target_dir.display());
    }

    Ok(())
}
