//! Package fetching support: checksum verification and tarball extraction
//!
//! Packages arrive as gzipped tarballs. Each one is verified against its
//! SHA256 checksum and then unpacked into `{target_dir}/{package_name}/`,
//! one subtree per resolved package.
//!
//! # Examples
//!
//! ```no_run
//! use depot::{install_package, verify_checksum};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! verify_checksum("left-pad-1.0.0.tar.gz", "left-pad", "abc123...", None)?;
//! let installed = install_package("left-pad-1.0.0.tar.gz", "vendor", "left-pad", None)?;
//! println!("Installed to: {:?}", installed);
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tar::Archive;

/// Progress callback for installation/verification operations
///
/// Called with:
/// - `message`: Description of current operation (e.g., "Extracting package...")
/// - `current`: Current progress (bytes processed, or 0-100 for percentage)
/// - `total`: Total work (total bytes, or 100 for percentage)
pub type ProgressCallback = Arc<dyn Fn(&str, u64, u64) + Send + Sync>;

/// Suffix used for the temporary backup of a previously installed package
const BACKUP_SUFFIX: &str = ".depot-backup";

/// Compute the SHA256 digest of a file as a lowercase hex string
pub fn file_sha256<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut file = File::open(path.as_ref())?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0; 8192];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Verify a package tarball against its expected SHA256 checksum
///
/// The comparison is case-insensitive on the hex digits.
pub fn verify_checksum<P: AsRef<Path>>(
    tarball_path: P,
    package: &str,
    expected_checksum: &str,
    progress: Option<ProgressCallback>,
) -> Result<()> {
    let tarball_path = tarball_path.as_ref();

    if expected_checksum.is_empty() {
        return Err(Error::Unpack(format!(
            "empty checksum recorded for {}",
            package
        )));
    }

    if let Some(ref cb) = progress {
        cb("Verifying checksum...", 0, 100);
    }

    let file_size = fs::metadata(tarball_path)?.len();

    let mut file = File::open(tarball_path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0; 8192];
    let mut bytes_processed: u64 = 0;

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
        bytes_processed += bytes_read as u64;

        if let Some(ref cb) = progress {
            cb("Verifying checksum...", bytes_processed, file_size);
        }
    }

    let computed_hash = format!("{:x}", hasher.finalize());

    if computed_hash.eq_ignore_ascii_case(expected_checksum) {
        if let Some(ref cb) = progress {
            cb("Checksum verified", file_size, file_size);
        }
        Ok(())
    } else {
        Err(Error::ChecksumMismatch {
            package: package.to_string(),
            expected: expected_checksum.to_string(),
            computed: computed_hash,
        })
    }
}

/// Install a package from a tarball into the target directory
///
/// Extracts the tarball to `{target_dir}/{package_name}/`, creating the
/// target directory if needed. An already installed copy of the package is
/// moved aside first and restored if extraction fails, so a failed run does
/// not destroy a previously good install. Tarballs whose root folder name
/// differs from the package name are detected and renamed.
///
/// # Returns
///
/// The path where the package was installed
pub fn install_package<P: AsRef<Path>>(
    tarball_path: P,
    target_dir: P,
    package_name: &str,
    progress: Option<ProgressCallback>,
) -> Result<PathBuf> {
    let tarball_path = tarball_path.as_ref();
    let target_dir = target_dir.as_ref();

    if !tarball_path.exists() {
        return Err(Error::Unpack(format!(
            "package tarball not found: {}",
            tarball_path.display()
        )));
    }

    fs::create_dir_all(target_dir)?;

    let installed_path = target_dir.join(package_name);

    // Move an existing install aside before extracting over it
    let mut backup_dir: Option<PathBuf> = None;
    if installed_path.exists() {
        let backup_path = target_dir.join(format!("{}{}", package_name, BACKUP_SUFFIX));

        // Remove any stale backup from a previous failed install
        if backup_path.exists() {
            let _ = fs::remove_dir_all(&backup_path);
        }

        if let Some(ref cb) = progress {
            cb(&format!("Backing up existing {}...", package_name), 0, 100);
        }

        fs::rename(&installed_path, &backup_path).map_err(|e| {
            Error::Unpack(format!(
                "failed to move existing package '{}' aside: {}",
                package_name, e
            ))
        })?;

        backup_dir = Some(backup_path);
    }

    if let Some(ref cb) = progress {
        cb(&format!("Extracting {}...", package_name), 0, 100);
    }

    let restore_backup = |backup: &Option<PathBuf>| {
        if let Some(backup_path) = backup {
            if backup_path.exists() {
                let _ = fs::rename(backup_path, &installed_path);
            }
        }
    };

    // Snapshot the top-level entries so a tarball with an unexpected root
    // folder name can be located afterwards by diffing
    let before: HashSet<std::ffi::OsString> = top_level_entries(target_dir)?;

    let tar_gz = match File::open(tarball_path) {
        Ok(f) => f,
        Err(e) => {
            restore_backup(&backup_dir);
            return Err(e.into());
        }
    };
    let tar = GzDecoder::new(tar_gz);
    let mut archive = Archive::new(tar);

    if let Err(e) = archive.unpack(target_dir) {
        restore_backup(&backup_dir);
        return Err(Error::Unpack(format!(
            "failed to extract {}: {}",
            package_name, e
        )));
    }

    if let Some(ref cb) = progress {
        cb(&format!("Extracted {}", package_name), 100, 100);
    }

    if installed_path.exists() {
        if let Some(ref backup_path) = backup_dir {
            let _ = fs::remove_dir_all(backup_path);
        }
        return Ok(installed_path);
    }

    // The tarball's root folder has a different name than the package;
    // find the newly created directory and rename it
    let after = top_level_entries(target_dir)?;
    let mut created: Vec<PathBuf> = after
        .difference(&before)
        .map(|name| target_dir.join(name))
        .filter(|p| p.is_dir())
        .collect();

    match created.len() {
        1 => {
            let extracted_dir = created.remove(0);
            if let Err(e) = fs::rename(&extracted_dir, &installed_path) {
                restore_backup(&backup_dir);
                return Err(Error::Unpack(format!(
                    "failed to rename package directory from '{}' to '{}': {}",
                    extracted_dir.display(),
                    installed_path.display(),
                    e
                )));
            }
            if let Some(ref backup_path) = backup_dir {
                let _ = fs::remove_dir_all(backup_path);
            }
            Ok(installed_path)
        }
        _ => {
            restore_backup(&backup_dir);
            Err(Error::Unpack(format!(
                "extraction of {} succeeded but its package directory was not found in {}",
                package_name,
                target_dir.display()
            )))
        }
    }
}

fn top_level_entries(dir: &Path) -> Result<HashSet<std::ffi::OsString>> {
    let mut entries = HashSet::new();
    for entry in fs::read_dir(dir)? {
        entries.insert(entry?.file_name());
    }
    Ok(entries)
}
