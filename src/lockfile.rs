//! Lock file parsing and generation
//!
//! The lock file pins the exact resolved version and checksum of every
//! package in the dependency closure, so repeated vendoring runs are
//! reproducible. It lives next to the manifest as `<manifest filename>.lock`
//! (depot.json -> depot.json.lock), uses TOML, and should be committed to
//! version control.
//!
//! An absent lock file is a valid state: resolution then runs fresh against
//! the registry and the resolver writes a new lock.
//!
//! # Examples
//!
//! ```no_run
//! use depot::{Lockfile, Manifest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let lock_path = Manifest::lock_path("project/depot.json");
//! if let Some(lockfile) = Lockfile::load_from(&lock_path)? {
//!     println!("{} pinned packages", lockfile.package_count());
//! }
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Represents the entire lock file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lockfile {
    /// Metadata about the lock file
    #[serde(rename = "metadata")]
    pub metadata: LockfileMetadata,

    /// Map of package name to pinned package info
    #[serde(rename = "package", default)]
    pub packages: HashMap<String, LockedPackage>,
}

/// Metadata about the lock file generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockfileMetadata {
    /// Version of depot that generated this lock file
    pub depot_version: String,

    /// Timestamp when the lock file was generated (ISO 8601 format)
    pub generated_at: String,
}

/// Information about a pinned package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedPackage {
    /// Exact version pinned
    pub version: String,

    /// SHA256 checksum of the tarball
    pub checksum: String,

    /// Dependencies of this package (name -> version constraint)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<HashMap<String, String>>,
}

impl Lockfile {
    /// Create a new empty lock file
    pub fn new() -> Self {
        Self {
            metadata: LockfileMetadata {
                depot_version: env!("CARGO_PKG_VERSION").to_string(),
                generated_at: chrono::Utc::now().to_rfc3339(),
            },
            packages: HashMap::new(),
        }
    }

    /// Load lock file from a specific path; `Ok(None)` when absent
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)?;
        let lockfile: Lockfile = toml::from_str(&contents)
            .map_err(|e| Error::InvalidManifest(format!("failed to parse lock file: {}", e)))?;

        Ok(Some(lockfile))
    }

    /// Save lock file to a specific path
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), toml_string)?;
        Ok(())
    }

    /// Add or update a package pin
    pub fn update_package(
        &mut self,
        name: String,
        version: String,
        checksum: String,
        dependencies: Option<HashMap<String, String>>,
    ) {
        self.packages.insert(
            name,
            LockedPackage {
                version,
                checksum,
                dependencies,
            },
        );

        self.metadata.generated_at = chrono::Utc::now().to_rfc3339();
    }

    /// Remove a package pin
    pub fn remove_package(&mut self, name: &str) -> Option<LockedPackage> {
        let removed = self.packages.remove(name);

        if removed.is_some() {
            self.metadata.generated_at = chrono::Utc::now().to_rfc3339();
        }

        removed
    }

    /// Get a pinned package by name
    pub fn get_package(&self, name: &str) -> Option<&LockedPackage> {
        self.packages.get(name)
    }

    /// Check if a package is pinned
    pub fn has_package(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Get the number of pinned packages
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }
}

impl Default for Lockfile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lockfile_new() {
        let lockfile = Lockfile::new();
        assert_eq!(lockfile.packages.len(), 0);
        assert_eq!(lockfile.metadata.depot_version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_lockfile_update_package() {
        let mut lockfile = Lockfile::new();

        lockfile.update_package(
            "left-pad".to_string(),
            "1.0.0".to_string(),
            "abc123".to_string(),
            None,
        );

        assert_eq!(lockfile.package_count(), 1);
        assert!(lockfile.has_package("left-pad"));

        let pkg = lockfile.get_package("left-pad").unwrap();
        assert_eq!(pkg.version, "1.0.0");
        assert_eq!(pkg.checksum, "abc123");
    }

    #[test]
    fn test_lockfile_remove_package() {
        let mut lockfile = Lockfile::new();

        lockfile.update_package(
            "left-pad".to_string(),
            "1.0.0".to_string(),
            "abc123".to_string(),
            None,
        );

        let removed = lockfile.remove_package("left-pad");
        assert!(removed.is_some());
        assert!(!lockfile.has_package("left-pad"));
        assert_eq!(lockfile.package_count(), 0);
    }

    #[test]
    fn test_lockfile_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("depot.json.lock");

        let mut lockfile = Lockfile::new();
        lockfile.update_package(
            "web-toolkit".to_string(),
            "2.1.3".to_string(),
            "deadbeef".to_string(),
            Some(HashMap::from([("left-pad".to_string(), "^1.0".to_string())])),
        );
        lockfile.save_to(&path).unwrap();

        let loaded = Lockfile::load_from(&path).unwrap().unwrap();
        assert_eq!(loaded.package_count(), 1);
        let pkg = loaded.get_package("web-toolkit").unwrap();
        assert_eq!(pkg.version, "2.1.3");
        assert_eq!(
            pkg.dependencies.as_ref().unwrap().get("left-pad"),
            Some(&"^1.0".to_string())
        );
    }

    #[test]
    fn test_lockfile_absent_is_none() {
        let temp = TempDir::new().unwrap();
        let loaded = Lockfile::load_from(temp.path().join("depot.json.lock")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_lockfile_malformed_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("depot.json.lock");
        fs::write(&path, "not valid toml [[[").unwrap();

        let result = Lockfile::load_from(&path);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), crate::FailureKind::Parse);
    }
}
