//! Manifest handling for depot.json dependency declarations
//!
//! The manifest declares the packages a project needs together with their
//! semver constraints. It is a read-only input: depot never rewrites a
//! manifest, it only resolves and vendors what the manifest declares.
//!
//! # Examples
//!
//! ```no_run
//! use depot::Manifest;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load manifest from an explicit path
//! let manifest = Manifest::load_path("project/depot.json")?;
//!
//! // The companion lock file lives next to the manifest
//! println!("lock: {:?}", Manifest::lock_path("project/depot.json"));
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// The default manifest filename
pub const MANIFEST_NAME: &str = "depot.json";

/// Suffix appended to the manifest filename to derive the lock filename
pub const LOCK_SUFFIX: &str = ".lock";

/// Dependency manifest (depot.json)
///
/// Declares required packages and version constraints. The manifest's
/// containing directory is the project root for resolution; its companion
/// lock file is `<manifest filename>.lock` in the same directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Project name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Project version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Project description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Runtime dependencies (package name -> semver constraint)
    #[serde(default)]
    pub dependencies: HashMap<String, String>,

    /// Development dependencies (not vendored into deployable archives)
    #[serde(default)]
    pub dev_dependencies: HashMap<String, String>,
}

impl Manifest {
    /// Create a new empty manifest
    pub fn new() -> Self {
        Self {
            name: None,
            version: None,
            description: None,
            dependencies: HashMap::new(),
            dev_dependencies: HashMap::new(),
        }
    }

    /// Load manifest from depot.json in the given directory
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::load_path(dir.as_ref().join(MANIFEST_NAME))
    }

    /// Load manifest from an explicit file path
    pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Error::InvalidManifest(format!(
                "manifest not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let manifest: Manifest = serde_json::from_str(&content)?;
        manifest.validate()?;

        Ok(manifest)
    }

    /// Save manifest to depot.json in the given directory
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let manifest_path = dir.as_ref().join(MANIFEST_NAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&manifest_path, content)?;
        Ok(())
    }

    /// Check if depot.json exists in the given directory
    pub fn exists<P: AsRef<Path>>(dir: P) -> bool {
        dir.as_ref().join(MANIFEST_NAME).exists()
    }

    /// The project root implied by a manifest path (its containing directory)
    pub fn project_root<P: AsRef<Path>>(manifest_path: P) -> PathBuf {
        manifest_path
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// The companion lock path for a manifest path: same directory, same
    /// filename with the lock suffix appended (depot.json -> depot.json.lock)
    pub fn lock_path<P: AsRef<Path>>(manifest_path: P) -> PathBuf {
        let path = manifest_path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| MANIFEST_NAME.to_string());
        Self::project_root(path).join(format!("{}{}", file_name, LOCK_SUFFIX))
    }

    /// Validate declared package names and constraints
    fn validate(&self) -> Result<()> {
        for (name, constraint) in self.dependencies.iter().chain(&self.dev_dependencies) {
            if !valid_package_name(name) {
                return Err(Error::InvalidManifest(format!(
                    "invalid package name '{}' (expected lowercase letters, digits, '-', '_', '.')",
                    name
                )));
            }
            if constraint != "*" {
                semver::VersionReq::parse(constraint).map_err(|e| {
                    Error::InvalidManifest(format!(
                        "invalid version constraint '{}' for package '{}': {}",
                        constraint, name, e
                    ))
                })?;
            }
        }
        Ok(())
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

/// Package names are lowercase alphanumeric with '-', '_' and '.' separators
pub fn valid_package_name(name: &str) -> bool {
    use std::sync::OnceLock;
    static NAME_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = NAME_RE.get_or_init(|| {
        regex::Regex::new(r"^[a-z0-9][a-z0-9._-]*$").unwrap() // pattern is static
    });
    re.is_match(name)
}
