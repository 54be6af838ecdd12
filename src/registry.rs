//! Package registry client and metadata types
//!
//! Two backends exist behind [`RegistryClient`]: a file-based registry
//! (metadata JSON plus tarballs on a local or mounted path) and an HTTP
//! registry. The vendoring core treats both identically: look up package
//! metadata, then fetch a versioned tarball.
//!
//! # Examples
//!
//! ```no_run
//! use depot::registry::{FileRegistryClient, RegistryClient};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let path = RegistryClient::default_registry_path()?;
//! let registry = RegistryClient::File(FileRegistryClient::new(path));
//!
//! let metadata = registry.get_package("left-pad")?;
//! if let Some(latest) = metadata.versions.last() {
//!     println!("Latest version: {}", latest.version);
//! }
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Package metadata stored in registry
///
/// Contains information about a package including all available versions
/// and their dependencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub description: Option<String>,
    pub versions: Vec<PackageVersion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageVersion {
    pub version: String,
    pub tarball: String,
    pub checksum: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<Dependency>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
}

pub enum RegistryClient {
    File(FileRegistryClient),
    Http(crate::registry_http::HttpRegistryClient),
}

pub struct FileRegistryClient {
    registry_path: PathBuf,
}

impl FileRegistryClient {
    /// Create a new file registry client
    pub fn new<P: AsRef<Path>>(registry_path: P) -> Self {
        Self {
            registry_path: registry_path.as_ref().to_path_buf(),
        }
    }
}

impl RegistryClient {
    /// Get the default local registry path
    ///
    /// Uses DEPOT_REGISTRY_DIR if set, otherwise ~/.depot-registry
    pub fn default_registry_path() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("DEPOT_REGISTRY_DIR") {
            return Ok(PathBuf::from(dir));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| Error::Other("Could not find home directory".to_string()))?;

        Ok(home.join(".depot-registry"))
    }

    /// Create a registry client from configuration
    ///
    /// `cache_dir` is where the HTTP backend stores downloaded tarballs; the
    /// caller decides its location, so an isolated per-target cache is just a
    /// matter of passing a directory under the target.
    pub fn from_config(config: &crate::Config, cache_dir: &Path) -> Result<Self> {
        match config.registry.registry_type.as_str() {
            "http" => {
                let http_client = crate::registry_http::HttpRegistryClient::new(
                    config.registry.url.clone(),
                    cache_dir.to_path_buf(),
                );
                Ok(RegistryClient::Http(http_client))
            }
            _ => {
                let path = match config.file_registry_path() {
                    Some(path) => path,
                    None => Self::default_registry_path()?,
                };
                Ok(RegistryClient::File(FileRegistryClient::new(path)))
            }
        }
    }

    /// Get package metadata from registry
    pub fn get_package(&self, name: &str) -> Result<PackageMetadata> {
        match self {
            RegistryClient::File(client) => client.get_package(name),
            RegistryClient::Http(client) => client.get_package(name),
        }
    }

    /// Fetch the tarball for a package version, returning a local path
    ///
    /// For the file registry this is a lookup; for the HTTP registry a
    /// cache-first download into the client's cache directory.
    pub fn fetch_tarball(&self, name: &str, version: &str, checksum: &str) -> Result<PathBuf> {
        match self {
            RegistryClient::File(client) => client.fetch_tarball(name, version),
            RegistryClient::Http(client) => client.download_if_needed(name, version, checksum),
        }
    }

    /// Search for packages by name substring
    pub fn search(&self, query: &str) -> Result<Vec<String>> {
        match self {
            RegistryClient::File(client) => client.search(query),
            RegistryClient::Http(client) => client.search(query),
        }
    }
}

impl FileRegistryClient {
    pub fn get_package(&self, name: &str) -> Result<PackageMetadata> {
        let package_file = self
            .registry_path
            .join("packages")
            .join(format!("{}.json", name));

        if !package_file.exists() {
            // Try to find similar package names for suggestions
            let similar = self.find_similar_packages(name);

            let mut error_msg = format!("Package '{}' not found in registry", name);

            if !similar.is_empty() {
                error_msg.push_str("\n\nDid you mean one of these?\n  ");
                error_msg.push_str(&similar.join("\n  "));
            }

            return Err(Error::PackageNotFound(error_msg));
        }

        let content = fs::read_to_string(&package_file)?;
        let metadata: PackageMetadata = serde_json::from_str(&content)?;

        Ok(metadata)
    }

    /// Find packages with similar names using simple edit distance
    fn find_similar_packages(&self, query: &str) -> Vec<String> {
        let packages_dir = self.registry_path.join("packages");

        if !packages_dir.exists() {
            return Vec::new();
        }

        let mut similar = Vec::new();

        if let Ok(entries) = fs::read_dir(packages_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|s| s.to_str()) == Some("json") {
                    if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                        if name.contains(query)
                            || query.contains(name)
                            || levenshtein_distance(query, name) <= 3
                        {
                            similar.push(name.to_string());
                        }
                    }
                }
            }
        }

        similar.sort();
        similar.truncate(5); // Show max 5 suggestions
        similar
    }

    /// Resolve the local tarball path, failing if the file is absent
    pub fn fetch_tarball(&self, name: &str, version: &str) -> Result<PathBuf> {
        let path = self.get_tarball_path(name, version);
        if !path.exists() {
            return Err(Error::Fetch(format!(
                "tarball for {}@{} not present in registry at {}",
                name,
                version,
                path.display()
            )));
        }
        Ok(path)
    }

    /// Get path to package tarball
    pub fn get_tarball_path(&self, name: &str, version: &str) -> PathBuf {
        self.registry_path
            .join("tarballs")
            .join(format!("{}-{}.tar.gz", name, version))
    }

    /// Search for packages (simple substring search)
    pub fn search(&self, query: &str) -> Result<Vec<String>> {
        let packages_dir = self.registry_path.join("packages");

        if !packages_dir.exists() {
            return Ok(Vec::new());
        }

        let mut results = Vec::new();

        for entry in fs::read_dir(packages_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                    if name.to_lowercase().contains(&query.to_lowercase()) {
                        results.push(name.to_string());
                    }
                }
            }
        }

        results.sort();
        Ok(results)
    }

    /// Initialize registry directory structure
    pub fn init_registry(&self) -> Result<()> {
        fs::create_dir_all(self.registry_path.join("packages"))?;
        fs::create_dir_all(self.registry_path.join("tarballs"))?;
        Ok(())
    }
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let len1 = s1.chars().count();
    let len2 = s2.chars().count();
    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

    for (i, row) in matrix.iter_mut().enumerate().take(len1 + 1) {
        row[0] = i;
    }
    for (j, val) in matrix[0].iter_mut().enumerate().take(len2 + 1) {
        *val = j;
    }

    for (i, c1) in s1.chars().enumerate() {
        for (j, c2) in s2.chars().enumerate() {
            let cost = if c1 == c2 { 0 } else { 1 };
            matrix[i + 1][j + 1] = std::cmp::min(
                std::cmp::min(matrix[i][j + 1] + 1, matrix[i + 1][j] + 1),
                matrix[i][j] + cost,
            );
        }
    }

    matrix[len1][len2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_package(root: &Path, name: &str, json: &str) {
        let packages = root.join("packages");
        fs::create_dir_all(&packages).unwrap();
        fs::write(packages.join(format!("{}.json", name)), json).unwrap();
    }

    #[test]
    fn test_package_metadata_parse() {
        let json = r#"{
            "name": "left-pad",
            "description": "Pads strings on the left",
            "versions": [
                {
                    "version": "1.0.0",
                    "tarball": "left-pad-1.0.0.tar.gz",
                    "checksum": "abc123"
                }
            ]
        }"#;

        let metadata: PackageMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.name, "left-pad");
        assert_eq!(metadata.versions.len(), 1);
        assert_eq!(metadata.versions[0].version, "1.0.0");
        assert!(metadata.versions[0].dependencies.is_none());
    }

    #[test]
    fn test_dependency_parse() {
        let json = r#"{
            "name": "web-toolkit",
            "version": "^1.0.0"
        }"#;

        let dep: Dependency = serde_json::from_str(json).unwrap();
        assert_eq!(dep.name, "web-toolkit");
        assert_eq!(dep.version, "^1.0.0");
    }

    #[test]
    fn test_get_package_missing_suggests_similar() {
        let temp = TempDir::new().unwrap();
        write_package(
            temp.path(),
            "left-pad",
            r#"{"name": "left-pad", "description": null, "versions": []}"#,
        );

        let client = FileRegistryClient::new(temp.path());
        let err = client.get_package("left-pod").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("left-pad"));
    }

    #[test]
    fn test_search_substring() {
        let temp = TempDir::new().unwrap();
        write_package(temp.path(), "left-pad", r#"{"name": "left-pad", "description": null, "versions": []}"#);
        write_package(temp.path(), "web-toolkit", r#"{"name": "web-toolkit", "description": null, "versions": []}"#);

        let client = FileRegistryClient::new(temp.path());
        let results = client.search("pad").unwrap();
        assert_eq!(results, vec!["left-pad".to_string()]);
    }

    #[test]
    fn test_fetch_tarball_missing() {
        let temp = TempDir::new().unwrap();
        let client = FileRegistryClient::new(temp.path());
        let err = client.fetch_tarball("left-pad", "1.0.0").unwrap_err();
        assert_eq!(err.kind(), crate::FailureKind::Fetch);
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("same", "same"), 0);
        assert_eq!(levenshtein_distance("", "abc"), 3);
    }
}
