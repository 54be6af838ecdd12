//! Test utilities and helpers for depot integration tests.
//!
//! Provides isolated workspaces, a file-based test registry that serves
//! real tarballs with real checksums, and common assertions.

use depot::{Dependency, PackageMetadata, PackageVersion};
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An isolated project workspace with its own manifest, target directory,
/// and config directory.
pub struct TestWorkspace {
    pub temp_dir: TempDir,
    pub project_path: PathBuf,
    pub target_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let project_path = temp_dir.path().to_path_buf();
        let target_dir = project_path.join("vendor");
        let config_dir = project_path.join(".depot-config");

        fs::create_dir_all(&config_dir).expect("Failed to create config directory");

        Self {
            temp_dir,
            project_path,
            target_dir,
            config_dir,
        }
    }

    /// Write a manifest declaring the given dependencies
    pub fn write_manifest(&self, deps: &[(&str, &str)]) -> PathBuf {
        let dep_entries: Vec<String> = deps
            .iter()
            .map(|(name, constraint)| format!("        \"{}\": \"{}\"", name, constraint))
            .collect();
        let content = format!(
            "{{\n    \"name\": \"test-project\",\n    \"dependencies\": {{\n{}\n    }}\n}}",
            dep_entries.join(",\n")
        );
        let path = self.manifest_path();
        fs::write(&path, content).expect("Failed to write manifest");
        path
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_path.join("depot.json")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.project_path.join("depot.json.lock")
    }

    pub fn has_lock(&self) -> bool {
        self.lock_path().exists()
    }

    pub fn read_lock(&self) -> String {
        fs::read_to_string(self.lock_path()).expect("Failed to read lock file")
    }

    /// Check whether a package subtree exists under the target directory
    pub fn vendored(&self, name: &str) -> bool {
        self.target_dir.join(name).is_dir()
    }

    /// Point configuration and registry lookups at this workspace's config
    /// directory and the given registry. Process-wide, so tests using this
    /// must run serially.
    pub fn activate(&self, registry: &TestRegistry) {
        std::env::set_var("DEPOT_CONFIG_DIR", &self.config_dir);
        std::env::set_var("DEPOT_REGISTRY_DIR", registry.path());
    }

    /// Write a config pointing this workspace at an HTTP registry
    pub fn configure_http_registry(&self, url: &str) {
        let config = format!(
            "[registry]\nregistry_type = \"http\"\nurl = \"{}\"\n",
            url
        );
        fs::write(self.config_dir.join("config.toml"), config).expect("Failed to write config");
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Test fixture describing one package version to publish
pub struct MockPackage {
    pub name: String,
    pub version: String,
    pub dependencies: Vec<(String, String)>,
}

impl MockPackage {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            dependencies: vec![],
        }
    }

    pub fn with_dependency(mut self, name: &str, constraint: &str) -> Self {
        self.dependencies
            .push((name.to_string(), constraint.to_string()));
        self
    }
}

/// A file-based test registry serving real gzipped tarballs
pub struct TestRegistry {
    pub temp_dir: TempDir,
    pub packages_dir: PathBuf,
    pub tarballs_dir: PathBuf,
}

impl TestRegistry {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();

        let packages_dir = root.join("packages");
        let tarballs_dir = root.join("tarballs");

        fs::create_dir_all(&packages_dir).expect("Failed to create packages dir");
        fs::create_dir_all(&tarballs_dir).expect("Failed to create tarballs dir");

        Self {
            temp_dir,
            packages_dir,
            tarballs_dir,
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Publish a package version: build its tarball, record the real
    /// checksum, and merge the version into the package's metadata file.
    pub fn add_package(&self, package: &MockPackage) {
        let checksum = self.write_tarball(package, &package.name);
        self.add_version_metadata(package, &checksum);
    }

    /// Publish a package whose recorded checksum does not match its tarball
    pub fn add_package_with_bad_checksum(&self, package: &MockPackage) {
        self.write_tarball(package, &package.name);
        let bogus = "0".repeat(64);
        self.add_version_metadata(package, &bogus);
    }

    /// Publish a package whose tarball unpacks to a directory that does not
    /// match the package name
    pub fn add_package_with_root_dir(&self, package: &MockPackage, root_dir: &str) {
        let checksum = self.write_tarball(package, root_dir);
        self.add_version_metadata(package, &checksum);
    }

    fn write_tarball(&self, package: &MockPackage, root_dir: &str) -> String {
        // Stage a minimal package tree
        let staging = self.temp_dir.path().join("staging").join(format!(
            "{}-{}",
            package.name, package.version
        ));
        let _ = fs::remove_dir_all(&staging);
        fs::create_dir_all(staging.join("lib")).expect("Failed to create staging dir");
        fs::write(
            staging.join("package.json"),
            format!(
                r#"{{"name": "{}", "version": "{}"}}"#,
                package.name, package.version
            ),
        )
        .expect("Failed to write package.json");
        fs::write(
            staging.join("lib").join(format!("{}.txt", package.name)),
            format!("contents of {} {}\n", package.name, package.version),
        )
        .expect("Failed to write package payload");

        let tarball_path = self
            .tarballs_dir
            .join(format!("{}-{}.tar.gz", package.name, package.version));
        let file = fs::File::create(&tarball_path).expect("Failed to create tarball");
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder
            .append_dir_all(root_dir, &staging)
            .expect("Failed to append tarball contents");
        builder
            .into_inner()
            .and_then(|enc| enc.finish())
            .expect("Failed to finish tarball");

        sha256_hex(&tarball_path)
    }

    fn add_version_metadata(&self, package: &MockPackage, checksum: &str) {
        let metadata_path = self.packages_dir.join(format!("{}.json", package.name));

        let mut metadata: PackageMetadata = if metadata_path.exists() {
            let content =
                fs::read_to_string(&metadata_path).expect("Failed to read package metadata");
            serde_json::from_str(&content).expect("Failed to parse package metadata")
        } else {
            PackageMetadata {
                name: package.name.clone(),
                description: Some("Test package".to_string()),
                versions: vec![],
            }
        };

        let dependencies = if package.dependencies.is_empty() {
            None
        } else {
            Some(
                package
                    .dependencies
                    .iter()
                    .map(|(name, constraint)| Dependency {
                        name: name.clone(),
                        version: constraint.clone(),
                    })
                    .collect(),
            )
        };

        metadata.versions.push(PackageVersion {
            version: package.version.clone(),
            tarball: format!("{}-{}.tar.gz", package.name, package.version),
            checksum: checksum.to_string(),
            dependencies,
        });

        let content =
            serde_json::to_string_pretty(&metadata).expect("Failed to serialize metadata");
        fs::write(&metadata_path, content).expect("Failed to write package metadata");
    }
}

impl Default for TestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Hex-encoded SHA-256 of a file
pub fn sha256_hex(path: &Path) -> String {
    let bytes = fs::read(path).expect("Failed to read file for hashing");
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    format!("{:x}", hasher.finalize())
}

/// Assertions for test results
pub mod assertions {
    use std::path::Path;

    pub fn file_contains(path: &Path, expected: &str) {
        let content = std::fs::read_to_string(path)
            .unwrap_or_else(|_| panic!("Failed to read file: {:?}", path));
        assert!(
            content.contains(expected),
            "File {:?} should contain '{}', but content was:\n{}",
            path,
            expected,
            content
        );
    }

    pub fn dir_exists(path: &Path) {
        assert!(
            path.exists() && path.is_dir(),
            "Directory should exist: {:?}",
            path
        );
    }

    pub fn dir_not_exists(path: &Path) {
        assert!(!path.exists(), "Directory should not exist: {:?}", path);
    }

    pub fn file_exists(path: &Path) {
        assert!(
            path.exists() && path.is_file(),
            "File should exist: {:?}",
            path
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_creation() {
        let workspace = TestWorkspace::new();
        assert!(workspace.project_path.exists());
        assert!(workspace.config_dir.exists());
        assert!(!workspace.has_lock());
    }

    #[test]
    fn test_registry_serves_real_checksums() {
        let registry = TestRegistry::new();
        registry.add_package(&MockPackage::new("left-pad", "1.3.0"));

        let tarball = registry.tarballs_dir.join("left-pad-1.3.0.tar.gz");
        assert!(tarball.exists());

        let metadata: PackageMetadata = serde_json::from_str(
            &fs::read_to_string(registry.packages_dir.join("left-pad.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(metadata.versions.len(), 1);
        assert_eq!(metadata.versions[0].checksum, sha256_hex(&tarball));
    }

    #[test]
    fn test_registry_merges_versions() {
        let registry = TestRegistry::new();
        registry.add_package(&MockPackage::new("web-toolkit", "1.0.0"));
        registry.add_package(&MockPackage::new("web-toolkit", "1.1.0"));

        let metadata: PackageMetadata = serde_json::from_str(
            &fs::read_to_string(registry.packages_dir.join("web-toolkit.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(metadata.versions.len(), 2);
    }
}
