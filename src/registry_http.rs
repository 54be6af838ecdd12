//! HTTP registry backend
//!
//! Talks to a depot registry server over its JSON API and keeps downloaded
//! tarballs in a caller-supplied cache directory. The cache is checked
//! first and re-downloaded when its checksum no longer matches.

use crate::installer::file_sha256;
use crate::{Dependency, Error, PackageMetadata, PackageVersion, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub struct HttpRegistryClient {
    base_url: String,
    client: reqwest::blocking::Client,
    cache_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ApiPackageResponse {
    name: String,
    description: Option<String>,
    versions: Vec<ApiVersionInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiVersionInfo {
    version: String,
    tarball_url: String,
    checksum: String,
    #[serde(default)]
    dependencies: Option<Vec<ApiDependency>>,
}

#[derive(Debug, Deserialize)]
struct ApiDependency {
    name: String,
    version_constraint: String,
}

#[derive(Debug, Deserialize)]
struct ApiSearchResponse {
    results: Vec<String>,
}

impl HttpRegistryClient {
    /// Create a client caching downloads under `cache_dir`. Nothing is
    /// written to disk until a tarball is actually downloaded.
    pub fn new(base_url: String, cache_dir: PathBuf) -> Self {
        Self {
            base_url,
            client: reqwest::blocking::Client::new(),
            cache_dir,
        }
    }

    /// Get package metadata from HTTP registry
    pub fn get_package(&self, name: &str) -> Result<PackageMetadata> {
        let url = format!("{}/api/v1/packages/{}", self.base_url, name);

        let response = self.client.get(&url).send().map_err(|e| {
            if e.is_connect() {
                Error::Fetch(format!(
                    "Cannot connect to registry at {}\n\
                        Please check that the registry is running and the URL is correct.",
                    self.base_url
                ))
            } else if e.is_timeout() {
                Error::Fetch("Registry request timed out. Please try again.".to_string())
            } else {
                Error::Fetch(format!("Failed to fetch package: {}", e))
            }
        })?;

        let status = response.status();

        if status == 404 {
            return Err(Error::PackageNotFound(format!(
                "Package '{}' not found in registry",
                name
            )));
        }

        if !status.is_success() {
            let error_msg = match status.as_u16() {
                500 | 502 | 503 | 504 => format!(
                    "Registry server error (HTTP {}).\n\
                    The registry is experiencing issues. Please try again later.",
                    status.as_u16()
                ),
                _ => format!("Registry error: HTTP {}", status.as_u16()),
            };
            return Err(Error::Fetch(error_msg));
        }

        let api_response: ApiPackageResponse = response
            .json()
            .map_err(|e| Error::Fetch(format!("Failed to parse response: {}", e)))?;

        let versions: Vec<PackageVersion> = api_response
            .versions
            .into_iter()
            .map(|info| PackageVersion {
                version: info.version,
                tarball: info.tarball_url,
                checksum: info.checksum,
                dependencies: info.dependencies.map(|deps| {
                    deps.into_iter()
                        .map(|d| Dependency {
                            name: d.name,
                            version: d.version_constraint,
                        })
                        .collect()
                }),
            })
            .collect();

        Ok(PackageMetadata {
            name: api_response.name,
            description: api_response.description,
            versions,
        })
    }

    /// Local cache path for a tarball
    pub fn get_tarball_path(&self, name: &str, version: &str) -> PathBuf {
        self.cache_dir
            .join("tarballs")
            .join(format!("{}-{}.tar.gz", name, version))
    }

    /// Download package tarball with cache-first strategy
    pub fn download_if_needed(
        &self,
        name: &str,
        version: &str,
        expected_checksum: &str,
    ) -> Result<PathBuf> {
        let cached_path = self.get_tarball_path(name, version);

        // Reuse the cached tarball only if its checksum still matches
        if cached_path.exists() {
            match file_sha256(&cached_path) {
                Ok(cached) if cached.eq_ignore_ascii_case(expected_checksum) => {
                    return Ok(cached_path);
                }
                _ => {}
            }
        }

        let url = format!(
            "{}/api/v1/packages/{}/{}/download",
            self.base_url, name, version
        );

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::Fetch(format!("Failed to download {}@{}: {}", name, version, e)))?;

        if !response.status().is_success() {
            return Err(Error::Fetch(format!(
                "Download of {}@{} failed: HTTP {}",
                name,
                version,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| Error::Fetch(format!("Failed to read response: {}", e)))?;

        if let Some(parent) = cached_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&cached_path, &bytes)?;

        Ok(cached_path)
    }

    /// Search for packages by name substring
    pub fn search(&self, query: &str) -> Result<Vec<String>> {
        let url = format!("{}/api/v1/packages?q={}", self.base_url, query);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::Fetch(format!("Search failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Fetch(format!(
                "Search failed: HTTP {}",
                response.status()
            )));
        }

        let search: ApiSearchResponse = response
            .json()
            .map_err(|e| Error::Fetch(format!("Failed to parse search response: {}", e)))?;

        Ok(search.results)
    }

    /// The cache directory this client writes into
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}
