//! Depot - resolve declared package dependencies and vendor them into a
//! target directory
//!
//! Depot takes a project's dependency manifest (depot.json) together with
//! its companion lock file and materializes the exact dependency closure
//! into a target directory, ready for inclusion in a deployable archive.
//! Every run is isolated: no shared package cache is consulted and all
//! configuration for a run lives in an explicit per-call context.
//!
//! # Examples
//!
//! ```no_run
//! use depot::install_from_manifest;
//!
//! let outcome = install_from_manifest("dist/vendor", "depot.json");
//! match outcome.success {
//!     true => println!("vendored"),
//!     false => println!("failed: {}", outcome.message.unwrap_or_default()),
//! }
//! ```
//!
//! # Modules
//!
//! - [`vendor`] - The resolve-then-install orchestration core
//! - [`manifest`] - Parse and manage depot.json manifests
//! - [`lockfile`] - Manage `<manifest>.lock` files for reproducible runs
//! - [`registry`] - Interact with the package registry (file or HTTP)
//! - [`resolver`] - Resolve package dependencies with semantic versioning
//! - [`installer`] - Verify checksums and unpack package tarballs
//! - [`config`] - User configuration management
//! - [`error`] - Error types and result handling

pub mod config;
pub mod error;
pub mod installer;
pub mod lockfile;
pub mod manifest;
pub mod registry;
pub mod registry_http;
pub mod resolver;
pub mod vendor;

pub use config::{Config, RegistryConfig, ResolverConfig};
pub use error::{Error, FailureKind, Result};
pub use installer::{install_package, verify_checksum, ProgressCallback};
pub use lockfile::{LockedPackage, Lockfile};
pub use manifest::{Manifest, LOCK_SUFFIX, MANIFEST_NAME};
pub use registry::{Dependency, PackageMetadata, PackageVersion, RegistryClient};
pub use resolver::{find_matching_version, resolve_dependencies, ResolvedPackage};
pub use vendor::{
    install_from_manifest, install_from_manifest_with_progress, InstallOutcome, MANIFEST_ENV,
};
