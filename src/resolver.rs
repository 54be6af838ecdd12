//! Dependency resolution with semantic versioning support
//!
//! Resolution runs in one of two modes. When a lock snapshot is available
//! and still satisfies the manifest's direct constraints, the closure is
//! taken verbatim from the lock: exact versions, exact checksums, no
//! version arithmetic. Otherwise a fresh resolution walks the dependency
//! graph breadth-first, choosing the highest version satisfying each
//! constraint and reporting a conflict when two requirements cannot agree
//! on a single version.
//!
//! # Examples
//!
//! ```no_run
//! use depot::registry::{FileRegistryClient, RegistryClient};
//! use depot::{resolve_dependencies, ResolverConfig};
//! use std::collections::HashMap;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = RegistryClient::File(FileRegistryClient::new("/srv/registry"));
//! let mut dependencies = HashMap::new();
//! dependencies.insert("left-pad".to_string(), "^1.0.0".to_string());
//!
//! let resolved = resolve_dependencies(&dependencies, &registry, None, &ResolverConfig::default())?;
//! println!("Resolved {} packages", resolved.len());
//! # Ok(())
//! # }
//! ```

use crate::{
    Error, Lockfile, PackageMetadata, PackageVersion, RegistryClient, ResolverConfig, Result,
};
use semver::{Version, VersionReq};
use std::collections::{HashMap, VecDeque};

/// A package pinned by resolution
#[derive(Debug, Clone)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: String,
    pub checksum: String,
    /// Dependencies of this package (name -> version constraint)
    pub dependencies: Option<HashMap<String, String>>,
}

/// Normalize a version for semver comparison (1.2 -> 1.2.0)
fn normalize_version(version: &str) -> String {
    if version.matches('.').count() == 1 {
        format!("{}.0", version)
    } else {
        version.to_string()
    }
}

fn parse_constraint(constraint: &str) -> Result<VersionReq> {
    VersionReq::parse(constraint)
        .map_err(|e| Error::Other(format!("Invalid version constraint '{}': {}", constraint, e)))
}

/// Find the best matching version for a version constraint
///
/// Searches for the highest version that matches the constraint. Returns an
/// error listing the available versions if none match.
pub fn find_matching_version(
    package_metadata: &PackageMetadata,
    constraint: &str,
) -> Result<PackageVersion> {
    let req = parse_constraint(constraint)?;

    let mut matching_versions: Vec<(Version, PackageVersion)> = package_metadata
        .versions
        .iter()
        .filter_map(|pkg_ver| {
            let ver = Version::parse(&normalize_version(&pkg_ver.version)).ok()?;
            if req.matches(&ver) {
                Some((ver, pkg_ver.clone()))
            } else {
                None
            }
        })
        .collect();

    if matching_versions.is_empty() {
        let available_versions: Vec<String> = package_metadata
            .versions
            .iter()
            .map(|v| v.version.clone())
            .collect();

        return Err(Error::DependencyConflict(format!(
            "No version of '{}' matches constraint '{}'\n\n\
             Available versions:\n  {}",
            package_metadata.name,
            constraint,
            available_versions.join("\n  ")
        )));
    }

    // Highest matching version wins
    matching_versions.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(matching_versions.remove(0).1)
}

/// Check whether a lock snapshot still satisfies the direct constraints
///
/// Every directly declared package must be pinned in the lock at a version
/// matching its constraint; transitive pins are trusted as-is.
pub fn lock_satisfies(direct_deps: &HashMap<String, String>, lock: &Lockfile) -> bool {
    direct_deps.iter().all(|(name, constraint)| {
        let Some(locked) = lock.get_package(name) else {
            return false;
        };
        let Ok(req) = VersionReq::parse(constraint) else {
            return false;
        };
        match Version::parse(&normalize_version(&locked.version)) {
            Ok(ver) => req.matches(&ver),
            Err(_) => false,
        }
    })
}

/// Resolve all transitive dependencies for a set of direct dependencies
///
/// Returns a map of package name to resolved version. When `lock` is given
/// and still satisfies the direct constraints, the closure is taken from the
/// lock without consulting registry metadata.
pub fn resolve_dependencies(
    direct_deps: &HashMap<String, String>,
    registry: &RegistryClient,
    lock: Option<&Lockfile>,
    config: &ResolverConfig,
) -> Result<HashMap<String, ResolvedPackage>> {
    if let Some(lock) = lock {
        if lock_satisfies(direct_deps, lock) {
            return Ok(resolution_from_lock(lock));
        }
    }

    resolve_fresh(direct_deps, registry, config)
}

/// Take the pinned closure from a lock snapshot verbatim
pub fn resolution_from_lock(lock: &Lockfile) -> HashMap<String, ResolvedPackage> {
    lock.packages
        .iter()
        .map(|(name, locked)| {
            (
                name.clone(),
                ResolvedPackage {
                    name: name.clone(),
                    version: locked.version.clone(),
                    checksum: locked.checksum.clone(),
                    dependencies: locked.dependencies.clone(),
                },
            )
        })
        .collect()
}

/// Fresh resolution: breadth-first, highest satisfying version per package
fn resolve_fresh(
    direct_deps: &HashMap<String, String>,
    registry: &RegistryClient,
    config: &ResolverConfig,
) -> Result<HashMap<String, ResolvedPackage>> {
    let mut resolved: HashMap<String, ResolvedPackage> = HashMap::new();
    // Remember which requirement first pinned each package, for conflict messages
    let mut pinned_by: HashMap<String, String> = HashMap::new();

    let mut queue: VecDeque<(String, String, usize)> = VecDeque::new();
    for (name, constraint) in direct_deps {
        queue.push_back((name.clone(), constraint.clone(), 0));
    }

    while let Some((name, constraint, depth)) = queue.pop_front() {
        if depth > config.max_depth {
            return Err(Error::DependencyConflict(format!(
                "Dependency chain exceeds maximum depth of {} at package '{}'\n\
                 This usually indicates a dependency cycle.",
                config.max_depth, name
            )));
        }

        if let Some(existing) = resolved.get(&name) {
            // Already pinned: the chosen version must also satisfy this
            // requirement, otherwise the constraints are unsatisfiable
            let req = parse_constraint(&constraint)?;
            let ver = Version::parse(&normalize_version(&existing.version))?;
            if !req.matches(&ver) {
                return Err(Error::DependencyConflict(format!(
                    "Conflicting requirements for '{}':\n  \
                     pinned at {} (required as '{}')\n  \
                     but another dependency requires '{}'",
                    name,
                    existing.version,
                    pinned_by.get(&name).map(String::as_str).unwrap_or("*"),
                    constraint
                )));
            }
            continue;
        }

        let metadata = registry.get_package(&name)?;
        let chosen = find_matching_version(&metadata, &constraint)?;

        let dependencies: Option<HashMap<String, String>> = chosen.dependencies.as_ref().map(
            |deps| {
                deps.iter()
                    .map(|d| (d.name.clone(), d.version.clone()))
                    .collect()
            },
        );

        if let Some(deps) = &dependencies {
            for (dep_name, dep_constraint) in deps {
                queue.push_back((dep_name.clone(), dep_constraint.clone(), depth + 1));
            }
        }

        pinned_by.insert(name.clone(), constraint.clone());
        resolved.insert(
            name.clone(),
            ResolvedPackage {
                name,
                version: chosen.version,
                checksum: chosen.checksum,
                dependencies,
            },
        );
    }

    Ok(resolved)
}

/// Build a lock file from a resolved closure
pub fn resolution_to_lockfile(resolved: &HashMap<String, ResolvedPackage>) -> Lockfile {
    let mut lockfile = Lockfile::new();
    for (name, pkg) in resolved {
        lockfile.update_package(
            name.clone(),
            pkg.version.clone(),
            pkg.checksum.clone(),
            pkg.dependencies.clone(),
        );
    }
    lockfile
}
