//! User configuration management
//!
//! Configuration is stored in TOML format at `~/.depot/config.toml` and
//! selects the registry backend plus resolver limits. Everything has a
//! serde default, so an absent file means the default configuration.
//!
//! # Examples
//!
//! ```no_run
//! use depot::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! println!("Registry type: {}", config.registry.registry_type);
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// User configuration file (`~/.depot/config.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Dependency resolver settings
    #[serde(default)]
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry type: "file" or "http"
    #[serde(default = "default_registry_type")]
    pub registry_type: String,

    /// Registry URL (for HTTP registry)
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// Registry root directory (for file registry); tilde-expanded.
    /// Defaults to ~/.depot-registry when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn default_registry_type() -> String {
    "file".to_string()
}

fn default_registry_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            registry_type: default_registry_type(),
            url: default_registry_url(),
            path: None,
        }
    }
}

/// Dependency resolver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Maximum dependency depth to prevent infinite recursion (default: 100)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    100
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// Uses DEPOT_CONFIG_DIR if set, otherwise ~/.depot/config.toml
    pub fn default_path() -> Result<PathBuf> {
        // Custom config directory, useful for testing
        if let Ok(config_dir) = std::env::var("DEPOT_CONFIG_DIR") {
            return Ok(PathBuf::from(config_dir).join("config.toml"));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| Error::Other("Could not find home directory".to_string()))?;

        Ok(home.join(".depot").join("config.toml"))
    }

    /// Load config from file, or return defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// The file-registry root, tilde-expanded when configured
    pub fn file_registry_path(&self) -> Option<PathBuf> {
        self.registry
            .path
            .as_deref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).to_string()))
    }
}
