//! Configuration management for Radial.
//!
//! This module provides configuration loading, saving, and defaults.
//! Configuration is stored in TOML format in a platform-appropriate location.

use crate::error::{RadialError, Result};
use crate::menu::DEFAULT_BOOTSTRAP_CAP;
use crate::search::DEFAULT_PARALLEL_THRESHOLD;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Package name of the launcher itself, always excluded from the index.
pub const HOST_PACKAGE: &str = "radial";

/// Main configuration structure for Radial.
///
/// ## Example Configuration File (radial.toml)
///
/// ```toml
/// [general]
/// log_level = "info"
///
/// [index]
/// exclude_packages = ["radial", "org.example.Debug"]
///
/// [menu]
/// bootstrap_cap = 8
///
/// [search]
/// max_results = 50
///
/// [xdg]
/// data_dirs = ["/usr/share", "/var/lib/flatpak/exports/share"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Indexing settings
    pub index: IndexConfig,

    /// Menu settings
    pub menu: MenuConfig,

    /// Search tuning
    pub search: SearchConfig,

    /// XDG backend overrides
    pub xdg: XdgConfig,
}

/// General configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory location (None = default location)
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            data_dir: None,
            log_level: "info".to_string(),
        }
    }
}

/// Indexing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Packages never indexed
    pub exclude_packages: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            exclude_packages: vec![HOST_PACKAGE.to_string()],
        }
    }
}

/// Menu configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Maximum number of entries a first-run menu is seeded with
    pub bootstrap_cap: usize,

    /// Menu file location (None = `menu` in the data directory)
    pub menu_path: Option<PathBuf>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        MenuConfig {
            bootstrap_cap: DEFAULT_BOOTSTRAP_CAP,
            menu_path: None,
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Threshold for switching to parallel tier classification
    pub parallel_threshold: usize,

    /// Maximum number of results shown by the CLI and TUI
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            max_results: 50,
        }
    }
}

/// XDG backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct XdgConfig {
    /// Data directories searched for `applications/` (empty = XDG defaults)
    pub data_dirs: Vec<PathBuf>,

    /// Config directories searched for `mimeapps.list` (empty = XDG defaults)
    pub config_dirs: Vec<PathBuf>,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default config if no config file exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

        info!(path = %path.display(), "Loading configuration");
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents).map_err(|e| RadialError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
        })?;

        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        info!(path = %path.display(), "Saving configuration");
        let contents = toml::to_string_pretty(self).map_err(|e| RadialError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, contents)?;
        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "radial").ok_or_else(|| RadialError::ConfigError {
            reason: "Could not determine home directory".to_string(),
        })
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("radial.toml"))
    }

    /// Get the data directory (from config or default).
    pub fn data_dir(&self) -> Result<PathBuf> {
        match self.general.data_dir {
            Some(ref path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.data_dir().to_path_buf()),
        }
    }

    /// Get the menu file path (from config or `menu` in the data directory).
    pub fn menu_path(&self) -> Result<PathBuf> {
        match self.menu.menu_path {
            Some(ref path) => Ok(path.clone()),
            None => Ok(self.data_dir()?.join("menu")),
        }
    }

    /// Packages excluded from every index pass; always includes the host.
    pub fn excluded_packages(&self) -> HashSet<String> {
        let mut excluded: HashSet<String> = self.index.exclude_packages.iter().cloned().collect();
        excluded.insert(HOST_PACKAGE.to_string());
        excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.menu.bootstrap_cap, 8);
        assert_eq!(config.search.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
        assert!(config.excluded_packages().contains(HOST_PACKAGE));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let mut config = Config::default();
        config.menu.bootstrap_cap = 6;
        config.index.exclude_packages = vec!["org.example.Debug".to_string()];

        config.save_to(&config_path).unwrap();
        let loaded = Config::load_from(&config_path).unwrap();

        assert_eq!(loaded.menu.bootstrap_cap, 6);
        assert_eq!(loaded.index.exclude_packages, vec!["org.example.Debug".to_string()]);
    }

    #[test]
    fn test_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.menu.bootstrap_cap, DEFAULT_BOOTSTRAP_CAP);
    }

    #[test]
    fn test_load_partial() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        fs::write(&config_path, "[search]\nmax_results = 5\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.menu.bootstrap_cap, DEFAULT_BOOTSTRAP_CAP);
    }

    #[test]
    fn test_load_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        fs::write(&config_path, "[menu\nbootstrap_cap = ").unwrap();

        let result = Config::load_from(&config_path);
        assert!(matches!(result, Err(RadialError::ConfigError { .. })));
    }

    #[test]
    fn test_host_always_excluded() {
        let mut config = Config::default();
        config.index.exclude_packages.clear();
        assert!(config.excluded_packages().contains(HOST_PACKAGE));
    }

    #[test]
    fn test_menu_path_override() {
        let mut config = Config::default();
        config.general.data_dir = Some(PathBuf::from("/tmp/radial-data"));
        assert_eq!(config.menu_path().unwrap(), PathBuf::from("/tmp/radial-data/menu"));

        config.menu.menu_path = Some(PathBuf::from("/tmp/elsewhere"));
        assert_eq!(config.menu_path().unwrap(), PathBuf::from("/tmp/elsewhere"));
    }
}
