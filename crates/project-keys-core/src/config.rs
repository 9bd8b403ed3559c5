//! Configuration types.
//!
//! The keymap root and platform default to the running editor's package
//! directory and the host platform. Both can be overridden in
//! `<config_dir>/project-keys/config.toml`:
//!
//! ```toml
//! root = "/home/me/.config/sublime-text/Packages/ProjectSpecificKeys/keymaps"
//! platform = "Linux"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::paths::KeymapPaths;
use crate::platform::Platform;

/// Package that owns the generated keymaps.
const PACKAGE_NAME: &str = "ProjectSpecificKeys";

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapConfig {
    /// Directory holding one subdirectory per project.
    pub root: PathBuf,

    /// Platform the keymaps are generated for.
    pub platform: Platform,
}

/// Optional overrides read from config.toml.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverrides {
    root: Option<PathBuf>,
    platform: Option<Platform>,
}

impl KeymapConfig {
    pub fn new(root: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            root: root.into(),
            platform,
        }
    }

    /// Defaults for this machine.
    pub fn detect() -> Result<Self, ConfigError> {
        Ok(Self::new(default_keymap_root()?, Platform::current()))
    }

    /// Defaults with config.toml applied, if it exists.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::detect()?;
        if let Some(path) = config_file_path() {
            if path.exists() {
                config.apply_file(&path)?;
            } else {
                tracing::debug!("No config file at {:?}", path);
            }
        }
        Ok(config)
    }

    /// Apply overrides from a TOML file.
    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.apply_toml(&text).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(())
    }

    fn apply_toml(&mut self, text: &str) -> Result<(), String> {
        let overrides: ConfigOverrides = toml::from_str(text).map_err(|e| e.to_string())?;
        if let Some(root) = overrides.root {
            self.root = root;
        }
        if let Some(platform) = overrides.platform {
            self.platform = platform;
        }
        Ok(())
    }

    pub fn paths(&self) -> KeymapPaths {
        KeymapPaths::new(&self.root, self.platform)
    }
}

/// The editor's `Packages` directory.
pub fn packages_dir() -> Option<PathBuf> {
    let app_dir = if cfg!(target_os = "linux") {
        "sublime-text"
    } else {
        "Sublime Text"
    };
    dirs::config_dir().map(|p| p.join(app_dir).join("Packages"))
}

/// Default keymap root: `<Packages>/ProjectSpecificKeys/keymaps`.
pub fn default_keymap_root() -> Result<PathBuf, ConfigError> {
    packages_dir()
        .map(|p| p.join(PACKAGE_NAME).join("keymaps"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Get the path to config.toml.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("project-keys").join("config.toml"))
}
