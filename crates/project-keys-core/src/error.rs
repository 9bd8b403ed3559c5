//! Error types for keymap generation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while generating or removing a project keymap.
#[derive(Debug, Error)]
pub enum KeymapError {
    /// Filesystem operation failed.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bindings could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Project data has a `"keys"` entry of the wrong shape.
    #[error("Invalid project data: {0}")]
    InvalidProjectData(String),
}

impl KeymapError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using KeymapError.
pub type KeymapResult<T> = Result<T, KeymapError>;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config directory found.
    #[error("Config directory not found")]
    NoConfigDir,

    /// IO error.
    #[error("IO error reading {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    /// Parse error.
    #[error("Parse error in {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Unknown platform name.
    #[error("Invalid platform: {0}")]
    InvalidPlatform(String),
}
