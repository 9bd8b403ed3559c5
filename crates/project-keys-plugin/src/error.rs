//! Plugin error types.

use project_keys_core::KeymapError;
use thiserror::Error;

/// Errors surfaced to the host editor.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Generating or removing a keymap failed.
    #[error(transparent)]
    Keymap(#[from] KeymapError),

    /// Unrecognized context operator name.
    #[error("Unknown context operator: {0}")]
    UnknownOperator(String),
}

/// Result type alias using PluginError.
pub type PluginResult<T> = Result<T, PluginError>;
