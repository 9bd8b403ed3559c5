//! Core types for project-specific keymaps.
//!
//! This crate turns the `"keys"` section of a Sublime Text project file into
//! a generated keymap that only fires while that project is open:
//! - Platform enumeration and exclusion markers
//! - Binding model and the project-scoping transform
//! - Path resolution for the generated keymap files
//! - Reconciliation of the on-disk keymap with the desired bindings
//! - Configuration and error types

mod binding;
mod config;
mod error;
mod paths;
mod platform;
mod reconcile;

pub use binding::{
    bindings_from_project_data, transform, BindingRecord, BindingSpec, ContextEntry,
    PROJECT_CONTEXT_KEY,
};
pub use config::{config_file_path, default_keymap_root, packages_dir, KeymapConfig};
pub use error::{ConfigError, KeymapError, KeymapResult};
pub use paths::{project_identifier, KeymapPaths, KEYMAP_EXTENSION};
pub use platform::Platform;
pub use reconcile::{ReconcileOutcome, Reconciler};
