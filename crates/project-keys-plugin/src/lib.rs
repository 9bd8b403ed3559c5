//! Editor glue for project-specific keymaps.
//!
//! This crate connects the keymap core to a host editor:
//! - `EditorHost` - services the editor provides (windows, project data, status bar)
//! - `ProjectLifecycle` - events the editor delivers (start, load, close, context query)
//! - `ProjectKeys` - host-independent handling of those events
//! - `HostAdapter` - wires a concrete `EditorHost` to `ProjectKeys`

pub mod context;
pub mod error;
pub mod host;
pub mod lifecycle;

pub use context::{query_project_context, ContextOperator};
pub use error::{PluginError, PluginResult};
pub use host::{EditorHost, WindowId};
pub use lifecycle::{HostAdapter, ProjectKeys, ProjectLifecycle, WRITE_FAILED_MESSAGE};

// Re-export project_keys_core types for convenience
pub use project_keys_core::{KeymapConfig, Platform, ReconcileOutcome};
