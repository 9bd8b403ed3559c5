//! Services consumed from the host editor.

use std::path::PathBuf;

use serde_json::Value;

/// Host-assigned window handle.
pub type WindowId = u64;

/// What the plugin needs from the editor.
#[cfg_attr(test, mockall::automock)]
pub trait EditorHost {
    /// Every open window.
    fn windows(&self) -> Vec<WindowId>;

    /// Path of the project definition file open in `window`, if any.
    fn project_file_name(&self, window: WindowId) -> Option<PathBuf>;

    /// The project document open in `window`, if any.
    fn project_data(&self, window: WindowId) -> Option<Value>;

    /// Show a transient message in the status bar.
    fn status_message(&self, message: &str);
}
