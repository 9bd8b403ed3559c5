//! Path resolution for generated keymap files.
//!
//! ```text
//! <root>/
//! ├── MyApp/
//! │   ├── Default (Linux).sublime-keymap
//! │   └── Default (OSX).sublime-keymap
//! └── Other/
//!     └── Default (Windows).sublime-keymap
//! ```

use std::path::{Path, PathBuf};

use crate::error::{KeymapError, KeymapResult};
use crate::platform::Platform;

/// Extension of generated keymap files.
pub const KEYMAP_EXTENSION: &str = "sublime-keymap";

/// Project identifier for a project definition file: its base name with
/// extension, e.g. `MyApp.sublime-project`.
pub fn project_identifier(project_file: &Path) -> Option<String> {
    project_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Resolves keymap locations under a fixed root for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapPaths {
    root: PathBuf,
    platform: Platform,
}

impl KeymapPaths {
    pub fn new(root: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            root: root.into(),
            platform,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The root alone, or the per-project directory named after the
    /// identifier with its extension stripped.
    pub fn directory(&self, identifier: Option<&str>) -> PathBuf {
        match identifier {
            Some(id) => self.root.join(strip_extension(id)),
            None => self.root.clone(),
        }
    }

    /// `Default (<Platform>).sublime-keymap`
    pub fn file_name(&self) -> String {
        format!("Default ({}).{}", self.platform, KEYMAP_EXTENSION)
    }

    pub fn file_path(&self, identifier: &str) -> PathBuf {
        self.directory(Some(identifier)).join(self.file_name())
    }

    /// Create the root directory if it does not exist yet.
    pub fn ensure_root(&self) -> KeymapResult<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| KeymapError::io(&self.root, e))?;
        tracing::debug!("Keymap root ready at {:?}", self.root);
        Ok(())
    }
}

fn strip_extension(identifier: &str) -> &str {
    Path::new(identifier)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(identifier)
}
