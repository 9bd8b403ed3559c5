//! Reconciliation of the on-disk keymap with the desired bindings.
//!
//! A non-empty binding list is written to the project's keymap file,
//! overwriting whatever was there. An empty list removes the file and, when
//! nothing else is left in it, the project directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::binding::{transform, BindingRecord, BindingSpec};
use crate::error::{KeymapError, KeymapResult};
use crate::paths::KeymapPaths;

/// What a reconcile call did on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The keymap file was (re)written.
    Written { path: PathBuf, bindings: usize },

    /// The desired list was empty.
    Removed {
        file_removed: bool,
        directory_removed: bool,
    },
}

/// Writes and removes generated keymap files.
#[derive(Debug, Clone)]
pub struct Reconciler {
    paths: KeymapPaths,
}

impl Reconciler {
    pub fn new(paths: KeymapPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &KeymapPaths {
        &self.paths
    }

    /// Transform `raw` for the configured platform, then reconcile.
    pub fn sync(&self, identifier: &str, raw: &[BindingSpec]) -> KeymapResult<ReconcileOutcome> {
        let desired = transform(raw, identifier, self.paths.platform());
        self.reconcile(identifier, &desired)
    }

    /// Make the project's keymap file match `desired`.
    pub fn reconcile(
        &self,
        identifier: &str,
        desired: &[BindingRecord],
    ) -> KeymapResult<ReconcileOutcome> {
        if desired.is_empty() {
            self.remove(identifier)
        } else {
            self.write(identifier, desired)
        }
    }

    fn write(&self, identifier: &str, desired: &[BindingRecord]) -> KeymapResult<ReconcileOutcome> {
        let dir = self.paths.directory(Some(identifier));
        let path = self.paths.file_path(identifier);

        let result = std::fs::create_dir_all(&dir)
            .map_err(|e| KeymapError::io(&dir, e))
            .and_then(|()| to_keymap_json(desired))
            .and_then(|contents| {
                std::fs::write(&path, contents).map_err(|e| KeymapError::io(&path, e))
            });

        if let Err(e) = result {
            tracing::error!("Failed to write keymap for '{}': {}", identifier, e);
            return Err(e);
        }

        tracing::info!(
            "Wrote {} project binding(s) for '{}' to {:?}",
            desired.len(),
            identifier,
            path
        );

        Ok(ReconcileOutcome::Written {
            path,
            bindings: desired.len(),
        })
    }

    fn remove(&self, identifier: &str) -> KeymapResult<ReconcileOutcome> {
        let path = self.paths.file_path(identifier);

        let file_removed = match std::fs::remove_file(&path) {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => return Err(KeymapError::io(&path, e)),
        };

        let directory_removed = remove_dir_if_empty(&self.paths.directory(Some(identifier)));

        if file_removed {
            tracing::info!("Removed project keymap for '{}' at {:?}", identifier, path);
        }

        Ok(ReconcileOutcome::Removed {
            file_removed,
            directory_removed,
        })
    }
}

/// Other platforms' keymaps may still live in the directory.
fn remove_dir_if_empty(dir: &Path) -> bool {
    match std::fs::remove_dir(dir) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!("Keeping {:?}: {}", dir, e);
            false
        }
    }
}

/// Pretty-printed JSON with four-space indentation.
fn to_keymap_json(bindings: &[BindingRecord]) -> KeymapResult<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    bindings.serialize(&mut serializer)?;
    Ok(out)
}
