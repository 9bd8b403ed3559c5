//! Lifecycle handling.
//!
//! ## Event Flow
//!
//! ```text
//! [editor]                 [HostAdapter]                [ProjectKeys]
//!    │                          │                             │
//! plugin loaded  ──────► on_start() ──────────────────► on_start(projects)
//! project loaded ──────► on_project_load(window) ─────► on_project_load(id, data)
//! project closing ─────► on_project_close(window) ────► on_project_close(id)
//! key dispatch   ──────► on_query_context(...) ──► query_project_context()
//! ```
//!
//! The adapter resolves windows to project identifiers; `ProjectKeys` only
//! deals in identifiers and project documents, so it can be driven without
//! an editor.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use project_keys_core::{
    bindings_from_project_data, project_identifier, KeymapConfig, ReconcileOutcome, Reconciler,
};

use crate::context::{query_project_context, ContextOperator};
use crate::error::PluginResult;
use crate::host::{EditorHost, WindowId};

/// Status bar text shown when a keymap cannot be written.
pub const WRITE_FAILED_MESSAGE: &str = "Error generating project specific bindings";

// =============================================================================
// Lifecycle Trait
// =============================================================================

/// Events delivered by the host editor.
pub trait ProjectLifecycle {
    /// Plugin loaded: prepare the keymap root and resync every open project.
    fn on_start(&self) -> PluginResult<Vec<ReconcileOutcome>>;

    /// A project finished loading in `window`.
    fn on_project_load(&self, window: WindowId) -> PluginResult<Option<ReconcileOutcome>>;

    /// The project in `window` is about to close.
    fn on_project_close(&self, window: WindowId) -> PluginResult<Option<ReconcileOutcome>>;

    /// Evaluate a binding context entry for `window`.
    fn on_query_context(
        &self,
        window: WindowId,
        key: &str,
        operator: ContextOperator,
        operand: &Value,
    ) -> Option<bool>;
}

// =============================================================================
// Project Keys
// =============================================================================

/// Host-independent lifecycle handling.
#[derive(Debug, Clone)]
pub struct ProjectKeys {
    reconciler: Reconciler,
}

impl ProjectKeys {
    pub fn new(config: &KeymapConfig) -> Self {
        Self {
            reconciler: Reconciler::new(config.paths()),
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Ensure the keymap root exists, then reconcile each open project.
    ///
    /// Every project is attempted; the first failure is returned.
    pub fn on_start<'a, I>(&self, projects: I) -> PluginResult<Vec<ReconcileOutcome>>
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        self.reconciler.paths().ensure_root()?;

        let mut outcomes = Vec::new();
        let mut first_error = None;
        for (identifier, data) in projects {
            match self.on_project_load(identifier, data) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::warn!("Startup sync failed for '{}': {}", identifier, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(outcomes),
        }
    }

    pub fn on_project_load(&self, identifier: &str, data: &Value) -> PluginResult<ReconcileOutcome> {
        let raw = bindings_from_project_data(data)?;
        tracing::debug!("Project '{}' defines {} binding(s)", identifier, raw.len());
        Ok(self.reconciler.sync(identifier, &raw)?)
    }

    pub fn on_project_close(&self, identifier: &str) -> PluginResult<ReconcileOutcome> {
        tracing::debug!("Project '{}' closing", identifier);
        Ok(self.reconciler.reconcile(identifier, &[])?)
    }
}

// =============================================================================
// Host Adapter
// =============================================================================

/// Wires an `EditorHost` to `ProjectKeys`.
pub struct HostAdapter<H: EditorHost> {
    host: H,
    keys: ProjectKeys,

    /// Identifier seen at load time, per window. The host may have dropped
    /// its project pointer by the time the close event arrives.
    loaded: RwLock<HashMap<WindowId, String>>,
}

impl<H: EditorHost> HostAdapter<H> {
    pub fn new(host: H, keys: ProjectKeys) -> Self {
        Self {
            host,
            keys,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn keys(&self) -> &ProjectKeys {
        &self.keys
    }

    fn live_identifier(&self, window: WindowId) -> Option<String> {
        self.host
            .project_file_name(window)
            .and_then(|path| project_identifier(&path))
    }

    /// Show the failure in the status bar and hand the error back.
    fn notify<T>(&self, result: PluginResult<T>) -> PluginResult<T> {
        if let Err(e) = &result {
            tracing::error!("{}: {}", WRITE_FAILED_MESSAGE, e);
            self.host.status_message(WRITE_FAILED_MESSAGE);
        }
        result
    }
}

impl<H: EditorHost> ProjectLifecycle for HostAdapter<H> {
    fn on_start(&self) -> PluginResult<Vec<ReconcileOutcome>> {
        let mut projects = Vec::new();
        for window in self.host.windows() {
            if let Some(identifier) = self.live_identifier(window) {
                let data = self.host.project_data(window).unwrap_or(Value::Null);
                self.loaded.write().insert(window, identifier.clone());
                projects.push((identifier, data));
            }
        }
        tracing::info!("Resyncing {} open project(s)", projects.len());

        let result = self
            .keys
            .on_start(projects.iter().map(|(id, data)| (id.as_str(), data)));
        self.notify(result)
    }

    fn on_project_load(&self, window: WindowId) -> PluginResult<Option<ReconcileOutcome>> {
        let Some(identifier) = self.live_identifier(window) else {
            tracing::debug!("Window {} has no project file", window);
            return Ok(None);
        };
        let data = self.host.project_data(window).unwrap_or(Value::Null);
        self.loaded.write().insert(window, identifier.clone());

        let result = self.keys.on_project_load(&identifier, &data).map(Some);
        self.notify(result)
    }

    fn on_project_close(&self, window: WindowId) -> PluginResult<Option<ReconcileOutcome>> {
        let recorded = self.loaded.write().remove(&window);
        let Some(identifier) = recorded.or_else(|| self.live_identifier(window)) else {
            return Ok(None);
        };

        let result = self.keys.on_project_close(&identifier).map(Some);
        self.notify(result)
    }

    fn on_query_context(
        &self,
        window: WindowId,
        key: &str,
        operator: ContextOperator,
        operand: &Value,
    ) -> Option<bool> {
        let active = self.live_identifier(window);
        query_project_context(active.as_deref(), key, operator, operand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;
    use crate::host::MockEditorHost;
    use project_keys_core::{KeymapError, Platform};
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const PROJECT: &str = "MyApp.sublime-project";

    fn project_keys(platform: Platform) -> (TempDir, ProjectKeys) {
        let temp = tempfile::tempdir().unwrap();
        let config = KeymapConfig::new(temp.path().join("keymaps"), platform);
        (temp, ProjectKeys::new(&config))
    }

    fn project_path() -> PathBuf {
        PathBuf::from("/work/myapp").join(PROJECT)
    }

    #[test]
    fn test_load_then_close() {
        let (_temp, keys) = project_keys(Platform::Linux);
        let data = json!({"keys": [{"keys": ["ctrl+k"], "command": "run_task"}]});
        keys.reconciler().paths().ensure_root().unwrap();

        let outcome = keys.on_project_load(PROJECT, &data).unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Written { bindings: 1, .. }));

        let outcome = keys.on_project_close(PROJECT).unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::Removed {
                file_removed: true,
                directory_removed: true
            }
        );
    }

    #[test]
    fn test_load_without_keys_cleans_up() {
        let (_temp, keys) = project_keys(Platform::Windows);
        keys.on_project_load(PROJECT, &json!({"keys": [{"keys": ["f5"], "command": "go"}]}))
            .unwrap();

        let outcome = keys.on_project_load(PROJECT, &json!({"folders": []})).unwrap();

        assert!(matches!(
            outcome,
            ReconcileOutcome::Removed {
                file_removed: true,
                ..
            }
        ));
        assert!(!keys.reconciler().paths().file_path(PROJECT).exists());
    }

    #[test]
    fn test_on_start_creates_root() {
        let (_temp, keys) = project_keys(Platform::Osx);
        let outcomes = keys.on_start(std::iter::empty()).unwrap();

        assert!(outcomes.is_empty());
        assert!(keys.reconciler().paths().root().is_dir());
    }

    #[test]
    fn test_on_start_attempts_every_project() {
        let (_temp, keys) = project_keys(Platform::Linux);
        let bad = json!({"keys": "nope"});
        let good = json!({"keys": [{"keys": ["a"], "command": "a"}]});

        let err = keys
            .on_start([("Bad.sublime-project", &bad), ("Good.sublime-project", &good)])
            .unwrap_err();

        assert!(matches!(
            err,
            PluginError::Keymap(KeymapError::InvalidProjectData(_))
        ));
        assert!(keys
            .reconciler()
            .paths()
            .file_path("Good.sublime-project")
            .is_file());
    }

    #[test]
    fn test_adapter_load_records_identifier_for_close() {
        let (_temp, keys) = project_keys(Platform::Linux);
        let mut host = MockEditorHost::new();
        let mut lookups = 0;
        // Project pointer is gone by the time the close arrives.
        host.expect_project_file_name().returning(move |_| {
            lookups += 1;
            (lookups == 1).then(project_path)
        });
        host.expect_project_data()
            .returning(|_| Some(json!({"keys": [{"keys": ["ctrl+k"], "command": "x"}]})));
        host.expect_status_message().never();

        let adapter = HostAdapter::new(host, keys);

        let loaded = adapter.on_project_load(7).unwrap();
        assert!(matches!(loaded, Some(ReconcileOutcome::Written { .. })));
        let path = adapter.keys().reconciler().paths().file_path(PROJECT);
        assert!(path.is_file());

        let closed = adapter.on_project_close(7).unwrap();
        assert!(matches!(
            closed,
            Some(ReconcileOutcome::Removed {
                file_removed: true,
                directory_removed: true
            })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_adapter_without_project_is_noop() {
        let (_temp, keys) = project_keys(Platform::Linux);
        let mut host = MockEditorHost::new();
        host.expect_project_file_name().returning(|_| None);
        host.expect_project_data().never();
        host.expect_status_message().never();

        let adapter = HostAdapter::new(host, keys);

        assert!(adapter.on_project_load(1).unwrap().is_none());
        assert!(adapter.on_project_close(1).unwrap().is_none());
        assert_eq!(
            adapter.on_query_context(1, "project", ContextOperator::Equal, &json!(PROJECT)),
            None
        );
    }

    #[test]
    fn test_adapter_reports_failures() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("occupied");
        std::fs::write(&root, b"file, not a directory").unwrap();
        let keys = ProjectKeys::new(&KeymapConfig::new(&root, Platform::Linux));

        let mut host = MockEditorHost::new();
        host.expect_project_file_name()
            .returning(|_| Some(project_path()));
        host.expect_project_data()
            .returning(|_| Some(json!({"keys": [{"keys": ["a"], "command": "a"}]})));
        host.expect_status_message()
            .withf(|message| message.to_string() == WRITE_FAILED_MESSAGE)
            .times(1)
            .return_const(());

        let adapter = HostAdapter::new(host, keys);

        let err = adapter.on_project_load(3).unwrap_err();
        assert!(matches!(err, PluginError::Keymap(KeymapError::Io { .. })));
    }

    #[test]
    fn test_adapter_start_resyncs_open_windows() {
        let (_temp, keys) = project_keys(Platform::Osx);
        let mut host = MockEditorHost::new();
        host.expect_windows().returning(|| vec![1, 2, 3]);
        host.expect_project_file_name().returning(|window| match window {
            1 => Some(PathBuf::from("/a/Alpha.sublime-project")),
            3 => Some(PathBuf::from("/c/Gamma.sublime-project")),
            _ => None,
        });
        host.expect_project_data().returning(|window| match window {
            1 => Some(json!({"keys": [{"keys": ["super+1"], "command": "one"}]})),
            _ => Some(json!({})),
        });
        host.expect_status_message().never();

        let adapter = HostAdapter::new(host, keys);
        let outcomes = adapter.on_start().unwrap();

        assert_eq!(outcomes.len(), 2);
        let paths = adapter.keys().reconciler().paths();
        assert!(paths.file_path("Alpha.sublime-project").is_file());
        assert!(!paths.directory(Some("Gamma.sublime-project")).exists());
    }

    #[test]
    fn test_adapter_query_context() {
        let (_temp, keys) = project_keys(Platform::Linux);
        let mut host = MockEditorHost::new();
        host.expect_project_file_name()
            .returning(|_| Some(project_path()));

        let adapter = HostAdapter::new(host, keys);

        assert_eq!(
            adapter.on_query_context(1, "project", ContextOperator::Equal, &json!(PROJECT)),
            Some(true)
        );
        assert_eq!(
            adapter.on_query_context(1, "project", ContextOperator::NotEqual, &json!(PROJECT)),
            Some(false)
        );
        assert_eq!(
            adapter.on_query_context(1, "selector", ContextOperator::Equal, &json!(PROJECT)),
            None
        );
    }
}
