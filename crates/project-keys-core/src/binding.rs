//! Binding model and the project-scoping transform.
//!
//! Raw bindings come from the `"keys"` array of a project file. Each one may
//! carry a `"platform"` tag; the transform drops bindings excluded on the
//! current platform, strips the tag, and appends a `project` context entry so
//! the binding only fires while that project is the active one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{KeymapError, KeymapResult};
use crate::platform::Platform;

/// Context key answered by the project query hook.
pub const PROJECT_CONTEXT_KEY: &str = "project";

// =============================================================================
// Context Entry
// =============================================================================

/// One entry of a binding's `"context"` list.
///
/// Only `key` is typed. `operator`, `operand`, `match_all` and anything else
/// stay in `fields` exactly as written, explicit `null`s included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub key: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ContextEntry {
    /// `{"key": "project", "operator": "equal", "operand": <identifier>}`
    pub fn project(identifier: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("operator".to_string(), Value::from("equal"));
        fields.insert("operand".to_string(), Value::from(identifier));
        Self {
            key: PROJECT_CONTEXT_KEY.to_string(),
            fields,
        }
    }

    pub fn operator(&self) -> Option<&Value> {
        self.fields.get("operator")
    }

    pub fn operand(&self) -> Option<&Value> {
        self.fields.get("operand")
    }
}

// =============================================================================
// Bindings
// =============================================================================

/// A binding as written in the project file.
///
/// `args` and any other field live in `extra`, untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingSpec {
    pub keys: Vec<String>,

    pub command: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<ContextEntry>>,

    /// `"OSX"`, `"!Windows"`, ... Never written to the generated keymap.
    /// Any JSON value is accepted; only strings can exclude a binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A binding as written to the generated keymap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingRecord {
    pub keys: Vec<String>,

    pub command: String,

    #[serde(default)]
    pub context: Vec<ContextEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BindingRecord {
    pub fn args(&self) -> Option<&Value> {
        self.extra.get("args")
    }
}

impl BindingSpec {
    /// Whether this binding applies on `platform`.
    ///
    /// Only the exclusion marker for `platform` itself removes a binding.
    pub fn applies_to(&self, platform: Platform) -> bool {
        match self.platform.as_ref().and_then(Value::as_str) {
            Some(tag) => tag != platform.exclusion_marker(),
            None => true,
        }
    }

    /// Build the output record scoped to `identifier`.
    pub fn scoped_to(&self, identifier: &str) -> BindingRecord {
        let mut context = self.context.clone().unwrap_or_default();
        context.push(ContextEntry::project(identifier));

        BindingRecord {
            keys: self.keys.clone(),
            command: self.command.clone(),
            context,
            extra: self.extra.clone(),
        }
    }
}

/// Filter `raw` for `platform` and scope every kept binding to `identifier`.
///
/// Input order is preserved. An empty result means the project's keymap
/// should be removed.
pub fn transform(raw: &[BindingSpec], identifier: &str, platform: Platform) -> Vec<BindingRecord> {
    raw.iter()
        .filter(|spec| {
            let keep = spec.applies_to(platform);
            if !keep {
                tracing::debug!(
                    "Skipping binding {:?} -> '{}' on {}",
                    spec.keys,
                    spec.command,
                    platform
                );
            }
            keep
        })
        .map(|spec| spec.scoped_to(identifier))
        .collect()
}

/// Read the `"keys"` array from a project document.
///
/// Missing or `null` keys yield an empty list. Entries that are not valid
/// bindings are skipped with a warning.
pub fn bindings_from_project_data(data: &Value) -> KeymapResult<Vec<BindingSpec>> {
    let items = match data.get("keys") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(KeymapError::InvalidProjectData(format!(
                "\"keys\" must be an array, found {}",
                json_type_name(other)
            )))
        }
    };

    let bindings = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            match serde_json::from_value::<BindingSpec>(item.clone()) {
                Ok(spec) => Some(spec),
                Err(e) => {
                    tracing::warn!("Ignoring invalid binding at keys[{}]: {}", index, e);
                    None
                }
            }
        })
        .collect();

    Ok(bindings)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
