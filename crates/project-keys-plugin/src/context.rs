//! The `project` context query.
//!
//! Generated bindings carry `{"key": "project", "operator": "equal", ...}`.
//! The editor asks the plugin to evaluate that entry on every key dispatch,
//! so evaluation is a single string compare with no side effects.

use std::str::FromStr;

use serde_json::Value;

use crate::error::PluginError;
use project_keys_core::PROJECT_CONTEXT_KEY;

/// Context operators understood by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextOperator {
    Equal,
    NotEqual,
    RegexMatch,
    NotRegexMatch,
    RegexContains,
    NotRegexContains,
}

impl FromStr for ContextOperator {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equal" => Ok(ContextOperator::Equal),
            "not_equal" => Ok(ContextOperator::NotEqual),
            "regex_match" => Ok(ContextOperator::RegexMatch),
            "not_regex_match" => Ok(ContextOperator::NotRegexMatch),
            "regex_contains" => Ok(ContextOperator::RegexContains),
            "not_regex_contains" => Ok(ContextOperator::NotRegexContains),
            other => Err(PluginError::UnknownOperator(other.to_string())),
        }
    }
}

/// Answer a context query against the active project identifier.
///
/// `None` means the query is not ours to answer: another key, no project
/// open, or an operator other than equal/not_equal.
pub fn query_project_context(
    active: Option<&str>,
    key: &str,
    operator: ContextOperator,
    operand: &Value,
) -> Option<bool> {
    if key != PROJECT_CONTEXT_KEY {
        return None;
    }
    let lhs = active?;
    let matches = operand.as_str() == Some(lhs);

    match operator {
        ContextOperator::Equal => Some(matches),
        ContextOperator::NotEqual => Some(!matches),
        _ => None,
    }
}
