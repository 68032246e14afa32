//! Scenario documents and invariant-class detection.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use miette::Diagnostic;
use serde_yaml::Value;
use thiserror::Error;

/// Display name for scenarios without a `name` field.
pub const UNNAMED: &str = "<unnamed>";

/// The invariant classes a scenario can exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseTag {
    /// Images must come from an exactly-matching allowed registry.
    Registry,
    /// Non-admin subjects must not hold wildcard role bindings.
    Wildcard,
    /// Subjects must not reach resources of another tenant.
    Tenant,
}

impl CaseTag {
    pub const ALL: [CaseTag; 3] = [CaseTag::Registry, CaseTag::Wildcard, CaseTag::Tenant];

    pub fn as_str(self) -> &'static str {
        match self {
            CaseTag::Registry => "registry",
            CaseTag::Wildcard => "wildcard",
            CaseTag::Tenant => "tenant",
        }
    }
}

impl fmt::Display for CaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseTag {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaseTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| ScenarioError::UnknownCase {
                found: Some(format!("{s:?}")),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ScenarioError {
    #[error("unknown case: {}", .found.as_deref().unwrap_or("<missing>"))]
    #[diagnostic(
        code(polcheck::scenario::unknown_case),
        help("`case` must be one of: registry, wildcard, tenant")
    )]
    UnknownCase { found: Option<String> },
}

/// One raw scenario document and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioDocument {
    pub source: PathBuf,
    /// Position of the document within its file's stream.
    pub index: usize,
    pub value: Value,
}

impl ScenarioDocument {
    pub fn new(source: impl AsRef<Path>, index: usize, value: Value) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            index,
            value,
        }
    }

    /// The `name` field, or [`UNNAMED`].
    pub fn name(&self) -> String {
        match self.value.get("name") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => UNNAMED.to_string(),
        }
    }

    /// Read the `case` tag.
    pub fn detect_case(&self) -> Result<CaseTag, ScenarioError> {
        let Value::Mapping(map) = &self.value else {
            return Err(ScenarioError::UnknownCase {
                found: Some(format!("<{} document>", value_kind(&self.value))),
            });
        };
        match map.get("case") {
            None | Some(Value::Null) => Err(ScenarioError::UnknownCase { found: None }),
            Some(Value::String(s)) => s.parse(),
            Some(other) => Err(ScenarioError::UnknownCase {
                found: Some(render_value(other)),
            }),
        }
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => format!("<{}>", value_kind(other)),
    }
}
