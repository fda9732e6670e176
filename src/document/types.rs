//! Core task document types
//!
//! This module defines the data structures that represent a task definition file.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Name shown for documents without a `name` field
pub const UNTITLED: &str = "Untitled Task";

/// Top-level task document
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TaskDocument {
    /// Task name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Author (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Description shown by `list` and `show` (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Default variable values
    #[serde(
        rename = "vars",
        default,
        deserialize_with = "deserialize_vars",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub variables: BTreeMap<String, String>,

    /// Steps to execute, in order
    pub steps: Vec<StepDefinition>,
}

impl TaskDocument {
    /// Name used in output when the document has none
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNTITLED)
    }
}

/// A single step of a task
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StepDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Command template with `{{VAR}}` placeholders
    pub command: String,

    /// Guard deciding whether the step runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_if: Option<ConditionGroup>,
}

impl StepDefinition {
    /// Label for the step at `index` (zero based)
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Step {}", index + 1),
        }
    }
}

/// A set of conditions combined with AND or OR
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConditionGroup {
    #[serde(default)]
    pub logic: Logic,

    pub conditions: Vec<Condition>,
}

/// How the conditions of a group are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Logic::And => "and",
            Logic::Or => "or",
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl Serialize for Logic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Logic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_lowercase().as_str() {
            "and" => Ok(Logic::And),
            "or" => Ok(Logic::Or),
            other => Err(D::Error::custom(format!(
                "logic must be 'and' or 'or', got '{}'",
                other
            ))),
        }
    }
}

/// An entity-existence check against the data store
///
/// Both fields are read leniently: a missing or non-string `model` is kept
/// as text and rejected when the condition is evaluated, and a missing
/// `where` leaves `filter` unset. Neither fails the whole document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Condition {
    /// Entity collection name (hosts, services, vulns, creds)
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub model: String,

    /// Filter expression passed through to the data store
    #[serde(
        rename = "where",
        default,
        deserialize_with = "deserialize_optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub filter: Option<String>,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filter {
            Some(filter) => write!(f, "`{}` where `{}`", self.model, filter),
            None => write!(f, "`{}` (no 'where' clause)", self.model),
        }
    }
}

/// Render a YAML scalar as the string a template would see
pub(crate) fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

/// Any scalar as text; null and collections become empty
fn deserialize_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value).unwrap_or_default())
}

/// Any non-null scalar as text; null and collections become `None`
fn deserialize_optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(scalar_to_string(&value))
}

/// Custom deserializer for `vars` that accepts any scalar value
fn deserialize_vars<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::Mapping(map) => {
            let mut vars = BTreeMap::new();
            for (key, value) in map {
                let key = scalar_to_string(&key)
                    .ok_or_else(|| D::Error::custom("variable names must be scalars"))?;
                let value = scalar_to_string(&value).ok_or_else(|| {
                    D::Error::custom(format!("variable '{}' must have a scalar value", key))
                })?;
                vars.insert(key, value);
            }
            Ok(vars)
        }
        Value::Null => Ok(BTreeMap::new()),
        _ => Err(D::Error::custom("vars must be a mapping")),
    }
}
