//! Task document validation
//!
//! Checks the raw YAML shape before it is turned into a [`TaskDocument`],
//! so structural problems are reported in terms of the file rather than
//! as serde field errors.
//!
//! [`TaskDocument`]: crate::document::TaskDocument

use crate::error::{DocumentError, DocumentResult};
use serde_yaml::{Mapping, Value};

/// Validate the structure of a parsed task file
pub fn validate_shape(value: &Value) -> DocumentResult<()> {
    let root = value
        .as_mapping()
        .ok_or_else(|| schema("top level must be a mapping with a 'steps' list"))?;

    let steps = match get(root, "steps") {
        Some(Value::Sequence(steps)) => steps,
        Some(_) => return Err(schema("'steps' must be a list")),
        None => return Err(schema("missing 'steps' list")),
    };

    if steps.is_empty() {
        return Err(schema("'steps' must contain at least one step"));
    }

    if let Some(vars) = get(root, "vars") {
        if !vars.is_mapping() && !vars.is_null() {
            return Err(schema("'vars' must be a mapping"));
        }
    }

    for (index, step) in steps.iter().enumerate() {
        validate_step(index, step)?;
    }

    Ok(())
}

/// Validate a single step entry
fn validate_step(index: usize, step: &Value) -> DocumentResult<()> {
    let number = index + 1;
    let step = step
        .as_mapping()
        .ok_or_else(|| schema(format!("step {} must be a mapping", number)))?;

    match get(step, "command") {
        Some(Value::String(_)) => {}
        Some(_) => {
            return Err(schema(format!("step {}: 'command' must be a string", number)));
        }
        None => return Err(schema(format!("step {}: missing 'command'", number))),
    }

    if let Some(run_if) = get(step, "run_if") {
        validate_run_if(number, run_if)?;
    }

    Ok(())
}

/// Validate a `run_if` block
fn validate_run_if(number: usize, run_if: &Value) -> DocumentResult<()> {
    let run_if = run_if.as_mapping().ok_or_else(|| {
        schema(format!(
            "step {}: 'run_if' must be a mapping with a 'conditions' list",
            number
        ))
    })?;

    if let Some(logic) = get(run_if, "logic") {
        let valid = logic
            .as_str()
            .map(|l| matches!(l.trim().to_lowercase().as_str(), "and" | "or"))
            .unwrap_or(false);
        if !valid {
            return Err(schema(format!(
                "step {}: 'logic' must be 'and' or 'or'",
                number
            )));
        }
    }

    let conditions = match get(run_if, "conditions") {
        Some(Value::Sequence(conditions)) if !conditions.is_empty() => conditions,
        _ => {
            return Err(schema(format!(
                "step {}: 'run_if' needs a non-empty 'conditions' list",
                number
            )));
        }
    };

    if !conditions.iter().all(Value::is_mapping) {
        return Err(schema(format!(
            "step {}: each condition must be a mapping",
            number
        )));
    }

    Ok(())
}

fn get<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(key)
}

fn schema(message: impl Into<String>) -> DocumentError {
    DocumentError::Schema(message.into())
}
