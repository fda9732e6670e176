//! Variable resolution for command templates
//!
//! Commands reference variables with `{{NAME}}` placeholders. Values come from
//! the document's `vars` block, overridden by `--vars "K=V ..."` on the
//! command line.

use crate::error::{InterpolationError, InterpolationResult};
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

/// Flag introducing runtime variable overrides
pub const VARS_FLAG: &str = "--vars";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder pattern is valid"));

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\w+)=(?:"([^"]*)"|'([^']*)'|(\S+))"#).expect("assignment pattern is valid")
});

/// Replace every `{{name}}` placeholder in `template`
///
/// Fails on the first placeholder with no entry in `vars`. Substituted values
/// are inserted literally and never scanned for further placeholders.
pub fn substitute(template: &str, vars: &HashMap<String, String>) -> InterpolationResult<String> {
    let mut missing = None;

    let result = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        let name = &caps[1];
        match vars.get(name) {
            Some(value) => value.clone(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(InterpolationError::UndefinedVariable(name)),
        None => Ok(result.into_owned()),
    }
}

/// Extract `--vars "K=V ..."` from `args`
///
/// The flag and its argument are removed from `args`. Values may be bare
/// tokens, `"double quoted"` or `'single quoted'`. A `--vars` flag with no
/// following argument is left untouched.
pub fn resolve_overrides(args: &mut Vec<String>) -> HashMap<String, String> {
    let mut overrides = HashMap::new();

    let index = match args.iter().position(|a| a == VARS_FLAG) {
        Some(index) if index + 1 < args.len() => index,
        _ => return overrides,
    };

    let drained: Vec<String> = args.drain(index..index + 2).collect();
    for caps in ASSIGNMENT.captures_iter(&drained[1]) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
            .unwrap_or_default();
        overrides.insert(caps[1].to_string(), value.to_string());
    }

    overrides
}

/// Task defaults overwritten entry by entry with runtime overrides
pub fn merge_variables(
    defaults: &BTreeMap<String, String>,
    overrides: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut vars: HashMap<String, String> = defaults
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    vars.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    vars
}
