//! Step guard evaluation
//!
//! A guard is a group of entity-existence checks combined with AND or OR.
//! Every condition in a group is evaluated, even once the overall result is
//! known, so each one can be reported. A condition that cannot be evaluated
//! (unknown model, malformed filter) counts as unmet and never aborts the run.

use crate::datastore::{DataStore, EntityType, Model};
use crate::document::{Condition, ConditionGroup, Logic};
use crate::error::ConditionError;

/// Outcome of a single condition
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionOutcome {
    /// Textual form, e.g. `` `hosts` where `os_name = 'Linux'` ``
    pub condition: String,

    /// Whether the condition holds, or why it could not be evaluated
    pub result: Result<bool, ConditionError>,
}

impl ConditionOutcome {
    /// Whether the condition counts as met
    pub fn is_met(&self) -> bool {
        matches!(self.result, Ok(true))
    }
}

/// Outcome of a whole guard
#[derive(Debug, Clone, PartialEq)]
pub struct GuardOutcome {
    pub logic: Logic,
    pub met: bool,
    pub conditions: Vec<ConditionOutcome>,
}

/// Evaluate an optional guard; a step without one always runs
pub fn evaluate(group: Option<&ConditionGroup>, store: &dyn DataStore) -> GuardOutcome {
    let group = match group {
        Some(group) => group,
        None => {
            return GuardOutcome {
                logic: Logic::And,
                met: true,
                conditions: Vec::new(),
            }
        }
    };

    let conditions: Vec<ConditionOutcome> = group
        .conditions
        .iter()
        .map(|condition| evaluate_condition(condition, store))
        .collect();

    let met = match group.logic {
        Logic::And => conditions.iter().all(ConditionOutcome::is_met),
        Logic::Or => conditions.iter().any(ConditionOutcome::is_met),
    };

    tracing::debug!(logic = %group.logic, met, count = conditions.len(), "guard evaluated");

    GuardOutcome {
        logic: group.logic,
        met,
        conditions,
    }
}

/// Evaluate a single condition against the store
pub fn evaluate_condition(condition: &Condition, store: &dyn DataStore) -> ConditionOutcome {
    let result = condition
        .model
        .parse::<EntityType>()
        .and_then(|entity| {
            let filter = condition.filter.as_deref().ok_or_else(|| {
                ConditionError::MalformedFilter {
                    model: entity.to_string(),
                    error: "missing 'where' clause".to_string(),
                }
            })?;
            Model::bind(entity, store)
                .any(filter)
                .map_err(|e| ConditionError::MalformedFilter {
                    model: entity.to_string(),
                    error: e.to_string(),
                })
        });

    tracing::trace!(condition = %condition, result = ?result, "condition evaluated");

    ConditionOutcome {
        condition: condition.to_string(),
        result,
    }
}
