//! General rules: a list of `field operator value` conditions, all of which
//! must hold. Condition messages are not used in the failure text.

use serde_json::Value;

use super::{DomainHandler, RuleOutcome, Table};
use crate::condition::{compare, display_value, kind, resolve_path};
use crate::error::EvaluationError;
use crate::rules::RuleType;

pub struct GeneralHandler;

impl DomainHandler for GeneralHandler {
    fn rule_type(&self) -> RuleType {
        RuleType::General
    }

    fn evaluate(&self, logic: &Table, building: &Value) -> Result<RuleOutcome, EvaluationError> {
        let conditions = match logic.get("conditions") {
            None => return Ok(RuleOutcome::pass()),
            Some(Value::Array(conditions)) => conditions,
            Some(other) => {
                return Err(EvaluationError::new(format!(
                    "'conditions' must be a list, found {}",
                    kind(other)
                )))
            }
        };

        for condition in conditions {
            let Some(condition) = condition.as_object() else {
                return Err(EvaluationError::new(format!(
                    "condition must be a mapping, found {}",
                    kind(condition)
                )));
            };
            let field = match condition.get("field") {
                Some(Value::String(field)) => field.as_str(),
                Some(other) => {
                    return Err(EvaluationError::new(format!(
                        "condition field must be a string, found {}",
                        kind(other)
                    )))
                }
                None => return Err(EvaluationError::new("condition is missing 'field'")),
            };
            let operator = condition.get("operator").and_then(Value::as_str).unwrap_or("");
            let expected = condition.get("value").unwrap_or(&Value::Null);

            if !compare(resolve_path(building, field), operator, expected)? {
                return Ok(RuleOutcome::fail(format!(
                    "Condition failed: {} {} {}",
                    field,
                    operator,
                    display_value(expected)
                )));
            }
        }

        Ok(RuleOutcome::pass())
    }
}
