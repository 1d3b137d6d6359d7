//! Rule execution
//!
//! [`RuleEngine`] runs a single rule against a building record by handing
//! its logic to the domain handler for its type. Evaluation errors never
//! escape: they are logged and reported as a failing outcome.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::condition::{compare, display_value, resolve_path};
use crate::handlers::{RuleOutcome, Table};
use crate::regulation::ValidationRule;
use crate::rules::{RuleCondition, RuleDefinition, RuleType};

/// Outcome of one condition when a rule is run through [`RuleEngine::test_rule`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionResult {
    pub field: String,
    pub operator: String,
    pub expected_value: Value,
    /// `null` when the field could not be resolved
    pub actual_value: Value,
    pub passed: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleTestReport {
    pub rule_name: String,
    pub rule_type: RuleType,
    pub passed: bool,
    pub message: Option<String>,
    pub condition_results: Vec<ConditionResult>,
    pub tested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// Execute a stored rule; unrecognised rule types run as general rules
    pub fn execute_rule(&self, rule: &ValidationRule, building: &Value) -> RuleOutcome {
        let rule_type = RuleType::from_stored(&rule.rule_type);
        if rule_type.as_str() != rule.rule_type {
            debug!(
                rule = %rule.rule_name,
                stored_type = %rule.rule_type,
                "Unknown rule type, evaluating as general"
            );
        }
        self.run(&rule.rule_name, rule_type, &rule.rule_logic, building)
    }

    /// Execute a rule definition loaded from a rule file
    pub fn execute_definition(&self, rule: &RuleDefinition, building: &Value) -> RuleOutcome {
        self.run(&rule.rule_name, rule.rule_type, &rule.rule_logic(), building)
    }

    fn run(&self, rule_name: &str, rule_type: RuleType, logic: &Table, building: &Value) -> RuleOutcome {
        match rule_type.handler().evaluate(logic, building) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(rule = %rule_name, rule_type = %rule_type, error = %err, "Rule evaluation failed");
                RuleOutcome::evaluation_error(rule_type, &err)
            }
        }
    }

    /// Run a rule against sample data and break down each of its conditions
    pub fn test_rule(&self, rule: &RuleDefinition, data: &Value) -> RuleTestReport {
        let outcome = self.execute_definition(rule, data);
        RuleTestReport {
            rule_name: rule.rule_name.clone(),
            rule_type: rule.rule_type,
            passed: outcome.passed,
            message: outcome.message,
            condition_results: rule.conditions.iter().map(|c| test_condition(c, data)).collect(),
            tested_at: Utc::now(),
        }
    }
}

fn test_condition(condition: &RuleCondition, data: &Value) -> ConditionResult {
    let actual = resolve_path(data, &condition.field);
    let (passed, message) = match compare(actual, &condition.operator, &condition.value) {
        Ok(true) => (true, None),
        Ok(false) => (
            false,
            Some(condition.message.clone().unwrap_or_else(|| {
                format!(
                    "Condition failed: {} {} {}",
                    condition.field,
                    condition.operator,
                    display_value(&condition.value)
                )
            })),
        ),
        Err(err) => (false, Some(format!("Condition test error: {}", err))),
    };

    ConditionResult {
        field: condition.field.clone(),
        operator: condition.operator.clone(),
        expected_value: condition.value.clone(),
        actual_value: actual.cloned().unwrap_or(Value::Null),
        passed,
        message,
    }
}
