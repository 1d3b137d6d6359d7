//! Shape checks for raw rule definitions
//!
//! Errors are returned as data; callers decide whether a non-empty list is
//! fatal. A definition that produces no errors always deserializes into a
//! [`RuleDefinition`](super::RuleDefinition).

use serde_json::{Map, Value};
use shared_types::Severity;

use super::RuleType;
use crate::condition::{display_value, quoted_list, Operator};

const REQUIRED_FIELDS: &[&str] = &["rule_name", "rule_type"];
const REQUIRED_CONDITION_FIELDS: &[&str] = &["field", "operator", "value"];

/// Validate a raw rule definition and return human-readable errors
pub fn validate_rule_definition(data: &Value) -> Vec<String> {
    let Some(rule) = data.as_object() else {
        return vec!["Rule definition must be an object".to_string()];
    };

    let mut errors = Vec::new();

    for field in REQUIRED_FIELDS {
        if !rule.contains_key(*field) {
            errors.push(format!("Missing required field: {}", field));
        }
    }

    if let Some(name) = rule.get("rule_name") {
        match name.as_str() {
            Some(name) if !name.trim().is_empty() => {}
            _ => errors.push("rule_name must be a non-empty string".to_string()),
        }
    }

    if let Some(rule_type) = rule.get("rule_type") {
        if rule_type.as_str().and_then(RuleType::parse).is_none() {
            errors.push(format!(
                "Invalid rule_type: {}. Valid types: {}",
                display_value(rule_type),
                RuleType::listing()
            ));
        }
    }

    if let Some(severity) = rule.get("severity") {
        if severity.as_str().and_then(Severity::parse).is_none() {
            errors.push(format!(
                "Invalid severity: {}. Valid severities: {}",
                display_value(severity),
                quoted_list(Severity::ALL.iter().map(|s| s.as_str()))
            ));
        }
    }

    check_type(rule, "version", &mut errors, "version must be a string", Value::is_string);
    check_type(
        rule,
        "description",
        &mut errors,
        "description must be a string or null",
        |v| v.is_string() || v.is_null(),
    );
    check_type(rule, "priority", &mut errors, "priority must be an integer", Value::is_i64);
    check_type(rule, "enabled", &mut errors, "enabled must be a boolean", Value::is_boolean);
    check_type(rule, "actions", &mut errors, "actions must be a list", Value::is_array);

    if let Some(conditions) = rule.get("conditions") {
        match conditions.as_array() {
            Some(conditions) => {
                for (i, condition) in conditions.iter().enumerate() {
                    for error in validate_condition(condition) {
                        errors.push(format!("Condition {}: {}", i, error));
                    }
                }
            }
            None => errors.push("Conditions must be a list".to_string()),
        }
    }

    errors
}

fn validate_condition(condition: &Value) -> Vec<String> {
    let Some(condition) = condition.as_object() else {
        return vec!["Condition must be an object".to_string()];
    };

    let mut errors = Vec::new();

    for field in REQUIRED_CONDITION_FIELDS {
        if !condition.contains_key(*field) {
            errors.push(format!("Missing required field: {}", field));
        }
    }

    check_type(condition, "field", &mut errors, "field must be a string", Value::is_string);

    if let Some(operator) = condition.get("operator") {
        if operator.as_str().and_then(Operator::parse).is_none() {
            errors.push(format!(
                "Invalid operator: {}. Valid operators: {}",
                display_value(operator),
                Operator::listing()
            ));
        }
    }

    check_type(
        condition,
        "message",
        &mut errors,
        "message must be a string or null",
        |v| v.is_string() || v.is_null(),
    );

    errors
}

fn check_type(
    object: &Map<String, Value>,
    key: &str,
    errors: &mut Vec<String>,
    message: &str,
    accepts: impl Fn(&Value) -> bool,
) {
    if let Some(value) = object.get(key) {
        if !accepts(value) {
            errors.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn valid_rule() -> Value {
        json!({
            "rule_name": "occupancy_group",
            "rule_type": "general",
            "severity": "warning",
            "priority": 3,
            "conditions": [
                { "field": "occupancy.group", "operator": "in", "value": ["A", "B"] }
            ]
        })
    }

    #[test]
    fn test_valid_definition_has_no_errors() {
        assert!(validate_rule_definition(&valid_rule()).is_empty());
    }

    #[test]
    fn test_missing_required_fields() {
        let errors = validate_rule_definition(&json!({ "severity": "error" }));
        assert_eq!(
            errors,
            vec![
                "Missing required field: rule_name".to_string(),
                "Missing required field: rule_type".to_string(),
            ]
        );
    }

    #[test]
    fn test_unknown_rule_type_reports_once_with_valid_types() {
        let mut rule = valid_rule();
        rule["rule_type"] = json!("seismic");

        let errors = validate_rule_definition(&rule);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            "Invalid rule_type: seismic. Valid types: ['structural', 'fire_safety', \
             'accessibility', 'energy', 'mechanical', 'electrical', 'plumbing', \
             'environmental', 'general']"
        );
    }

    #[test]
    fn test_invalid_severity() {
        let mut rule = valid_rule();
        rule["severity"] = json!("critical");

        let errors = validate_rule_definition(&rule);
        assert_eq!(
            errors,
            vec!["Invalid severity: critical. Valid severities: ['error', 'warning', 'info']"
                .to_string()]
        );
    }

    #[test]
    fn test_condition_errors_are_indexed() {
        let mut rule = valid_rule();
        rule["conditions"] = json!([
            { "field": "a", "operator": "==", "value": 1 },
            { "field": "b", "operator": "~=" }
        ]);

        let errors = validate_rule_definition(&rule);
        assert_eq!(
            errors,
            vec![
                "Condition 1: Missing required field: value".to_string(),
                "Condition 1: Invalid operator: ~=. Valid operators: \
                 ['==', '!=', '>', '<', '>=', '<=', 'in', 'not_in']"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_conditions_must_be_a_list() {
        let mut rule = valid_rule();
        rule["conditions"] = json!({ "field": "a" });
        assert_eq!(
            validate_rule_definition(&rule),
            vec!["Conditions must be a list".to_string()]
        );
    }

    #[test]
    fn test_field_types_are_checked() {
        let mut rule = valid_rule();
        rule["priority"] = json!("high");
        rule["enabled"] = json!("yes");
        rule["rule_name"] = json!("");

        let errors = validate_rule_definition(&rule);
        assert!(errors.contains(&"rule_name must be a non-empty string".to_string()));
        assert!(errors.contains(&"priority must be an integer".to_string()));
        assert!(errors.contains(&"enabled must be a boolean".to_string()));
    }

    #[test]
    fn test_non_object_definition() {
        assert_eq!(
            validate_rule_definition(&json!(["not", "a", "rule"])),
            vec!["Rule definition must be an object".to_string()]
        );
    }

    #[test]
    fn test_clean_definition_always_deserializes() {
        let rule: Result<super::super::RuleDefinition, _> =
            serde_json::from_value(valid_rule());
        assert!(rule.is_ok());
    }
}
