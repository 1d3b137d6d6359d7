//! Accessibility: clear widths, ramps and doors

use serde_json::Value;

use super::{
    as_table, category_data, over, requirement, short_of, table, truthy, DomainHandler,
    RuleOutcome, Table,
};
use crate::error::EvaluationError;
use crate::rules::RuleType;

pub struct AccessibilityHandler;

impl DomainHandler for AccessibilityHandler {
    fn rule_type(&self) -> RuleType {
        RuleType::Accessibility
    }

    fn evaluate(&self, logic: &Table, building: &Value) -> Result<RuleOutcome, EvaluationError> {
        let accessibility = category_data(building, "accessibility")?;

        if let Some(required) = logic.get("clear_width") {
            if let Some((actual, required)) = short_of(accessibility, "clear_width", required)? {
                return Ok(RuleOutcome::fail(format!(
                    "Insufficient clear width: {} < {}",
                    actual, required
                )));
            }
        }

        if let Some(ramp_requirements) = requirement(logic, "ramp")? {
            let ramp = table(accessibility, "ramp")?;

            if let Some(limit) = ramp_requirements.get("max_slope") {
                if let Some((actual, limit)) = over(ramp, "slope", limit)? {
                    return Ok(RuleOutcome::fail(format!(
                        "Ramp slope too steep: {} > {}",
                        actual, limit
                    )));
                }
            }

            let handrails_required = ramp_requirements.get("handrails").is_some_and(truthy);
            if handrails_required && !ramp.get("handrails").is_some_and(truthy) {
                return Ok(RuleOutcome::fail("Missing required handrails on ramp"));
            }
        }

        if let Some(door_requirements) = requirement(logic, "doors")? {
            let doors = table(accessibility, "doors")?;
            for (door_type, required) in door_requirements {
                let required = as_table(required, door_type)?;
                let door = table(doors, door_type)?;

                if let Some(width) = required.get("width") {
                    if let Some((actual, width)) = short_of(door, "width", width)? {
                        return Ok(RuleOutcome::fail(format!(
                            "Insufficient door width for {}: {} < {}",
                            door_type, actual, width
                        )));
                    }
                }

                if let Some(limit) = required.get("max_threshold") {
                    if let Some((actual, limit)) = over(door, "threshold", limit)? {
                        return Ok(RuleOutcome::fail(format!(
                            "Door threshold too high for {}: {} > {}",
                            door_type, actual, limit
                        )));
                    }
                }
            }
        }

        Ok(RuleOutcome::pass())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::dispatch;
    use serde_json::json;

    fn check(logic: Value, building: Value) -> RuleOutcome {
        dispatch(RuleType::Accessibility, logic.as_object().unwrap(), &building)
    }

    #[test]
    fn test_clear_width_met() {
        let outcome = check(
            json!({ "clear_width": 36 }),
            json!({ "accessibility": { "clear_width": 42 } }),
        );
        assert_eq!(outcome, RuleOutcome::pass());
    }

    #[test]
    fn test_clear_width_short() {
        let outcome = check(
            json!({ "clear_width": 36 }),
            json!({ "accessibility": { "clear_width": 32 } }),
        );
        assert_eq!(outcome, RuleOutcome::fail("Insufficient clear width: 32 < 36"));
    }

    #[test]
    fn test_absent_clear_width_fails() {
        let outcome = check(json!({ "clear_width": 36 }), json!({ "accessibility": {} }));
        assert_eq!(outcome, RuleOutcome::fail("Insufficient clear width: 0 < 36"));
    }

    #[test]
    fn test_steep_ramp() {
        let outcome = check(
            json!({ "ramp": { "max_slope": 0.083 } }),
            json!({ "accessibility": { "ramp": { "slope": 0.1, "handrails": true } } }),
        );
        assert_eq!(outcome, RuleOutcome::fail("Ramp slope too steep: 0.1 > 0.083"));
    }

    #[test]
    fn test_missing_handrails() {
        let outcome = check(
            json!({ "ramp": { "max_slope": 0.083, "handrails": true } }),
            json!({ "accessibility": { "ramp": { "slope": 0.05 } } }),
        );
        assert_eq!(outcome, RuleOutcome::fail("Missing required handrails on ramp"));
    }

    #[test]
    fn test_handrails_not_required_when_false() {
        let outcome = check(
            json!({ "ramp": { "handrails": false } }),
            json!({ "accessibility": { "ramp": {} } }),
        );
        assert_eq!(outcome, RuleOutcome::pass());
    }

    #[test]
    fn test_door_checks() {
        let logic = json!({ "doors": { "entrance": { "width": 32, "max_threshold": 0.5 } } });

        let narrow = check(
            logic.clone(),
            json!({ "accessibility": { "doors": { "entrance": { "width": 30, "threshold": 0.25 } } } }),
        );
        assert_eq!(
            narrow,
            RuleOutcome::fail("Insufficient door width for entrance: 30 < 32")
        );

        let high = check(
            logic.clone(),
            json!({ "accessibility": { "doors": { "entrance": { "width": 36, "threshold": 0.75 } } } }),
        );
        assert_eq!(
            high,
            RuleOutcome::fail("Door threshold too high for entrance: 0.75 > 0.5")
        );

        let ok = check(
            logic,
            json!({ "accessibility": { "doors": { "entrance": { "width": 36, "threshold": 0.5 } } } }),
        );
        assert_eq!(ok, RuleOutcome::pass());
    }
}
