//! Fire safety: element fire-resistance ratings and means of egress

use serde_json::Value;

use super::{category_data, over, requirement, short_of, table, DomainHandler, RuleOutcome, Table};
use crate::error::EvaluationError;
use crate::rules::RuleType;

pub struct FireSafetyHandler;

impl DomainHandler for FireSafetyHandler {
    fn rule_type(&self) -> RuleType {
        RuleType::FireSafety
    }

    fn evaluate(&self, logic: &Table, building: &Value) -> Result<RuleOutcome, EvaluationError> {
        let fire = category_data(building, "fire_safety")?;

        if let Some(fire_resistance) = requirement(logic, "fire_resistance")? {
            let ratings = table(fire, "fire_ratings")?;
            for (element, required) in fire_resistance {
                if let Some((actual, required)) = short_of(ratings, element, required)? {
                    return Ok(RuleOutcome::fail(format!(
                        "Insufficient fire resistance for {}: {} < {}",
                        element, actual, required
                    )));
                }
            }
        }

        if let Some(egress_requirements) = requirement(logic, "egress")? {
            let egress = table(fire, "egress")?;

            if let Some(required) = egress_requirements.get("exit_width") {
                if let Some((actual, required)) = short_of(egress, "exit_width", required)? {
                    return Ok(RuleOutcome::fail(format!(
                        "Insufficient exit width: {} < {}",
                        actual, required
                    )));
                }
            }

            if let Some(limit) = egress_requirements.get("exit_distance") {
                if let Some((actual, limit)) = over(egress, "exit_distance", limit)? {
                    return Ok(RuleOutcome::fail(format!(
                        "Exit distance too far: {} > {}",
                        actual, limit
                    )));
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
        dispatch(RuleType::FireSafety, logic.as_object().unwrap(), &building)
    }

    #[test]
    fn test_fire_rating_shortfall() {
        let outcome = check(
            json!({ "fire_resistance": { "walls": 2, "floors": 1 } }),
            json!({ "fire_safety": { "fire_ratings": { "walls": 1, "floors": 1 } } }),
        );
        assert_eq!(
            outcome,
            RuleOutcome::fail("Insufficient fire resistance for walls: 1 < 2")
        );
    }

    #[test]
    fn test_egress_within_limits() {
        let outcome = check(
            json!({ "egress": { "exit_width": 44, "exit_distance": 200 } }),
            json!({ "fire_safety": { "egress": { "exit_width": 48, "exit_distance": 150 } } }),
        );
        assert_eq!(outcome, RuleOutcome::pass());
    }

    #[test]
    fn test_exit_too_far() {
        let outcome = check(
            json!({ "egress": { "exit_distance": 200 } }),
            json!({ "fire_safety": { "egress": { "exit_distance": 250.5 } } }),
        );
        assert_eq!(outcome, RuleOutcome::fail("Exit distance too far: 250.5 > 200"));
    }

    #[test]
    fn test_absent_exit_distance_fails_maximum() {
        let outcome = check(
            json!({ "egress": { "exit_distance": 200 } }),
            json!({ "fire_safety": { "egress": {} } }),
        );
        assert_eq!(outcome, RuleOutcome::fail("Exit distance too far: inf > 200"));
    }

    #[test]
    fn test_narrow_exit() {
        let outcome = check(
            json!({ "egress": { "exit_width": 44 } }),
            json!({ "fire_safety": { "egress": { "exit_width": 36 } } }),
        );
        assert_eq!(outcome, RuleOutcome::fail("Insufficient exit width: 36 < 44"));
    }
}
