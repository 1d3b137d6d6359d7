//! Plumbing: maximum fixture flow rates

use serde_json::Value;

use super::{as_table, category_data, over, requirement, table, DomainHandler, RuleOutcome, Table};
use crate::error::EvaluationError;
use crate::rules::RuleType;

pub struct PlumbingHandler;

impl DomainHandler for PlumbingHandler {
    fn rule_type(&self) -> RuleType {
        RuleType::Plumbing
    }

    fn evaluate(&self, logic: &Table, building: &Value) -> Result<RuleOutcome, EvaluationError> {
        let plumbing = category_data(building, "plumbing")?;

        if let Some(fixture_requirements) = requirement(logic, "fixtures")? {
            let fixtures = table(plumbing, "fixtures")?;
            for (fixture, required) in fixture_requirements {
                let required = as_table(required, fixture)?;
                let Some(limit) = required.get("max_flow_rate") else {
                    continue;
                };
                let installed = table(fixtures, fixture)?;
                if let Some((actual, limit)) = over(installed, "flow_rate", limit)? {
                    return Ok(RuleOutcome::fail(format!(
                        "Flow rate too high for {}: {} > {}",
                        fixture, actual, limit
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
        dispatch(RuleType::Plumbing, logic.as_object().unwrap(), &building)
    }

    #[test]
    fn test_flow_rate_limits() {
        let logic = json!({ "fixtures": {
            "lavatory": { "max_flow_rate": 0.5 },
            "shower": { "max_flow_rate": 2.0 }
        } });

        assert_eq!(
            check(
                logic.clone(),
                json!({ "plumbing": { "fixtures": {
                    "lavatory": { "flow_rate": 0.5 },
                    "shower": { "flow_rate": 1.8 }
                } } })
            ),
            RuleOutcome::pass()
        );
        assert_eq!(
            check(
                logic,
                json!({ "plumbing": { "fixtures": {
                    "lavatory": { "flow_rate": 0.5 },
                    "shower": { "flow_rate": 2.5 }
                } } })
            ),
            RuleOutcome::fail("Flow rate too high for shower: 2.5 > 2.0")
        );
    }

    #[test]
    fn test_unlisted_fixture_fails() {
        let outcome = check(
            json!({ "fixtures": { "urinal": { "max_flow_rate": 0.5 } } }),
            json!({ "plumbing": {} }),
        );
        assert_eq!(outcome, RuleOutcome::fail("Flow rate too high for urinal: inf > 0.5"));
    }
}
