//! Environmental: recycled content of sustainable materials

use serde_json::Value;

use super::{as_table, category_data, requirement, short_of, table, DomainHandler, RuleOutcome, Table};
use crate::error::EvaluationError;
use crate::rules::RuleType;

pub struct EnvironmentalHandler;

impl DomainHandler for EnvironmentalHandler {
    fn rule_type(&self) -> RuleType {
        RuleType::Environmental
    }

    fn evaluate(&self, logic: &Table, building: &Value) -> Result<RuleOutcome, EvaluationError> {
        let environmental = category_data(building, "environmental")?;

        if let Some(material_requirements) = requirement(logic, "sustainable_materials")? {
            let materials = table(environmental, "materials")?;
            for (material, required) in material_requirements {
                let required = as_table(required, material)?;
                let Some(minimum) = required.get("min_recycled_content") else {
                    continue;
                };
                let used = table(materials, material)?;
                if let Some((actual, minimum)) = short_of(used, "recycled_content", minimum)? {
                    return Ok(RuleOutcome::fail(format!(
                        "Insufficient recycled content for {}: {}% < {}%",
                        material, actual, minimum
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
        dispatch(RuleType::Environmental, logic.as_object().unwrap(), &building)
    }

    #[test]
    fn test_recycled_content() {
        let logic = json!({ "sustainable_materials": { "steel": { "min_recycled_content": 25 } } });
        assert_eq!(
            check(
                logic.clone(),
                json!({ "environmental": { "materials": { "steel": { "recycled_content": 90 } } } })
            ),
            RuleOutcome::pass()
        );
        assert_eq!(
            check(
                logic,
                json!({ "environmental": { "materials": { "steel": { "recycled_content": 10 } } } })
            ),
            RuleOutcome::fail("Insufficient recycled content for steel: 10% < 25%")
        );
    }

    #[test]
    fn test_missing_material_fails() {
        let outcome = check(
            json!({ "sustainable_materials": { "concrete": { "min_recycled_content": 15 } } }),
            json!({}),
        );
        assert_eq!(
            outcome,
            RuleOutcome::fail("Insufficient recycled content for concrete: 0% < 15%")
        );
    }
}
