//! Structural requirements: minimum load capacities and material specs

use serde_json::Value;

use super::{as_table, category_data, requirement, short_of, table, DomainHandler, RuleOutcome, Table};
use crate::error::EvaluationError;
use crate::rules::RuleType;

pub struct StructuralHandler;

impl DomainHandler for StructuralHandler {
    fn rule_type(&self) -> RuleType {
        RuleType::Structural
    }

    fn evaluate(&self, logic: &Table, building: &Value) -> Result<RuleOutcome, EvaluationError> {
        let structural = category_data(building, "structural")?;

        if let Some(load_requirements) = requirement(logic, "load_requirements")? {
            let loads = table(structural, "loads")?;
            for (load_type, required) in load_requirements {
                if let Some((actual, required)) = short_of(loads, load_type, required)? {
                    return Ok(RuleOutcome::fail(format!(
                        "Insufficient {} load capacity: {} < {}",
                        load_type, actual, required
                    )));
                }
            }
        }

        if let Some(material_requirements) = requirement(logic, "material_requirements")? {
            let materials = table(structural, "materials")?;
            for (material, required_specs) in material_requirements {
                if !materials.contains_key(material) {
                    return Ok(RuleOutcome::fail(format!(
                        "Missing required material: {}",
                        material
                    )));
                }
                let specs = table(materials, material)?;
                for (spec, required) in as_table(required_specs, material)? {
                    if let Some((actual, required)) = short_of(specs, spec, required)? {
                        return Ok(RuleOutcome::fail(format!(
                            "Insufficient {} for {}: {} < {}",
                            spec, material, actual, required
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
        dispatch(RuleType::Structural, logic.as_object().unwrap(), &building)
    }

    #[test]
    fn test_first_failing_load_is_reported() {
        let outcome = check(
            json!({ "load_requirements": { "dead_load": 100, "live_load": 50 } }),
            json!({ "structural": { "loads": { "dead_load": 80, "live_load": 60 } } }),
        );
        assert_eq!(
            outcome,
            RuleOutcome::fail("Insufficient dead_load load capacity: 80 < 100")
        );
    }

    #[test]
    fn test_short_circuits_on_first_failure() {
        let outcome = check(
            json!({ "load_requirements": { "live_load": 50, "dead_load": 100 } }),
            json!({ "structural": { "loads": { "dead_load": 10, "live_load": 20 } } }),
        );
        assert_eq!(
            outcome,
            RuleOutcome::fail("Insufficient live_load load capacity: 20 < 50")
        );
    }

    #[test]
    fn test_sufficient_loads_pass() {
        let outcome = check(
            json!({ "load_requirements": { "dead_load": 100, "live_load": 50 } }),
            json!({ "structural": { "loads": { "dead_load": 100, "live_load": 60 } } }),
        );
        assert_eq!(outcome, RuleOutcome::pass());
    }

    #[test]
    fn test_absent_load_fails_minimum() {
        let outcome = check(
            json!({ "load_requirements": { "snow_load": 30 } }),
            json!({ "structural": { "loads": {} } }),
        );
        assert_eq!(
            outcome,
            RuleOutcome::fail("Insufficient snow_load load capacity: 0 < 30")
        );
    }

    #[test]
    fn test_absent_section_fails_minimum() {
        let outcome = check(json!({ "load_requirements": { "dead_load": 1 } }), json!({}));
        assert!(!outcome.passed);
    }

    #[test]
    fn test_missing_material() {
        let outcome = check(
            json!({ "material_requirements": { "concrete": { "strength": 3000 } } }),
            json!({ "structural": { "materials": { "steel": { "grade": 50 } } } }),
        );
        assert_eq!(outcome, RuleOutcome::fail("Missing required material: concrete"));
    }

    #[test]
    fn test_insufficient_material_spec() {
        let outcome = check(
            json!({ "material_requirements": { "concrete": { "strength": 3000 } } }),
            json!({ "structural": { "materials": { "concrete": { "strength": 2500 } } } }),
        );
        assert_eq!(
            outcome,
            RuleOutcome::fail("Insufficient strength for concrete: 2500 < 3000")
        );
    }

    #[test]
    fn test_malformed_load_value() {
        let outcome = check(
            json!({ "load_requirements": { "dead_load": 100 } }),
            json!({ "structural": { "loads": { "dead_load": null } } }),
        );
        assert_eq!(
            outcome.message.as_deref(),
            Some("Structural validation error: 'dead_load' must be a number, found null")
        );
    }
}
