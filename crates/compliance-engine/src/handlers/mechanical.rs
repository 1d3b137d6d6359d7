//! Mechanical: HVAC ventilation and equipment efficiency

use serde_json::Value;

use super::{category_data, requirement, short_of, table, DomainHandler, RuleOutcome, Table};
use crate::error::EvaluationError;
use crate::rules::RuleType;

pub struct MechanicalHandler;

impl DomainHandler for MechanicalHandler {
    fn rule_type(&self) -> RuleType {
        RuleType::Mechanical
    }

    fn evaluate(&self, logic: &Table, building: &Value) -> Result<RuleOutcome, EvaluationError> {
        let mechanical = category_data(building, "mechanical")?;

        if let Some(hvac_requirements) = requirement(logic, "hvac")? {
            let hvac = table(mechanical, "hvac")?;

            if let Some(required) = hvac_requirements.get("ventilation_rate") {
                if let Some((actual, required)) = short_of(hvac, "ventilation_rate", required)? {
                    return Ok(RuleOutcome::fail(format!(
                        "Insufficient ventilation rate: {} < {}",
                        actual, required
                    )));
                }
            }

            if let Some(efficiency_requirements) = requirement(hvac_requirements, "equipment_efficiency")? {
                let equipment = table(hvac, "equipment")?;
                for (name, required) in efficiency_requirements {
                    let unit = table(equipment, name)?;
                    if let Some((actual, required)) = short_of(unit, "efficiency", required)? {
                        return Ok(RuleOutcome::fail(format!(
                            "Insufficient efficiency for {}: {} < {}",
                            name, actual, required
                        )));
                    }
                }
            }
        }

        Ok(RuleOutcome::pass())
    }
}
