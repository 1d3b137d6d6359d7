//! Energy: envelope insulation and window performance

use serde_json::Value;

use super::{category_data, over, requirement, short_of, table, DomainHandler, RuleOutcome, Table};
use crate::error::EvaluationError;
use crate::rules::RuleType;

pub struct EnergyHandler;

impl DomainHandler for EnergyHandler {
    fn rule_type(&self) -> RuleType {
        RuleType::Energy
    }

    fn evaluate(&self, logic: &Table, building: &Value) -> Result<RuleOutcome, EvaluationError> {
        let energy = category_data(building, "energy")?;

        if let Some(insulation_requirements) = requirement(logic, "insulation")? {
            let insulation = table(energy, "insulation")?;
            for (element, required) in insulation_requirements {
                if let Some((actual, required)) = short_of(insulation, element, required)? {
                    return Ok(RuleOutcome::fail(format!(
                        "Insufficient insulation for {}: R-{} < R-{}",
                        element, actual, required
                    )));
                }
            }
        }

        if let Some(window_requirements) = requirement(logic, "windows")? {
            let windows = table(energy, "windows")?;

            if let Some(limit) = window_requirements.get("max_u_factor") {
                if let Some((actual, limit)) = over(windows, "u_factor", limit)? {
                    return Ok(RuleOutcome::fail(format!(
                        "Window U-factor too high: {} > {}",
                        actual, limit
                    )));
                }
            }

            if let Some(limit) = window_requirements.get("max_shgc") {
                if let Some((actual, limit)) = over(windows, "shgc", limit)? {
                    return Ok(RuleOutcome::fail(format!(
                        "Window SHGC too high: {} > {}",
                        actual, limit
                    )));
                }
            }
        }

        Ok(RuleOutcome::pass())
    }
}
