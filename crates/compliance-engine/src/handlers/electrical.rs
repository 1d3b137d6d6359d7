//! Electrical: service capacity per load type and circuit wire sizes

use serde_json::Value;

use super::{as_table, category_data, requirement, short_of, table, DomainHandler, RuleOutcome, Table};
use crate::error::EvaluationError;
use crate::rules::RuleType;

pub struct ElectricalHandler;

impl DomainHandler for ElectricalHandler {
    fn rule_type(&self) -> RuleType {
        RuleType::Electrical
    }

    fn evaluate(&self, logic: &Table, building: &Value) -> Result<RuleOutcome, EvaluationError> {
        let electrical = category_data(building, "electrical")?;

        if let Some(load_requirements) = requirement(logic, "load_calculations")? {
            let loads = table(electrical, "loads")?;
            for (load_type, required) in load_requirements {
                if let Some((actual, required)) = short_of(loads, load_type, required)? {
                    return Ok(RuleOutcome::fail(format!(
                        "Insufficient electrical capacity for {}: {} < {}",
                        load_type, actual, required
                    )));
                }
            }
        }

        if let Some(circuit_requirements) = requirement(logic, "circuits")? {
            let circuits = table(electrical, "circuits")?;
            for (circuit, required) in circuit_requirements {
                let required = as_table(required, circuit)?;
                let Some(min_wire_size) = required.get("min_wire_size") else {
                    continue;
                };
                let installed = table(circuits, circuit)?;
                if let Some((actual, min_wire_size)) = short_of(installed, "wire_size", min_wire_size)? {
                    return Ok(RuleOutcome::fail(format!(
                        "Wire size too small for {}: {} < {}",
                        circuit, actual, min_wire_size
                    )));
                }
            }
        }

        Ok(RuleOutcome::pass())
    }
}
