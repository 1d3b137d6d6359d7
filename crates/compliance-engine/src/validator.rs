//! Validation orchestration
//!
//! [`BuildingCodeValidator`] selects regulations from its store, runs each
//! regulation's rules against a design and scores the outcome. Store
//! failures abort the run; rule failures never do.

use serde_json::Value;
use shared_types::ValidationViolation;
use tracing::{info, instrument, warn};

use crate::engine::RuleEngine;
use crate::error::ValidatorError;
use crate::regulation::{Regulation, RegulationFilter, RegulationStore};
use crate::report::ComplianceReport;
use crate::validation::ValidationResult;

pub struct BuildingCodeValidator<S> {
    store: S,
    engine: RuleEngine,
}

impl<S: RegulationStore> BuildingCodeValidator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            engine: RuleEngine::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate a design against every active regulation, or only those of
    /// the given types (in the order the types are listed).
    #[instrument(skip_all, fields(types = ?regulation_types))]
    pub fn validate_design(
        &self,
        design: &Value,
        regulation_types: Option<&[String]>,
    ) -> Result<Vec<ValidationResult>, ValidatorError> {
        let mut results = Vec::new();
        for regulation in self.applicable_regulations(regulation_types)? {
            if let Some(result) = self.validate_regulation(&regulation, design)? {
                results.push(result);
            }
        }
        Ok(results)
    }

    /// Validate against a single regulation; `Ok(None)` when no active
    /// regulation has that code or it has no active rules.
    pub fn validate_specific_regulation(
        &self,
        design: &Value,
        regulation_code: &str,
    ) -> Result<Option<ValidationResult>, ValidatorError> {
        let regulations = self
            .store
            .get_regulations(&RegulationFilter::default())
            .map_err(ValidatorError::Regulations)?;

        match regulations.iter().find(|r| r.code == regulation_code) {
            Some(regulation) => self.validate_regulation(regulation, design),
            None => {
                warn!(code = %regulation_code, "Regulation not found");
                Ok(None)
            }
        }
    }

    pub fn get_compliance_report(&self, building_id: &str, results: &[ValidationResult]) -> ComplianceReport {
        ComplianceReport::from_results(building_id, results)
    }

    fn applicable_regulations(
        &self,
        regulation_types: Option<&[String]>,
    ) -> Result<Vec<Regulation>, ValidatorError> {
        let types = match regulation_types {
            Some(types) if !types.is_empty() => types,
            _ => {
                return self
                    .store
                    .get_regulations(&RegulationFilter::default())
                    .map_err(ValidatorError::Regulations)
            }
        };

        let mut regulations = Vec::new();
        for regulation_type in types {
            let matching = self
                .store
                .get_regulations(&RegulationFilter::by_type(regulation_type))
                .map_err(ValidatorError::Regulations)?;
            regulations.extend(matching);
        }
        Ok(regulations)
    }

    fn validate_regulation(
        &self,
        regulation: &Regulation,
        design: &Value,
    ) -> Result<Option<ValidationResult>, ValidatorError> {
        let rules = self
            .store
            .get_validation_rules(regulation.id)
            .map_err(|source| ValidatorError::Rules {
                regulation_code: regulation.code.clone(),
                source,
            })?;

        if rules.is_empty() {
            warn!(code = %regulation.code, "Regulation has no active rules, skipping");
            return Ok(None);
        }

        let mut result = ValidationResult::new(regulation.id)
            .with_regulation(regulation.code.as_str(), regulation.title.as_str());

        for rule in &rules {
            let outcome = self.engine.execute_rule(rule, design);
            if outcome.passed {
                result.add_passed_rule();
                continue;
            }

            let description = outcome
                .message
                .unwrap_or_else(|| format!("Rule {} failed", rule.rule_name));
            let mut violation = ValidationViolation::new(
                rule.id,
                &rule.rule_name,
                &rule.rule_type,
                rule.severity,
                description,
            );
            if let Some(recommendation) = &rule.description {
                violation = violation.with_recommendation(recommendation.as_str());
            }
            result.add_violation(violation);
        }

        result.calculate_score();
        info!(
            code = %regulation.code,
            status = %result.status(),
            score = result.score(),
            rules = result.total_rules(),
            "Regulation validated"
        );
        Ok(Some(result))
    }
}
