//! Building-level compliance reports

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared_types::ValidationViolation;

use crate::validation::{ValidationResult, ValidationStatus};

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Serialize)]
pub struct RegulationDetail {
    pub regulation_code: String,
    pub regulation_title: String,
    pub status: ValidationStatus,
    pub score: f64,
    pub total_rules: u32,
    pub passed_rules: u32,
    pub failed_rules: u32,
    /// Number of warning-severity violations
    pub warnings: usize,
    pub violations: Vec<ValidationViolation>,
    pub warnings_list: Vec<ValidationViolation>,
}

impl From<&ValidationResult> for RegulationDetail {
    fn from(result: &ValidationResult) -> Self {
        Self {
            regulation_code: result.regulation_code().unwrap_or(UNKNOWN).to_string(),
            regulation_title: result.regulation_title().unwrap_or(UNKNOWN).to_string(),
            status: result.status(),
            score: result.score(),
            total_rules: result.total_rules(),
            passed_rules: result.passed_rules(),
            failed_rules: result.failed_rules(),
            warnings: result.warnings().len(),
            violations: result.violations().to_vec(),
            warnings_list: result.warnings().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub building_id: String,
    pub validation_date: DateTime<Utc>,
    pub overall_status: ValidationStatus,
    pub overall_score: f64,
    pub total_regulations: usize,
    pub passed_regulations: usize,
    pub failed_regulations: usize,
    pub partial_regulations: usize,
    pub total_violations: usize,
    pub total_warnings: usize,
    pub regulation_details: Vec<RegulationDetail>,
}

impl ComplianceReport {
    /// Aggregate per-regulation results. Any failed regulation fails the
    /// building; otherwise any partial one makes it partial.
    pub fn from_results(building_id: &str, results: &[ValidationResult]) -> Self {
        let count = |status: ValidationStatus| results.iter().filter(|r| r.status() == status).count();
        let passed_regulations = count(ValidationStatus::Passed);
        let failed_regulations = count(ValidationStatus::Failed);
        let partial_regulations = count(ValidationStatus::Partial);

        let overall_status = if failed_regulations > 0 {
            ValidationStatus::Failed
        } else if partial_regulations > 0 {
            ValidationStatus::Partial
        } else {
            ValidationStatus::Passed
        };

        let overall_score = if results.is_empty() {
            100.0
        } else {
            results.iter().map(ValidationResult::score).sum::<f64>() / results.len() as f64
        };

        Self {
            building_id: building_id.to_string(),
            validation_date: Utc::now(),
            overall_status,
            overall_score,
            total_regulations: results.len(),
            passed_regulations,
            failed_regulations,
            partial_regulations,
            total_violations: results.iter().map(|r| r.violations().len()).sum(),
            total_warnings: results.iter().map(|r| r.warnings().len()).sum(),
            regulation_details: results.iter().map(RegulationDetail::from).collect(),
        }
    }
}
