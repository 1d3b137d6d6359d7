//! Per-regulation validation results
//!
//! A [`ValidationResult`] accumulates rule outcomes for one regulation. The
//! counters are private so that `total_rules == passed_rules + failed_rules`
//! holds after any sequence of updates.

use serde::{Deserialize, Serialize};
use shared_types::{Severity, ValidationViolation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    #[default]
    Pending,
    Passed,
    Partial,
    Failed,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Pending => "pending",
            ValidationStatus::Passed => "passed",
            ValidationStatus::Partial => "partial",
            ValidationStatus::Failed => "failed",
        }
    }

    fn from_score(score: f64) -> Self {
        if score >= 100.0 {
            ValidationStatus::Passed
        } else if score <= 0.0 {
            ValidationStatus::Failed
        } else {
            ValidationStatus::Partial
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    regulation_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    regulation_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    regulation_title: Option<String>,
    status: ValidationStatus,
    score: Option<f64>,
    total_rules: u32,
    passed_rules: u32,
    failed_rules: u32,
    violations: Vec<ValidationViolation>,
    warnings: Vec<ValidationViolation>,
    notices: Vec<ValidationViolation>,
}

impl ValidationResult {
    pub fn new(regulation_id: u64) -> Self {
        Self {
            regulation_id,
            regulation_code: None,
            regulation_title: None,
            status: ValidationStatus::Pending,
            score: None,
            total_rules: 0,
            passed_rules: 0,
            failed_rules: 0,
            violations: Vec::new(),
            warnings: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Attach the regulation's code and title for reporting
    pub fn with_regulation(mut self, code: impl Into<String>, title: impl Into<String>) -> Self {
        self.regulation_code = Some(code.into());
        self.regulation_title = Some(title.into());
        self
    }

    pub fn add_passed_rule(&mut self) {
        self.passed_rules += 1;
        self.total_rules += 1;
    }

    /// Record a failed rule, filed by severity
    pub fn add_violation(&mut self, violation: ValidationViolation) {
        match violation.severity {
            Severity::Error => self.violations.push(violation),
            Severity::Warning => self.warnings.push(violation),
            Severity::Info => self.notices.push(violation),
        }
        self.failed_rules += 1;
        self.total_rules += 1;
    }

    /// Fix the score and derive the status from it
    pub fn calculate_score(&mut self) {
        let score = self.current_score();
        self.score = Some(score);
        self.status = ValidationStatus::from_score(score);
    }

    /// Percentage of rules passed; computed on demand until [`calculate_score`](Self::calculate_score) runs
    pub fn score(&self) -> f64 {
        self.score.unwrap_or_else(|| self.current_score())
    }

    fn current_score(&self) -> f64 {
        if self.total_rules == 0 {
            100.0
        } else {
            f64::from(self.passed_rules) / f64::from(self.total_rules) * 100.0
        }
    }

    pub fn status(&self) -> ValidationStatus {
        self.status
    }

    pub fn regulation_id(&self) -> u64 {
        self.regulation_id
    }

    pub fn regulation_code(&self) -> Option<&str> {
        self.regulation_code.as_deref()
    }

    pub fn regulation_title(&self) -> Option<&str> {
        self.regulation_title.as_deref()
    }

    pub fn total_rules(&self) -> u32 {
        self.total_rules
    }

    pub fn passed_rules(&self) -> u32 {
        self.passed_rules
    }

    pub fn failed_rules(&self) -> u32 {
        self.failed_rules
    }

    pub fn violations(&self) -> &[ValidationViolation] {
        &self.violations
    }

    pub fn warnings(&self) -> &[ValidationViolation] {
        &self.warnings
    }

    pub fn notices(&self) -> &[ValidationViolation] {
        &self.notices
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn severity() -> impl Strategy<Value = Option<Severity>> {
        prop_oneof![
            Just(None),
            Just(Some(Severity::Error)),
            Just(Some(Severity::Warning)),
            Just(Some(Severity::Info)),
        ]
    }

    proptest! {
        /// `None` is a passed rule, `Some(severity)` a violation
        #[test]
        fn counters_stay_consistent(outcomes in prop::collection::vec(severity(), 0..40)) {
            let mut result = ValidationResult::new(1);
            for outcome in &outcomes {
                match outcome {
                    None => result.add_passed_rule(),
                    Some(severity) => result.add_violation(ValidationViolation::new(
                        1, "rule", "general", *severity, "failed",
                    )),
                }
                prop_assert_eq!(result.total_rules(), result.passed_rules() + result.failed_rules());
            }
            result.calculate_score();

            let score = result.score();
            prop_assert!((0.0..=100.0).contains(&score));
            let expected = match result.failed_rules() {
                0 => ValidationStatus::Passed,
                f if f == result.total_rules() => ValidationStatus::Failed,
                _ => ValidationStatus::Partial,
            };
            prop_assert_eq!(result.status(), expected);
        }
    }
}
