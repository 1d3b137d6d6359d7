use chrono::{DateTime, Utc};

/// Severity declared by a rule and carried by the violations it produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Info];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    /// Parse the lowercase wire form ("error", "warning", "info")
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|severity| severity.as_str() == s)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed or warned rule evaluation.
///
/// Built once by the validator and never changed afterwards; results only
/// hand these out by shared reference.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationViolation {
    pub rule_id: u64,
    pub rule_name: String,
    pub violation_type: String, // rule type, e.g. "structural"
    pub severity: Severity,
    pub description: String,
    pub location: Option<String>,
    pub element_id: Option<String>,
    pub current_value: Option<String>,
    pub required_value: Option<String>,
    pub tolerance: Option<f64>,
    pub recommendation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ValidationViolation {
    pub fn new(
        rule_id: u64,
        rule_name: &str,
        violation_type: &str,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            rule_id,
            rule_name: rule_name.to_string(),
            violation_type: violation_type.to_string(),
            severity,
            description: description.into(),
            location: None,
            element_id: None,
            current_value: None,
            required_value: None,
            tolerance: None,
            recommendation: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }
}
