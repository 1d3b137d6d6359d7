//! Rule definitions
//!
//! A rule file holds one JSON object or an array of them. Known keys map to
//! [`RuleDefinition`] fields; every other top-level key (`load_requirements`,
//! `egress`, `insulation`, ...) is kept as category logic for the domain
//! handlers.

pub mod schema;
pub mod store;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use shared_types::Severity;

use crate::condition::quoted_list;
use crate::regulation::ValidationRule;

pub use schema::validate_rule_definition;
pub use store::{DuplicatePolicy, RuleStore, RuleSummary};

/// The nine rule categories, each with its own domain handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    Structural,
    FireSafety,
    Accessibility,
    Energy,
    Mechanical,
    Electrical,
    Plumbing,
    Environmental,
    General,
}

impl RuleType {
    pub const ALL: [RuleType; 9] = [
        RuleType::Structural,
        RuleType::FireSafety,
        RuleType::Accessibility,
        RuleType::Energy,
        RuleType::Mechanical,
        RuleType::Electrical,
        RuleType::Plumbing,
        RuleType::Environmental,
        RuleType::General,
    ];

    /// Wire name, also the top-level key of the building record the handler reads
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Structural => "structural",
            RuleType::FireSafety => "fire_safety",
            RuleType::Accessibility => "accessibility",
            RuleType::Energy => "energy",
            RuleType::Mechanical => "mechanical",
            RuleType::Electrical => "electrical",
            RuleType::Plumbing => "plumbing",
            RuleType::Environmental => "environmental",
            RuleType::General => "general",
        }
    }

    /// Human label used to prefix evaluation errors
    pub fn label(&self) -> &'static str {
        match self {
            RuleType::Structural => "Structural",
            RuleType::FireSafety => "Fire safety",
            RuleType::Accessibility => "Accessibility",
            RuleType::Energy => "Energy",
            RuleType::Mechanical => "Mechanical",
            RuleType::Electrical => "Electrical",
            RuleType::Plumbing => "Plumbing",
            RuleType::Environmental => "Environmental",
            RuleType::General => "General",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Rule types stored outside a rule file are free-form strings; anything
    /// unrecognised is evaluated by the general handler.
    pub fn from_stored(s: &str) -> Self {
        match Self::parse(s) {
            Some(rule_type) => rule_type,
            None => RuleType::General,
        }
    }

    pub fn listing() -> String {
        quoted_list(Self::ALL.iter().map(|t| t.as_str()))
    }
}

impl std::fmt::Display for RuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `field operator value` check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    pub field: String,
    pub operator: String,
    pub value: Value,
    #[serde(default)]
    pub message: Option<String>,
}

impl RuleCondition {
    fn to_value(&self) -> Value {
        json!({
            "field": self.field,
            "operator": self.operator,
            "value": self.value,
            "message": self.message,
        })
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_priority() -> i64 {
    1
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub rule_name: String,
    pub rule_type: RuleType,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default)]
    pub conditions: Vec<RuleCondition>,
    #[serde(default)]
    pub actions: Vec<Value>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Category-specific criteria (every key not listed above)
    #[serde(flatten)]
    pub logic: Map<String, Value>,
}

impl RuleDefinition {
    /// Minimal enabled rule with default version, severity and priority
    pub fn new(rule_name: &str, rule_type: RuleType) -> Self {
        Self {
            rule_name: rule_name.to_string(),
            rule_type,
            version: default_version(),
            description: None,
            severity: Severity::default(),
            priority: default_priority(),
            conditions: Vec::new(),
            actions: Vec::new(),
            enabled: true,
            logic: Map::new(),
        }
    }

    /// The mapping handed to domain handlers: category logic plus `conditions`
    pub fn rule_logic(&self) -> Map<String, Value> {
        let mut logic = self.logic.clone();
        logic.insert(
            "conditions".to_string(),
            Value::Array(self.conditions.iter().map(RuleCondition::to_value).collect()),
        );
        logic
    }

    /// Convert into the record a regulation store hands back
    pub fn to_validation_rule(&self, id: u64, regulation_id: u64) -> ValidationRule {
        ValidationRule {
            id,
            regulation_id,
            rule_name: self.rule_name.clone(),
            rule_type: self.rule_type.as_str().to_string(),
            rule_logic: self.rule_logic(),
            severity: self.severity,
            priority: self.priority,
            description: self.description.clone(),
            active: self.enabled,
        }
    }
}
