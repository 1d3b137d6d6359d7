//! Domain rule handlers
//!
//! One handler per [`RuleType`]. Each reads its own top-level section of the
//! building record and checks the criteria named in the rule logic, in
//! document order, stopping at the first failure.
//!
//! Absent readings lose: a missing value counts as `0` against a minimum and
//! as `inf` against a maximum, so a requirement on data that was never
//! supplied always fails.

pub mod accessibility;
pub mod electrical;
pub mod energy;
pub mod environmental;
pub mod fire_safety;
pub mod general;
pub mod mechanical;
pub mod plumbing;
pub mod structural;

use lazy_static::lazy_static;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::condition::kind;
use crate::error::EvaluationError;
use crate::rules::RuleType;

pub type Table = Map<String, Value>;

lazy_static! {
    static ref EMPTY_TABLE: Table = Map::new();
}

/// Pass/fail outcome of one rule evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub passed: bool,
    pub message: Option<String>,
}

impl RuleOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: Some(message.into()),
        }
    }

    /// Failing outcome for malformed logic or data, prefixed with the category label
    pub fn evaluation_error(rule_type: RuleType, err: &EvaluationError) -> Self {
        Self::fail(format!("{} validation error: {}", rule_type.label(), err))
    }
}

/// Category-specific evaluator
pub trait DomainHandler: Sync {
    fn rule_type(&self) -> RuleType;

    /// Evaluate `logic` against the building record. `Err` means the data or
    /// logic was malformed; [`dispatch`] turns it into a failing outcome.
    fn evaluate(&self, logic: &Table, building: &Value) -> Result<RuleOutcome, EvaluationError>;
}

impl RuleType {
    pub fn handler(&self) -> &'static dyn DomainHandler {
        match self {
            RuleType::Structural => &structural::StructuralHandler,
            RuleType::FireSafety => &fire_safety::FireSafetyHandler,
            RuleType::Accessibility => &accessibility::AccessibilityHandler,
            RuleType::Energy => &energy::EnergyHandler,
            RuleType::Mechanical => &mechanical::MechanicalHandler,
            RuleType::Electrical => &electrical::ElectricalHandler,
            RuleType::Plumbing => &plumbing::PlumbingHandler,
            RuleType::Environmental => &environmental::EnvironmentalHandler,
            RuleType::General => &general::GeneralHandler,
        }
    }
}

/// Run the handler for `rule_type`, absorbing evaluation errors
pub fn dispatch(rule_type: RuleType, logic: &Table, building: &Value) -> RuleOutcome {
    match rule_type.handler().evaluate(logic, building) {
        Ok(outcome) => outcome,
        Err(err) => RuleOutcome::evaluation_error(rule_type, &err),
    }
}

// ============================================================================
// Shared lookups
// ============================================================================

/// A numeric reading, remembered as written so messages print `80` not `80.0`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Reading {
    value: f64,
    shown: String,
}

impl Reading {
    pub(crate) fn of(value: &Value, key: &str) -> Result<Self, EvaluationError> {
        match value {
            Value::Number(n) => Ok(Self {
                value: n.as_f64().unwrap_or(f64::NAN),
                shown: n.to_string(),
            }),
            Value::Bool(b) => Ok(Self {
                value: if *b { 1.0 } else { 0.0 },
                shown: b.to_string(),
            }),
            other => Err(EvaluationError::new(format!(
                "'{}' must be a number, found {}",
                key,
                kind(other)
            ))),
        }
    }

    /// Default for an absent reading checked against a minimum
    pub(crate) fn zero() -> Self {
        Self {
            value: 0.0,
            shown: "0".to_string(),
        }
    }

    /// Default for an absent reading checked against a maximum
    pub(crate) fn unbounded() -> Self {
        Self {
            value: f64::INFINITY,
            shown: "inf".to_string(),
        }
    }
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.shown)
    }
}

/// The building record's section for one category; absent means empty
pub(crate) fn category_data<'a>(building: &'a Value, key: &str) -> Result<&'a Table, EvaluationError> {
    let Some(root) = building.as_object() else {
        return Err(EvaluationError::new(format!(
            "building data must be a mapping, found {}",
            kind(building)
        )));
    };
    table(root, key)
}

/// Nested mapping under `key`; absent means empty, anything else is malformed
pub(crate) fn table<'a>(parent: &'a Table, key: &str) -> Result<&'a Table, EvaluationError> {
    match parent.get(key) {
        None => Ok(&EMPTY_TABLE),
        Some(value) => as_table(value, key),
    }
}

pub(crate) fn as_table<'a>(value: &'a Value, key: &str) -> Result<&'a Table, EvaluationError> {
    value.as_object().ok_or_else(|| {
        EvaluationError::new(format!("'{}' must be a mapping, found {}", key, kind(value)))
    })
}

/// Requirement block named `key` in the rule logic, if the rule sets one
pub(crate) fn requirement<'a>(logic: &'a Table, key: &str) -> Result<Option<&'a Table>, EvaluationError> {
    logic.get(key).map(|value| as_table(value, key)).transpose()
}

/// `Some((actual, required))` when the reading at `key` falls short of `required`
pub(crate) fn short_of(
    section: &Table,
    key: &str,
    required: &Value,
) -> Result<Option<(Reading, Reading)>, EvaluationError> {
    let required = Reading::of(required, key)?;
    let actual = match section.get(key) {
        Some(value) => Reading::of(value, key)?,
        None => Reading::zero(),
    };
    Ok((actual.value < required.value).then_some((actual, required)))
}

/// `Some((actual, limit))` when the reading at `key` exceeds `limit`
pub(crate) fn over(
    section: &Table,
    key: &str,
    limit: &Value,
) -> Result<Option<(Reading, Reading)>, EvaluationError> {
    let limit = Reading::of(limit, key)?;
    let actual = match section.get(key) {
        Some(value) => Reading::of(value, key)?,
        None => Reading::unbounded(),
    };
    Ok((actual.value > limit.value).then_some((actual, limit)))
}

/// JSON truthiness: null, false, zero and empty containers are false
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
