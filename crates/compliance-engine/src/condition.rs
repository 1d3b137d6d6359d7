//! Generic condition evaluation
//!
//! A condition names a dotted field path into the building record, an
//! operator token and an expected value. Resolution never fails: a missing
//! segment yields "not found", and a not-found value fails every comparison.
//! Unknown operator tokens also evaluate to false.

use std::cmp::Ordering;

use serde_json::Value;

use crate::error::EvaluationError;

/// Comparison operators accepted in rule conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    In,
    NotIn,
}

impl Operator {
    pub const ALL: [Operator; 8] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Lt,
        Operator::Ge,
        Operator::Le,
        Operator::In,
        Operator::NotIn,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::In => "in",
            Operator::NotIn => "not_in",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.token() == token)
    }

    /// Bracketed, quoted list of every token, used in schema error messages
    pub fn listing() -> String {
        quoted_list(Self::ALL.iter().map(|op| op.token()))
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Resolve a dotted path such as `structural.loads.dead_load`.
///
/// Returns `None` when a segment is missing, when an intermediate value is
/// not a mapping, or when the value found is `null`.
pub fn resolve_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Apply `operator` to a resolved value.
///
/// `Ok(false)` for a not-found value or an unrecognised operator. `Err` when
/// the operands cannot be compared (e.g. ordering a string against a number).
pub fn compare(
    actual: Option<&Value>,
    operator: &str,
    expected: &Value,
) -> Result<bool, EvaluationError> {
    let Some(actual) = actual else {
        return Ok(false);
    };
    let Some(op) = Operator::parse(operator) else {
        return Ok(false);
    };

    match op {
        Operator::Eq => Ok(loose_eq(actual, expected)),
        Operator::Ne => Ok(!loose_eq(actual, expected)),
        Operator::Gt => Ok(ordering(actual, expected, op)? == Ordering::Greater),
        Operator::Lt => Ok(ordering(actual, expected, op)? == Ordering::Less),
        Operator::Ge => Ok(ordering(actual, expected, op)? != Ordering::Less),
        Operator::Le => Ok(ordering(actual, expected, op)? != Ordering::Greater),
        Operator::In => contains(expected, actual),
        Operator::NotIn => contains(expected, actual).map(|found| !found),
    }
}

/// Fail-closed variant of [`compare`]: evaluation errors count as false
pub fn evaluate(actual: Option<&Value>, operator: &str, expected: &Value) -> bool {
    compare(actual, operator, expected).unwrap_or(false)
}

/// Equality that treats `100` and `100.0` as the same number
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| loose_eq(x, y))
        }
        _ => a == b,
    }
}

fn ordering(actual: &Value, expected: &Value, op: Operator) -> Result<Ordering, EvaluationError> {
    match (actual, expected) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
            x.partial_cmp(&y).ok_or_else(|| {
                EvaluationError::new(format!("'{}' cannot order {} and {}", op, x, y))
            })
        }
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        _ => Err(EvaluationError::new(format!(
            "'{}' not supported between instances of '{}' and '{}'",
            op,
            kind(actual),
            kind(expected)
        ))),
    }
}

fn contains(container: &Value, item: &Value) -> Result<bool, EvaluationError> {
    match (container, item) {
        (Value::Array(items), _) => Ok(items.iter().any(|candidate| loose_eq(candidate, item))),
        (Value::String(haystack), Value::String(needle)) => Ok(haystack.contains(needle.as_str())),
        (Value::Object(map), Value::String(key)) => Ok(map.contains_key(key)),
        // Mapping keys are always strings
        (Value::Object(_), _) => Ok(false),
        (Value::String(_), _) => Err(EvaluationError::new(format!(
            "'in <string>' requires string as left operand, not {}",
            kind(item)
        ))),
        _ => Err(EvaluationError::new(format!(
            "argument of type '{}' is not iterable",
            kind(container)
        ))),
    }
}

/// Short type name of a JSON value, for error messages
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

/// Render a value for human-readable messages: strings unquoted, numbers as written
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn quoted_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = items.map(|item| format!("'{}'", item)).collect();
    format!("[{}]", quoted.join(", "))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i64>().prop_map(|n| json!(n)),
            (-1.0e9f64..1.0e9).prop_map(|n| json!(n)),
            "\\PC{0,12}".prop_map(Value::String),
            any::<bool>().prop_map(Value::Bool),
        ]
    }

    proptest! {
        /// Property: a missing field never satisfies any condition
        #[test]
        fn not_found_never_matches(op in "\\PC{0,8}", expected in scalar()) {
            prop_assert_eq!(compare(None, &op, &expected), Ok(false));
        }

        /// Property: evaluation never panics on arbitrary operands
        #[test]
        fn compare_never_panics(actual in scalar(), expected in scalar(), idx in 0usize..8) {
            let _ = compare(Some(&actual), Operator::ALL[idx].token(), &expected);
        }

        /// Property: in and not_in disagree whenever both succeed
        #[test]
        fn membership_is_negated(item in scalar(), list in prop::collection::vec(scalar(), 0..6)) {
            let container = Value::Array(list);
            let found = compare(Some(&item), "in", &container).unwrap();
            let missing = compare(Some(&item), "not_in", &container).unwrap();
            prop_assert_ne!(found, missing);
        }

        /// Property: path resolution never panics
        #[test]
        fn resolve_never_panics(path in "[a-z.]{0,20}") {
            let data = json!({ "a": { "b": 1 }, "c": [1, 2] });
            let _ = resolve_path(&data, &path);
        }
    }
}
