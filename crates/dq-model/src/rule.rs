//! Structured validation rules and the candidate-text parser.
//!
//! A [`Rule`] is a check kind plus the parameters needed to evaluate it
//! against a named column or table. Rules normally arrive as model-generated
//! JSON; [`parse_rule`] is lenient about surrounding prose but strict about
//! the allow-list and required parameters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RuleError;
use crate::kind::CheckKind;

/// A validated data-quality rule.
///
/// Unknown extra parameters are kept, not stripped; engines ignore what
/// they do not need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub kind: CheckKind,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl Rule {
    pub fn new(kind: CheckKind, parameters: Map<String, Value>) -> Self {
        Self { kind, parameters }
    }

    /// Stable, human-meaningful name for this rule's persisted artifacts.
    ///
    /// Re-running the same rule against the same source produces the same
    /// name, so artifacts are overwritten rather than accumulated.
    pub fn check_name(&self) -> String {
        match self.column() {
            Some(column) => format!("{}__{}", self.kind, column),
            None => self.kind.to_string(),
        }
    }

    /// The target column, when this rule names one.
    pub fn column(&self) -> Option<&str> {
        self.parameters.get("column").and_then(Value::as_str)
    }

    /// Copy of this rule with the target column rewritten (used by the
    /// relational type-coercion path).
    pub fn with_column(&self, column: &str) -> Rule {
        let mut parameters = self.parameters.clone();
        parameters.insert("column".to_string(), Value::String(column.to_string()));
        Rule {
            kind: self.kind,
            parameters,
        }
    }

    /// Numeric parameter, accepting JSON numbers and numeric strings.
    /// Absent keys and JSON null both read as `None`.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.parameters.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.parameters.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(Value::as_str)
    }

    /// List parameter normalized to comparison keys (see [`value_key`]).
    pub fn value_list(&self, key: &str) -> Option<Vec<String>> {
        let items = self.parameters.get(key)?.as_array()?;
        Some(items.iter().map(value_key).collect())
    }

    /// The `min_value`/`max_value` pair; `None` means unbounded on that side.
    pub fn bounds(&self) -> (Option<f64>, Option<f64>) {
        (self.number("min_value"), self.number("max_value"))
    }
}

/// True when `value` lies within the (optionally half-open) bounds.
pub fn within_bounds(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_some_and(|min| value < min) {
        return false;
    }
    if max.is_some_and(|max| value > max) {
        return false;
    }
    true
}

/// Normalize a JSON value to the string key used for set comparisons.
///
/// Numbers render without a trailing `.0` so an integer-typed column and a
/// float-spelled set member still compare equal.
pub fn value_key(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(f) = n.as_f64() {
                let s = format!("{f}");
                if s.contains('.') {
                    s.trim_end_matches('0').trim_end_matches('.').to_string()
                } else {
                    s
                }
            } else {
                n.to_string()
            }
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse candidate text into a validated [`Rule`].
///
/// Strict JSON parse first; on failure, the first brace-delimited substring
/// (greedy, first `{` to last `}`) is re-parsed so prose-wrapped replies
/// still validate. Kind membership and required parameters are enforced;
/// unknown extra parameters pass through untouched.
pub fn parse_rule(candidate: &str) -> Result<Rule, RuleError> {
    let object = extract_object(candidate)?;

    let kind_name = object
        .get("kind")
        .or_else(|| object.get("expectation_type"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let Some(kind) = CheckKind::parse(kind_name) else {
        return Err(RuleError::unsupported(kind_name));
    };

    let parameters = object
        .get("parameters")
        .or_else(|| object.get("kwargs"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let missing: Vec<String> = kind
        .required_parameters()
        .iter()
        .copied()
        .filter(|key| !matches!(parameters.get(*key), Some(value) if !value.is_null()))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(RuleError::MissingParameters { kind, missing });
    }

    Ok(Rule { kind, parameters })
}

fn extract_object(candidate: &str) -> Result<Map<String, Value>, RuleError> {
    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(candidate) {
        return Ok(object);
    }

    if let (Some(start), Some(end)) = (candidate.find('{'), candidate.rfind('}')) {
        if start < end {
            match serde_json::from_str::<Value>(&candidate[start..=end]) {
                Ok(Value::Object(object)) => return Ok(object),
                Ok(_) => {}
                Err(error) => {
                    return Err(RuleError::Malformed {
                        reason: error.to_string(),
                    });
                }
            }
        }
    }

    Err(RuleError::Malformed {
        reason: "candidate text contains no brace-delimited object".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_bounds_is_half_open_on_missing_sides() {
        assert!(within_bounds(5.0, None, None));
        assert!(within_bounds(5.0, Some(5.0), None));
        assert!(!within_bounds(4.9, Some(5.0), None));
        assert!(within_bounds(5.0, None, Some(5.0)));
        assert!(!within_bounds(5.1, None, Some(5.0)));
    }

    #[test]
    fn value_key_normalizes_numbers() {
        assert_eq!(value_key(&serde_json::json!(100)), "100");
        assert_eq!(value_key(&serde_json::json!(2.50)), "2.5");
        assert_eq!(value_key(&serde_json::json!("PENDING")), "PENDING");
    }
}
