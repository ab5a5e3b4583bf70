//! Normalized result of executing one rule against one source.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::kind::CheckKind;
use crate::rule::Rule;

/// Cap on how many offending values an outcome carries for display.
pub const UNEXPECTED_SAMPLE_LIMIT: usize = 20;

/// The pass/fail result of one dispatch call.
///
/// A failed check is a normal, successful execution with `passed = false`;
/// `error` is populated only when the engine hit an internal fault while
/// evaluating (for example an unparseable regex), never for plain failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub passed: bool,
    pub kind: CheckKind,
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckOutcome {
    /// Outcome of a value-level check counted over individual cells.
    pub fn from_counts(
        rule: &Rule,
        element_count: u64,
        unexpected_count: u64,
        samples: Vec<String>,
    ) -> Self {
        let mut details = Map::new();
        details.insert("element_count".to_string(), Value::from(element_count));
        details.insert("unexpected_count".to_string(), Value::from(unexpected_count));
        if element_count > 0 {
            let percent = (unexpected_count as f64 / element_count as f64) * 100.0;
            if let Some(number) = Number::from_f64(percent) {
                details.insert("unexpected_percent".to_string(), Value::Number(number));
            }
        }
        if !samples.is_empty() {
            let sample: Vec<Value> = samples
                .into_iter()
                .take(UNEXPECTED_SAMPLE_LIMIT)
                .map(Value::String)
                .collect();
            details.insert("partial_unexpected_list".to_string(), Value::Array(sample));
        }
        CheckOutcome {
            passed: unexpected_count == 0,
            kind: rule.kind,
            parameters: rule.parameters.clone(),
            details,
            observed_value: None,
            error: None,
        }
    }

    /// Outcome of an aggregate or table-level check judged on one
    /// observed value.
    pub fn from_observed(rule: &Rule, passed: bool, observed_value: Value) -> Self {
        CheckOutcome {
            passed,
            kind: rule.kind,
            parameters: rule.parameters.clone(),
            details: Map::new(),
            observed_value: Some(observed_value),
            error: None,
        }
    }

    /// Outcome recording an engine-internal evaluation fault.
    pub fn from_evaluation_error(rule: &Rule, message: impl Into<String>) -> Self {
        CheckOutcome {
            passed: false,
            kind: rule.kind,
            parameters: rule.parameters.clone(),
            details: Map::new(),
            observed_value: None,
            error: Some(message.into()),
        }
    }

    /// Attach an extra structured detail field.
    #[must_use]
    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }

    /// Name under which this outcome is persisted; matches
    /// [`Rule::check_name`] for the rule that produced it.
    pub fn check_name(&self) -> String {
        let column = self.parameters.get("column").and_then(Value::as_str);
        match column {
            Some(column) => format!("{}__{}", self.kind, column),
            None => self.kind.to_string(),
        }
    }
}
