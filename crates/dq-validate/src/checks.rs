//! Kind-generic check finishers shared by both engines.
//!
//! The engines produce raw observations (counts, aggregates, distinct
//! sets, column listings); the functions here judge them against the rule
//! and build the normalized outcome, so frame and relational dispatch
//! cannot drift apart.

use std::collections::BTreeSet;

use serde_json::{Number, Value};

use dq_model::{CheckKind, CheckOutcome, Rule, within_bounds};

use crate::error::EngineError;

/// Aggregate observed against the rule's `min_value`/`max_value`.
pub(crate) fn aggregate_between(rule: &Rule, observed: f64) -> CheckOutcome {
    let (min, max) = rule.bounds();
    let passed = within_bounds(observed, min, max);
    let value = Number::from_f64(observed)
        .map(Value::Number)
        .unwrap_or(Value::Null);
    CheckOutcome::from_observed(rule, passed, value)
}

/// Count observed against the rule's bounds (row/column/distinct counts).
pub(crate) fn count_between(rule: &Rule, observed: u64) -> CheckOutcome {
    let (min, max) = rule.bounds();
    let passed = within_bounds(observed as f64, min, max);
    CheckOutcome::from_observed(rule, passed, Value::from(observed))
}

/// Count observed against the rule's exact `value`.
pub(crate) fn count_equals(rule: &Rule, observed: u64) -> Result<CheckOutcome, EngineError> {
    let expected = rule
        .integer("value")
        .ok_or_else(|| EngineError::parameter("value", "an integer is required"))?;
    let passed = expected >= 0 && observed == expected as u64;
    Ok(CheckOutcome::from_observed(rule, passed, Value::from(observed)))
}

/// The rule's expected value set, normalized to comparison keys.
pub(crate) fn expected_set(rule: &Rule, key: &str) -> Result<BTreeSet<String>, EngineError> {
    rule.value_list(key)
        .map(|values| values.into_iter().collect())
        .ok_or_else(|| EngineError::parameter(key, "a list of values is required"))
}

/// Judge the three distinct-value-set kinds against the observed set.
pub(crate) fn distinct_set(
    rule: &Rule,
    observed: BTreeSet<String>,
) -> Result<CheckOutcome, EngineError> {
    let expected = expected_set(rule, "value_set")?;
    let unexpected: Vec<String> = observed.difference(&expected).cloned().collect();
    let missing: Vec<String> = expected.difference(&observed).cloned().collect();

    let passed = match rule.kind {
        CheckKind::ColumnDistinctValuesToBeInSet => unexpected.is_empty(),
        CheckKind::ColumnDistinctValuesToContainSet => missing.is_empty(),
        CheckKind::ColumnDistinctValuesToEqualSet => unexpected.is_empty() && missing.is_empty(),
        other => {
            return Err(EngineError::parameter(
                "kind",
                format!("{other} is not a distinct-value-set check"),
            ));
        }
    };

    let observed_value = Value::Array(observed.into_iter().map(Value::String).collect());
    let mut outcome = CheckOutcome::from_observed(rule, passed, observed_value);
    if !unexpected.is_empty()
        && rule.kind != CheckKind::ColumnDistinctValuesToContainSet
    {
        outcome = outcome.with_detail(
            "unexpected_values",
            Value::Array(unexpected.into_iter().map(Value::String).collect()),
        );
    }
    if !missing.is_empty() && rule.kind != CheckKind::ColumnDistinctValuesToBeInSet {
        outcome = outcome.with_detail(
            "missing_values",
            Value::Array(missing.into_iter().map(Value::String).collect()),
        );
    }
    Ok(outcome)
}

/// `expect_table_columns_to_match_ordered_list` over the actual names.
pub(crate) fn columns_ordered(rule: &Rule, names: &[String]) -> Result<CheckOutcome, EngineError> {
    let expected = rule
        .value_list("column_list")
        .ok_or_else(|| EngineError::parameter("column_list", "a list of names is required"))?;
    let passed = names == expected.as_slice();
    let observed = Value::Array(names.iter().cloned().map(Value::String).collect());
    Ok(CheckOutcome::from_observed(rule, passed, observed))
}

/// `expect_table_columns_to_match_set` over the actual names.
pub(crate) fn columns_set(rule: &Rule, names: &[String]) -> Result<CheckOutcome, EngineError> {
    let expected = expected_set(rule, "column_set")?;
    let observed_set: BTreeSet<String> = names.iter().cloned().collect();
    let unexpected: Vec<String> = observed_set.difference(&expected).cloned().collect();
    let missing: Vec<String> = expected.difference(&observed_set).cloned().collect();
    let passed = unexpected.is_empty() && missing.is_empty();

    let observed = Value::Array(names.iter().cloned().map(Value::String).collect());
    let mut outcome = CheckOutcome::from_observed(rule, passed, observed);
    if !unexpected.is_empty() {
        outcome = outcome.with_detail(
            "unexpected_columns",
            Value::Array(unexpected.into_iter().map(Value::String).collect()),
        );
    }
    if !missing.is_empty() {
        outcome = outcome.with_detail(
            "missing_columns",
            Value::Array(missing.into_iter().map(Value::String).collect()),
        );
    }
    Ok(outcome)
}
