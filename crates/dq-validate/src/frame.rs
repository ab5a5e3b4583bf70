//! In-memory check engine over Polars frames.
//!
//! Cells are judged one at a time as `AnyValue`s; numeric parsing and
//! string rendering go through the shared conversion helpers so a value
//! compares the same way regardless of the column's inferred dtype.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{AnyValue, Column, DataFrame};
use regex::Regex;

use dq_ingest::{any_to_f64, any_to_string, is_missing};
use dq_model::{
    CheckKind, CheckOutcome, Rule, SourceSchema, UNEXPECTED_SAMPLE_LIMIT, within_bounds,
};

use crate::checks;
use crate::error::EngineError;

/// A named, file-backed frame bound for the current interaction.
#[derive(Debug, Clone)]
pub struct FrameSource {
    name: String,
    frame: DataFrame,
}

impl FrameSource {
    pub fn new(name: impl Into<String>, frame: DataFrame) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn schema(&self) -> SourceSchema {
        dq_ingest::frame_schema(&self.name, &self.frame)
    }

    /// Evaluate one validated rule against the frame.
    pub fn run_check(&self, rule: &Rule) -> Result<CheckOutcome, EngineError> {
        if rule.kind.is_table_level() {
            return self.table_check(rule);
        }
        let column = self.resolve_column(rule)?;
        match rule.kind {
            CheckKind::ColumnValuesToBeNull => Ok(self.check_null(rule, column, true)),
            CheckKind::ColumnValuesToNotBeNull => Ok(self.check_null(rule, column, false)),
            CheckKind::ColumnValuesToBeInSet => self.check_set_membership(rule, column, true),
            CheckKind::ColumnValuesToNotBeInSet => self.check_set_membership(rule, column, false),
            CheckKind::ColumnValuesToBeBetween => Ok(self.check_between(rule, column)),
            CheckKind::ColumnValuesToMatchRegex => Ok(self.check_regex(rule, column)),
            CheckKind::ColumnValuesToBeUnique => Ok(self.check_unique(rule, column)),
            CheckKind::ColumnValueLengthsToBeBetween => Ok(self.check_lengths(rule, column, None)),
            CheckKind::ColumnValueLengthsToEqual => {
                let expected = rule
                    .integer("value")
                    .ok_or_else(|| EngineError::parameter("value", "an integer is required"))?;
                Ok(self.check_lengths(rule, column, Some(expected)))
            }
            CheckKind::ColumnMeanToBeBetween
            | CheckKind::ColumnMedianToBeBetween
            | CheckKind::ColumnMinToBeBetween
            | CheckKind::ColumnMaxToBeBetween
            | CheckKind::ColumnSumToBeBetween
            | CheckKind::ColumnStdevToBeBetween
            | CheckKind::ColumnQuantileToBeBetween => self.check_aggregate(rule, column),
            CheckKind::ColumnUniqueValueCountToBeBetween => {
                Ok(checks::count_between(rule, self.distinct_keys(column).len() as u64))
            }
            CheckKind::ColumnProportionOfUniqueValuesToBeBetween => {
                let keys = self.non_missing_keys(column);
                if keys.is_empty() {
                    return Ok(CheckOutcome::from_evaluation_error(
                        rule,
                        "column has no non-null values",
                    ));
                }
                let distinct: BTreeSet<&String> = keys.iter().collect();
                let proportion = distinct.len() as f64 / keys.len() as f64;
                Ok(checks::aggregate_between(rule, proportion))
            }
            CheckKind::ColumnDistinctValuesToBeInSet
            | CheckKind::ColumnDistinctValuesToContainSet
            | CheckKind::ColumnDistinctValuesToEqualSet => {
                checks::distinct_set(rule, self.distinct_keys(column))
            }
            _ => unreachable!("table-level kinds handled above"),
        }
    }

    fn table_check(&self, rule: &Rule) -> Result<CheckOutcome, EngineError> {
        match rule.kind {
            CheckKind::TableRowCountToBeBetween => {
                Ok(checks::count_between(rule, self.frame.height() as u64))
            }
            CheckKind::TableRowCountToEqual => {
                checks::count_equals(rule, self.frame.height() as u64)
            }
            CheckKind::TableColumnCountToBeBetween => {
                Ok(checks::count_between(rule, self.frame.width() as u64))
            }
            CheckKind::TableColumnCountToEqual => {
                checks::count_equals(rule, self.frame.width() as u64)
            }
            CheckKind::TableColumnsToMatchOrderedList => {
                checks::columns_ordered(rule, &self.column_names())
            }
            CheckKind::TableColumnsToMatchSet => checks::columns_set(rule, &self.column_names()),
            other => Err(EngineError::parameter(
                "kind",
                format!("{other} is not a table-level check"),
            )),
        }
    }

    fn resolve_column(&self, rule: &Rule) -> Result<&Column, EngineError> {
        let requested = rule
            .column()
            .ok_or_else(|| EngineError::parameter("column", "a column name is required"))?;
        self.frame
            .get_columns()
            .iter()
            .find(|column| column.name().as_str().eq_ignore_ascii_case(requested))
            .ok_or_else(|| EngineError::ColumnNotFound {
                source: self.name.clone(),
                column: requested.to_string(),
            })
    }

    fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names_owned()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    fn check_null(&self, rule: &Rule, column: &Column, expect_null: bool) -> CheckOutcome {
        let height = self.frame.height();
        let mut unexpected = 0u64;
        let mut samples = Vec::new();
        for idx in 0..height {
            let cell = column.get(idx).unwrap_or(AnyValue::Null);
            let missing = is_missing(&cell);
            if missing != expect_null {
                unexpected += 1;
                if expect_null && samples.len() < UNEXPECTED_SAMPLE_LIMIT {
                    samples.push(any_to_string(&cell));
                }
            }
        }
        CheckOutcome::from_counts(rule, height as u64, unexpected, samples)
    }

    fn check_set_membership(
        &self,
        rule: &Rule,
        column: &Column,
        expect_member: bool,
    ) -> Result<CheckOutcome, EngineError> {
        let expected = checks::expected_set(rule, "value_set")?;
        let mut element_count = 0u64;
        let mut unexpected = 0u64;
        let mut samples = Vec::new();
        for key in self.non_missing_keys(column) {
            element_count += 1;
            if expected.contains(&key) != expect_member {
                unexpected += 1;
                if samples.len() < UNEXPECTED_SAMPLE_LIMIT {
                    samples.push(key);
                }
            }
        }
        Ok(CheckOutcome::from_counts(
            rule,
            element_count,
            unexpected,
            samples,
        ))
    }

    fn check_between(&self, rule: &Rule, column: &Column) -> CheckOutcome {
        let (min, max) = rule.bounds();
        let mut element_count = 0u64;
        let mut unexpected = 0u64;
        let mut samples = Vec::new();
        for idx in 0..self.frame.height() {
            let cell = column.get(idx).unwrap_or(AnyValue::Null);
            if is_missing(&cell) {
                continue;
            }
            element_count += 1;
            // A cell that does not read as a number cannot satisfy a
            // numeric range; it counts as unexpected rather than aborting
            // the whole check.
            let in_range = any_to_f64(&cell)
                .map(|value| within_bounds(value, min, max))
                .unwrap_or(false);
            if !in_range {
                unexpected += 1;
                if samples.len() < UNEXPECTED_SAMPLE_LIMIT {
                    samples.push(any_to_string(&cell));
                }
            }
        }
        CheckOutcome::from_counts(rule, element_count, unexpected, samples)
    }

    fn check_regex(&self, rule: &Rule, column: &Column) -> CheckOutcome {
        let pattern = rule.string("regex").unwrap_or_default();
        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(error) => {
                return CheckOutcome::from_evaluation_error(
                    rule,
                    format!("invalid regex {pattern:?}: {error}"),
                );
            }
        };
        let mut element_count = 0u64;
        let mut unexpected = 0u64;
        let mut samples = Vec::new();
        for key in self.non_missing_keys(column) {
            element_count += 1;
            if !regex.is_match(&key) {
                unexpected += 1;
                if samples.len() < UNEXPECTED_SAMPLE_LIMIT {
                    samples.push(key);
                }
            }
        }
        CheckOutcome::from_counts(rule, element_count, unexpected, samples)
    }

    fn check_unique(&self, rule: &Rule, column: &Column) -> CheckOutcome {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for key in self.non_missing_keys(column) {
            *counts.entry(key).or_insert(0) += 1;
        }
        let element_count: u64 = counts.values().sum();
        let mut unexpected = 0u64;
        let mut samples = Vec::new();
        for (key, count) in counts {
            if count > 1 {
                unexpected += count;
                if samples.len() < UNEXPECTED_SAMPLE_LIMIT {
                    samples.push(key);
                }
            }
        }
        CheckOutcome::from_counts(rule, element_count, unexpected, samples)
    }

    fn check_lengths(&self, rule: &Rule, column: &Column, exact: Option<i64>) -> CheckOutcome {
        let (min, max) = rule.bounds();
        let mut element_count = 0u64;
        let mut unexpected = 0u64;
        let mut samples = Vec::new();
        for key in self.non_missing_keys(column) {
            element_count += 1;
            let length = key.chars().count() as i64;
            let ok = match exact {
                Some(expected) => length == expected,
                None => within_bounds(length as f64, min, max),
            };
            if !ok {
                unexpected += 1;
                if samples.len() < UNEXPECTED_SAMPLE_LIMIT {
                    samples.push(key);
                }
            }
        }
        CheckOutcome::from_counts(rule, element_count, unexpected, samples)
    }

    fn check_aggregate(&self, rule: &Rule, column: &Column) -> Result<CheckOutcome, EngineError> {
        let mut values = self.numeric_values(column);
        if values.is_empty() {
            return Ok(CheckOutcome::from_evaluation_error(
                rule,
                "column has no numeric values",
            ));
        }
        let observed = match rule.kind {
            CheckKind::ColumnMeanToBeBetween => mean(&values),
            CheckKind::ColumnMedianToBeBetween => {
                values.sort_by(f64::total_cmp);
                interpolated_quantile(&values, 0.5)
            }
            CheckKind::ColumnQuantileToBeBetween => {
                let q = rule
                    .number("quantile")
                    .ok_or_else(|| EngineError::parameter("quantile", "a number is required"))?;
                if !(0.0..=1.0).contains(&q) {
                    return Err(EngineError::parameter(
                        "quantile",
                        "must be between 0 and 1",
                    ));
                }
                values.sort_by(f64::total_cmp);
                interpolated_quantile(&values, q)
            }
            CheckKind::ColumnMinToBeBetween => values.iter().copied().fold(f64::INFINITY, f64::min),
            CheckKind::ColumnMaxToBeBetween => {
                values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            }
            CheckKind::ColumnSumToBeBetween => values.iter().sum(),
            CheckKind::ColumnStdevToBeBetween => {
                if values.len() < 2 {
                    return Ok(CheckOutcome::from_evaluation_error(
                        rule,
                        "standard deviation needs at least two numeric values",
                    ));
                }
                sample_stdev(&values)
            }
            other => {
                return Err(EngineError::parameter(
                    "kind",
                    format!("{other} is not an aggregate check"),
                ));
            }
        };
        Ok(checks::aggregate_between(rule, observed))
    }

    fn non_missing_keys(&self, column: &Column) -> Vec<String> {
        let mut keys = Vec::new();
        for idx in 0..self.frame.height() {
            let cell = column.get(idx).unwrap_or(AnyValue::Null);
            if !is_missing(&cell) {
                keys.push(any_to_string(&cell));
            }
        }
        keys
    }

    fn distinct_keys(&self, column: &Column) -> BTreeSet<String> {
        self.non_missing_keys(column).into_iter().collect()
    }

    fn numeric_values(&self, column: &Column) -> Vec<f64> {
        let mut values = Vec::new();
        for idx in 0..self.frame.height() {
            let cell = column.get(idx).unwrap_or(AnyValue::Null);
            if is_missing(&cell) {
                continue;
            }
            if let Some(value) = any_to_f64(&cell) {
                values.push(value);
            }
        }
        values
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Linear-interpolation quantile over an already-sorted slice, matching
/// `PERCENTILE_CONT` on the relational side.
fn interpolated_quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

fn sample_stdev(values: &[f64]) -> f64 {
    let mean = mean(values);
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates_between_points() {
        let sorted = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(interpolated_quantile(&sorted, 0.0), 10.0);
        assert_eq!(interpolated_quantile(&sorted, 1.0), 40.0);
        assert_eq!(interpolated_quantile(&sorted, 0.5), 25.0);
    }

    #[test]
    fn stdev_matches_sample_formula() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stdev = sample_stdev(&values);
        assert!((stdev - 2.138).abs() < 0.001);
    }
}
