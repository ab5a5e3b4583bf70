//! The closed allow-list of supported check kinds.
//!
//! Every other component resolves kinds through this enum; no kind name is
//! hard-coded anywhere else. Adding a kind means adding a variant here,
//! wiring its name and required parameters, and teaching both engines how
//! to evaluate it.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// A supported data-quality check kind.
///
/// Names follow the expectation vocabulary users already know from data
/// quality tooling, so generated rules read naturally in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckKind {
    // Column-level
    ColumnValuesToBeNull,
    ColumnValuesToNotBeNull,
    ColumnValuesToBeInSet,
    ColumnValuesToNotBeInSet,
    ColumnValuesToBeBetween,
    ColumnValuesToMatchRegex,
    ColumnValuesToBeUnique,
    ColumnValueLengthsToBeBetween,
    ColumnValueLengthsToEqual,
    ColumnMeanToBeBetween,
    ColumnMedianToBeBetween,
    ColumnMinToBeBetween,
    ColumnMaxToBeBetween,
    ColumnSumToBeBetween,
    ColumnStdevToBeBetween,
    ColumnQuantileToBeBetween,
    ColumnUniqueValueCountToBeBetween,
    ColumnProportionOfUniqueValuesToBeBetween,
    ColumnDistinctValuesToBeInSet,
    ColumnDistinctValuesToContainSet,
    ColumnDistinctValuesToEqualSet,
    // Table-level
    TableRowCountToBeBetween,
    TableRowCountToEqual,
    TableColumnCountToBeBetween,
    TableColumnCountToEqual,
    TableColumnsToMatchOrderedList,
    TableColumnsToMatchSet,
}

impl CheckKind {
    /// Every supported kind, in display order (column-level first).
    pub const ALL: [CheckKind; 27] = [
        CheckKind::ColumnValuesToBeNull,
        CheckKind::ColumnValuesToNotBeNull,
        CheckKind::ColumnValuesToBeInSet,
        CheckKind::ColumnValuesToNotBeInSet,
        CheckKind::ColumnValuesToBeBetween,
        CheckKind::ColumnValuesToMatchRegex,
        CheckKind::ColumnValuesToBeUnique,
        CheckKind::ColumnValueLengthsToBeBetween,
        CheckKind::ColumnValueLengthsToEqual,
        CheckKind::ColumnMeanToBeBetween,
        CheckKind::ColumnMedianToBeBetween,
        CheckKind::ColumnMinToBeBetween,
        CheckKind::ColumnMaxToBeBetween,
        CheckKind::ColumnSumToBeBetween,
        CheckKind::ColumnStdevToBeBetween,
        CheckKind::ColumnQuantileToBeBetween,
        CheckKind::ColumnUniqueValueCountToBeBetween,
        CheckKind::ColumnProportionOfUniqueValuesToBeBetween,
        CheckKind::ColumnDistinctValuesToBeInSet,
        CheckKind::ColumnDistinctValuesToContainSet,
        CheckKind::ColumnDistinctValuesToEqualSet,
        CheckKind::TableRowCountToBeBetween,
        CheckKind::TableRowCountToEqual,
        CheckKind::TableColumnCountToBeBetween,
        CheckKind::TableColumnCountToEqual,
        CheckKind::TableColumnsToMatchOrderedList,
        CheckKind::TableColumnsToMatchSet,
    ];

    /// Canonical wire name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            CheckKind::ColumnValuesToBeNull => "expect_column_values_to_be_null",
            CheckKind::ColumnValuesToNotBeNull => "expect_column_values_to_not_be_null",
            CheckKind::ColumnValuesToBeInSet => "expect_column_values_to_be_in_set",
            CheckKind::ColumnValuesToNotBeInSet => "expect_column_values_to_not_be_in_set",
            CheckKind::ColumnValuesToBeBetween => "expect_column_values_to_be_between",
            CheckKind::ColumnValuesToMatchRegex => "expect_column_values_to_match_regex",
            CheckKind::ColumnValuesToBeUnique => "expect_column_values_to_be_unique",
            CheckKind::ColumnValueLengthsToBeBetween => {
                "expect_column_value_lengths_to_be_between"
            }
            CheckKind::ColumnValueLengthsToEqual => "expect_column_value_lengths_to_equal",
            CheckKind::ColumnMeanToBeBetween => "expect_column_mean_to_be_between",
            CheckKind::ColumnMedianToBeBetween => "expect_column_median_to_be_between",
            CheckKind::ColumnMinToBeBetween => "expect_column_min_to_be_between",
            CheckKind::ColumnMaxToBeBetween => "expect_column_max_to_be_between",
            CheckKind::ColumnSumToBeBetween => "expect_column_sum_to_be_between",
            CheckKind::ColumnStdevToBeBetween => "expect_column_stdev_to_be_between",
            CheckKind::ColumnQuantileToBeBetween => "expect_column_quantile_to_be_between",
            CheckKind::ColumnUniqueValueCountToBeBetween => {
                "expect_column_unique_value_count_to_be_between"
            }
            CheckKind::ColumnProportionOfUniqueValuesToBeBetween => {
                "expect_column_proportion_of_unique_values_to_be_between"
            }
            CheckKind::ColumnDistinctValuesToBeInSet => {
                "expect_column_distinct_values_to_be_in_set"
            }
            CheckKind::ColumnDistinctValuesToContainSet => {
                "expect_column_distinct_values_to_contain_set"
            }
            CheckKind::ColumnDistinctValuesToEqualSet => {
                "expect_column_distinct_values_to_equal_set"
            }
            CheckKind::TableRowCountToBeBetween => "expect_table_row_count_to_be_between",
            CheckKind::TableRowCountToEqual => "expect_table_row_count_to_equal",
            CheckKind::TableColumnCountToBeBetween => "expect_table_column_count_to_be_between",
            CheckKind::TableColumnCountToEqual => "expect_table_column_count_to_equal",
            CheckKind::TableColumnsToMatchOrderedList => {
                "expect_table_columns_to_match_ordered_list"
            }
            CheckKind::TableColumnsToMatchSet => "expect_table_columns_to_match_set",
        }
    }

    /// Resolve a wire name against the allow-list.
    pub fn parse(name: &str) -> Option<CheckKind> {
        CheckKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == name.trim())
    }

    /// Parameters that must be present for a rule of this kind to be
    /// dispatchable. Bound parameters (`min_value`/`max_value`) are
    /// optional by design: a missing bound means unbounded.
    pub fn required_parameters(self) -> &'static [&'static str] {
        match self {
            CheckKind::ColumnValuesToBeNull
            | CheckKind::ColumnValuesToNotBeNull
            | CheckKind::ColumnValuesToBeBetween
            | CheckKind::ColumnValuesToBeUnique
            | CheckKind::ColumnValueLengthsToBeBetween
            | CheckKind::ColumnMeanToBeBetween
            | CheckKind::ColumnMedianToBeBetween
            | CheckKind::ColumnMinToBeBetween
            | CheckKind::ColumnMaxToBeBetween
            | CheckKind::ColumnSumToBeBetween
            | CheckKind::ColumnStdevToBeBetween
            | CheckKind::ColumnUniqueValueCountToBeBetween
            | CheckKind::ColumnProportionOfUniqueValuesToBeBetween => &["column"],
            CheckKind::ColumnValuesToBeInSet
            | CheckKind::ColumnValuesToNotBeInSet
            | CheckKind::ColumnDistinctValuesToBeInSet
            | CheckKind::ColumnDistinctValuesToContainSet
            | CheckKind::ColumnDistinctValuesToEqualSet => &["column", "value_set"],
            CheckKind::ColumnValuesToMatchRegex => &["column", "regex"],
            CheckKind::ColumnValueLengthsToEqual => &["column", "value"],
            CheckKind::ColumnQuantileToBeBetween => &["column", "quantile"],
            CheckKind::TableRowCountToBeBetween | CheckKind::TableColumnCountToBeBetween => &[],
            CheckKind::TableRowCountToEqual | CheckKind::TableColumnCountToEqual => &["value"],
            CheckKind::TableColumnsToMatchOrderedList => &["column_list"],
            CheckKind::TableColumnsToMatchSet => &["column_set"],
        }
    }

    /// True for kinds that inspect the table as a whole rather than one
    /// column's values.
    pub fn is_table_level(self) -> bool {
        matches!(
            self,
            CheckKind::TableRowCountToBeBetween
                | CheckKind::TableRowCountToEqual
                | CheckKind::TableColumnCountToBeBetween
                | CheckKind::TableColumnCountToEqual
                | CheckKind::TableColumnsToMatchOrderedList
                | CheckKind::TableColumnsToMatchSet
        )
    }

    /// All wire names, for allow-list display.
    pub fn allowed_names() -> Vec<&'static str> {
        CheckKind::ALL.iter().map(|kind| kind.as_str()).collect()
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CheckKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CheckKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KindVisitor;

        impl Visitor<'_> for KindVisitor {
            type Value = CheckKind;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a supported check kind name")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<CheckKind, E> {
                CheckKind::parse(value)
                    .ok_or_else(|| E::custom(format!("unsupported check kind: {value}")))
            }
        }

        deserializer.deserialize_str(KindVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_parse() {
        for kind in CheckKind::ALL {
            assert_eq!(CheckKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(CheckKind::parse("expect_column_values_to_levitate"), None);
    }

    #[test]
    fn column_kinds_require_a_column() {
        for kind in CheckKind::ALL {
            if !kind.is_table_level() {
                assert!(
                    kind.required_parameters().contains(&"column"),
                    "{kind} should require a column"
                );
            }
        }
    }
}
