pub mod error;
pub mod kind;
pub mod outcome;
pub mod rule;
pub mod schema;

pub use error::RuleError;
pub use kind::CheckKind;
pub use outcome::{CheckOutcome, UNEXPECTED_SAMPLE_LIMIT};
pub use rule::{Rule, parse_rule, value_key, within_bounds};
pub use schema::{ColumnSchema, SchemaSummary, SourceSchema};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_and_round_trips() {
        let rule = parse_rule(
            r#"{"kind": "expect_column_values_to_be_between",
                "parameters": {"column": "price", "min_value": 0, "max_value": 2000}}"#,
        )
        .expect("valid rule");
        let outcome = CheckOutcome::from_counts(&rule, 3, 1, vec!["2500".to_string()]);
        assert!(!outcome.passed);

        let json = serde_json::to_string(&outcome).expect("serialize outcome");
        let round: CheckOutcome = serde_json::from_str(&json).expect("deserialize outcome");
        assert_eq!(round.kind, CheckKind::ColumnValuesToBeBetween);
        assert_eq!(round.details["unexpected_count"], serde_json::json!(1));
    }

    #[test]
    fn check_name_is_stable_between_rule_and_outcome() {
        let rule = parse_rule(
            r#"{"kind": "expect_column_values_to_be_unique", "parameters": {"column": "id"}}"#,
        )
        .expect("valid rule");
        let outcome = CheckOutcome::from_counts(&rule, 10, 0, Vec::new());
        assert_eq!(rule.check_name(), outcome.check_name());
        assert_eq!(rule.check_name(), "expect_column_values_to_be_unique__id");
    }
}
