//! Tests for candidate-text parsing and rule validation.

use dq_model::{CheckKind, RuleError, parse_rule};

#[test]
fn strict_json_parses_directly() {
    let rule = parse_rule(
        r#"{"kind": "expect_column_values_to_be_between",
            "parameters": {"column": "price", "min_value": 0, "max_value": 2000}}"#,
    )
    .expect("valid rule");

    assert_eq!(rule.kind, CheckKind::ColumnValuesToBeBetween);
    assert_eq!(rule.column(), Some("price"));
    assert_eq!(rule.bounds(), (Some(0.0), Some(2000.0)));
}

#[test]
fn prose_wrapped_object_is_extracted() {
    let rule = parse_rule(
        r#"Sure! {"kind": "expect_column_values_to_be_in_set",
            "parameters": {"column": "status",
            "value_set": ["COMPLETED", "PENDING", "SHIPPED"]}} Let me know!"#,
    )
    .expect("embedded object should validate");

    assert_eq!(rule.kind, CheckKind::ColumnValuesToBeInSet);
    assert_eq!(
        rule.value_list("value_set"),
        Some(vec![
            "COMPLETED".to_string(),
            "PENDING".to_string(),
            "SHIPPED".to_string()
        ])
    );
}

#[test]
fn expectation_style_keys_are_accepted() {
    let rule = parse_rule(
        r#"{"expectation_type": "expect_column_values_to_not_be_null",
            "kwargs": {"column": "email"}}"#,
    )
    .expect("alias keys should validate");

    assert_eq!(rule.kind, CheckKind::ColumnValuesToNotBeNull);
    assert_eq!(rule.column(), Some("email"));
}

#[test]
fn text_without_object_is_malformed() {
    let error = parse_rule("I could not find a suitable check.").unwrap_err();
    assert!(matches!(error, RuleError::Malformed { .. }));
}

#[test]
fn broken_braces_are_malformed() {
    let error = parse_rule(r#"{"kind": "expect_column_values_to_be_between", }"#).unwrap_err();
    assert!(matches!(error, RuleError::Malformed { .. }));
}

#[test]
fn unknown_kind_surfaces_the_allow_list() {
    let error = parse_rule(
        r#"{"kind": "expect_column_values_to_be_tidy", "parameters": {"column": "x"}}"#,
    )
    .unwrap_err();

    match error {
        RuleError::UnsupportedKind { kind, allowed } => {
            assert_eq!(kind, "expect_column_values_to_be_tidy");
            assert_eq!(allowed.len(), CheckKind::ALL.len());
            assert!(allowed.contains(&"expect_column_values_to_be_between"));
        }
        other => panic!("expected UnsupportedKind, got {other:?}"),
    }
}

#[test]
fn missing_kind_is_unsupported() {
    let error = parse_rule(r#"{"parameters": {"column": "x"}}"#).unwrap_err();
    assert!(matches!(error, RuleError::UnsupportedKind { .. }));
}

#[test]
fn missing_parameters_name_exactly_the_absent_keys() {
    let error = parse_rule(
        r#"{"kind": "expect_column_values_to_match_regex", "parameters": {"column": "phone"}}"#,
    )
    .unwrap_err();

    match error {
        RuleError::MissingParameters { kind, missing } => {
            assert_eq!(kind, CheckKind::ColumnValuesToMatchRegex);
            assert_eq!(missing, vec!["regex".to_string()]);
        }
        other => panic!("expected MissingParameters, got {other:?}"),
    }
}

#[test]
fn null_required_parameter_counts_as_missing() {
    let error = parse_rule(
        r#"{"kind": "expect_column_values_to_be_in_set",
            "parameters": {"column": "status", "value_set": null}}"#,
    )
    .unwrap_err();

    match error {
        RuleError::MissingParameters { missing, .. } => {
            assert_eq!(missing, vec!["value_set".to_string()]);
        }
        other => panic!("expected MissingParameters, got {other:?}"),
    }
}

#[test]
fn extra_parameters_pass_through() {
    let rule = parse_rule(
        r#"{"kind": "expect_column_values_to_be_between",
            "parameters": {"column": "price", "min_value": 0, "mostly": 0.95}}"#,
    )
    .expect("extra keys tolerated");

    assert_eq!(rule.number("mostly"), Some(0.95));
    assert_eq!(rule.bounds(), (Some(0.0), None));
}

#[test]
fn null_bound_reads_as_unbounded() {
    let rule = parse_rule(
        r#"{"kind": "expect_column_values_to_be_between",
            "parameters": {"column": "price", "min_value": 0, "max_value": null}}"#,
    )
    .expect("null bound tolerated");

    assert_eq!(rule.bounds(), (Some(0.0), None));
}

#[test]
fn column_rewrite_preserves_everything_else() {
    let rule = parse_rule(
        r#"{"kind": "expect_column_values_to_match_regex",
            "parameters": {"column": "phone", "regex": "^[0-9]+$"}}"#,
    )
    .expect("valid rule");
    let rewritten = rule.with_column("phone_text");

    assert_eq!(rewritten.column(), Some("phone_text"));
    assert_eq!(rewritten.string("regex"), Some("^[0-9]+$"));
    assert_eq!(rewritten.kind, rule.kind);
}

#[test]
fn table_level_rule_has_kind_only_check_name() {
    let rule = parse_rule(
        r#"{"kind": "expect_table_row_count_to_be_between",
            "parameters": {"min_value": 1, "max_value": 100}}"#,
    )
    .expect("valid rule");

    assert_eq!(rule.check_name(), "expect_table_row_count_to_be_between");
}
