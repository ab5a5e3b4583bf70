//! Dispatcher tests: persistence wiring and idempotence.

use std::path::PathBuf;

use polars::prelude::{Column, DataFrame};
use serde_json::json;

use dq_model::parse_rule;
use dq_report::ReportStore;
use dq_validate::{DispatchError, FrameSource, SourceHandle, dispatch};

fn scratch_store(label: &str) -> ReportStore {
    let dir = std::env::temp_dir().join(format!(
        "dq-dispatch-test-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    ReportStore::open(dir).expect("open store")
}

fn housing() -> SourceHandle {
    SourceHandle::Frame(FrameSource::new(
        "Housing",
        DataFrame::new(vec![Column::new("price".into(), vec![100i64, 2500, 50])])
            .expect("dataframe"),
    ))
}

#[tokio::test]
async fn dispatch_runs_the_check_and_writes_artifacts() {
    let store = scratch_store("artifacts");
    let rule = parse_rule(
        &json!({
            "kind": "expect_column_values_to_be_between",
            "parameters": {"column": "price", "min_value": 0, "max_value": 2000}
        })
        .to_string(),
    )
    .expect("valid rule");

    let outcome = dispatch(&rule, &housing(), &store).await.expect("dispatch");
    assert!(!outcome.passed);
    assert_eq!(outcome.details["unexpected_count"], json!(1));

    let suite = store.load_suite("Housing").expect("suite");
    assert_eq!(suite.checks.len(), 1);
    assert!(suite.checks.contains_key("expect_column_values_to_be_between__price"));

    let log = store.load_validations("Housing").expect("log");
    assert_eq!(log.results.len(), 1);

    let docs: PathBuf = store.write_docs("Housing").expect("docs");
    assert!(docs.exists());
}

#[tokio::test]
async fn dispatching_twice_is_idempotent_by_check_name() {
    let store = scratch_store("idempotent");
    let source = housing();
    let rule = parse_rule(
        &json!({
            "kind": "expect_column_values_to_be_between",
            "parameters": {"column": "price", "min_value": 0, "max_value": 2000}
        })
        .to_string(),
    )
    .expect("valid rule");

    let first = dispatch(&rule, &source, &store).await.expect("first dispatch");
    let second = dispatch(&rule, &source, &store).await.expect("second dispatch");

    assert_eq!(first.passed, second.passed);
    assert_eq!(first.details, second.details);
    assert_eq!(first.observed_value, second.observed_value);

    let suite = store.load_suite("Housing").expect("suite");
    assert_eq!(suite.checks.len(), 1);
    let log = store.load_validations("Housing").expect("log");
    assert_eq!(log.results.len(), 1);
}

#[tokio::test]
async fn engine_errors_are_wrapped_with_context() {
    let store = scratch_store("wrapped");
    let rule = parse_rule(
        &json!({
            "kind": "expect_column_values_to_be_unique",
            "parameters": {"column": "missing_column"}
        })
        .to_string(),
    )
    .expect("valid rule");

    let error = dispatch(&rule, &housing(), &store).await.unwrap_err();
    match error {
        DispatchError::Execution {
            kind,
            source,
            column,
            message,
        } => {
            assert_eq!(kind, dq_model::CheckKind::ColumnValuesToBeUnique);
            assert_eq!(source, "Housing");
            assert_eq!(column.as_deref(), Some("missing_column"));
            assert!(message.contains("missing_column"));
        }
        other => panic!("expected Execution, got {other:?}"),
    }

    // Nothing is persisted for a failed execution.
    let suite = store.load_suite("Housing").expect("suite");
    assert!(suite.checks.is_empty());
}

#[tokio::test]
async fn evaluation_faults_still_persist_an_outcome() {
    let store = scratch_store("fault");
    let rule = parse_rule(
        &json!({
            "kind": "expect_column_values_to_match_regex",
            "parameters": {"column": "price", "regex": "("}
        })
        .to_string(),
    )
    .expect("valid rule");

    let outcome = dispatch(&rule, &housing(), &store).await.expect("dispatch");
    assert!(outcome.error.is_some());

    let log = store.load_validations("Housing").expect("log");
    let recorded = log.results.values().next().expect("one result");
    assert!(recorded.outcome.error.is_some());
}
