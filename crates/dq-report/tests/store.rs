//! Integration tests for the artifact store.

use std::path::PathBuf;

use dq_model::{CheckOutcome, parse_rule};
use dq_report::ReportStore;

fn scratch_root(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "dq-report-test-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn price_rule() -> dq_model::Rule {
    parse_rule(
        r#"{"kind": "expect_column_values_to_be_between",
            "parameters": {"column": "price", "min_value": 0, "max_value": 2000}}"#,
    )
    .expect("valid rule")
}

#[test]
fn upsert_is_idempotent_by_check_name() {
    let store = ReportStore::open(scratch_root("upsert")).expect("open store");
    let rule = price_rule();

    let first = store.upsert_check("Housing", &rule).expect("first upsert");
    let second = store.upsert_check("Housing", &rule).expect("second upsert");
    assert_eq!(first, second);

    let suite = store.load_suite("Housing").expect("load suite");
    assert_eq!(suite.checks.len(), 1);
    assert_eq!(suite.source, "Housing");
}

#[test]
fn recorded_outcomes_overwrite_by_name() {
    let store = ReportStore::open(scratch_root("record")).expect("open store");
    let rule = price_rule();
    store.upsert_check("Housing", &rule).expect("upsert");

    let failing = CheckOutcome::from_counts(&rule, 3, 1, vec!["2500".to_string()]);
    store.record_outcome("Housing", &failing).expect("record");
    let passing = CheckOutcome::from_counts(&rule, 3, 0, Vec::new());
    store.record_outcome("Housing", &passing).expect("record again");

    let log = store.load_validations("Housing").expect("load log");
    assert_eq!(log.results.len(), 1);
    let recorded = log.results.values().next().unwrap();
    assert!(recorded.outcome.passed);
}

#[test]
fn docs_page_reflects_the_latest_results() {
    let store = ReportStore::open(scratch_root("docs")).expect("open store");
    let rule = price_rule();
    store.upsert_check("Housing", &rule).expect("upsert");
    let outcome = CheckOutcome::from_counts(&rule, 3, 1, vec!["2500".to_string()]);
    store.record_outcome("Housing", &outcome).expect("record");

    let path = store.write_docs("Housing").expect("write docs");
    let html = std::fs::read_to_string(&path).expect("read docs page");
    assert!(html.contains("expect_column_values_to_be_between__price"));
    assert!(html.contains("FAIL"));

    // Regeneration overwrites the same file.
    let second = store.write_docs("Housing").expect("write docs again");
    assert_eq!(path, second);
}

#[test]
fn unknown_source_loads_as_empty() {
    let store = ReportStore::open(scratch_root("empty")).expect("open store");
    let suite = store.load_suite("Nothing").expect("load");
    assert!(suite.checks.is_empty());
}
