//! Property tests for reply sanitization.

use proptest::prelude::{ProptestConfig, any, proptest};

use dq_llm::sanitize;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Wrapping a reply in either fenced-code variant must not change the
    /// sanitized output.
    #[test]
    fn fence_wrapping_is_invisible(body in "[a-zA-Z0-9 ,:{}\"\\[\\]._-]{0,120}") {
        let plain = sanitize(&body);
        let bare_fence = sanitize(&format!("```\n{body}\n```"));
        let json_fence = sanitize(&format!("```json\n{body}\n```"));
        assert_eq!(plain, bare_fence);
        assert_eq!(plain, json_fence);
    }

    /// A Python-spelled null inside otherwise-valid JSON parses after
    /// sanitization, and the value reads back as absent.
    #[test]
    fn none_round_trips_as_null(key in "[a-z_]{1,12}", spaced in any::<bool>()) {
        let raw = if spaced {
            format!(r#"{{"{key}": None}}"#)
        } else {
            format!(r#"{{"{key}":None}}"#)
        };
        let value: serde_json::Value =
            serde_json::from_str(&sanitize(&raw)).expect("sanitized JSON parses");
        assert!(value[&key].is_null());
    }
}

#[test]
fn sanitize_recovers_the_worked_example() {
    let raw = "```json\n{\"kind\": \"expect_column_values_to_be_between\", \"parameters\": {\"column\": \"price\", \"min_value\": 0, \"max_value\": None}}\n```";
    let rule = dq_model::parse_rule(&sanitize(raw)).expect("sanitized reply validates");
    assert_eq!(rule.kind, dq_model::CheckKind::ColumnValuesToBeBetween);
    assert_eq!(rule.bounds(), (Some(0.0), None));
}
