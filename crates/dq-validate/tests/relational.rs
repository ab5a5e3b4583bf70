//! Relational-engine tests.
//!
//! The pure parts (identifier quoting, view naming, type classification)
//! run everywhere; end-to-end execution needs a live database and is
//! gated behind `DATABASE_URL` + `--ignored`.

use dq_validate::{cast_view_name, is_text_type, quote_ident};

#[test]
fn cast_view_name_is_deterministic_per_table_and_column() {
    assert_eq!(cast_view_name("orders", "phone"), "dq_cast_orders_phone");
    assert_eq!(
        cast_view_name("orders", "phone"),
        cast_view_name("orders", "phone")
    );
    assert_ne!(
        cast_view_name("orders", "phone"),
        cast_view_name("customers", "phone")
    );
}

#[test]
fn quote_ident_doubles_embedded_quotes() {
    assert_eq!(quote_ident("price"), "\"price\"");
    assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
}

#[test]
fn text_family_types_are_recognized() {
    assert!(is_text_type("text"));
    assert!(is_text_type("character varying"));
    assert!(is_text_type("VARCHAR"));
    assert!(!is_text_type("integer"));
    assert!(!is_text_type("numeric"));
    assert!(!is_text_type("timestamp without time zone"));
}

mod live {
    //! Requires a reachable Postgres at DATABASE_URL.

    use serde_json::json;

    use dq_model::parse_rule;
    use dq_report::ReportStore;
    use dq_validate::{SourceHandle, TableSource, cast_view_name, connect, dispatch};

    fn scratch_store() -> ReportStore {
        let dir = std::env::temp_dir().join(format!(
            "dq-relational-test-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        ReportStore::open(dir).expect("open store")
    }

    #[tokio::test]
    #[ignore] // Requires DATABASE_URL pointing at a scratch database.
    async fn regex_on_integer_column_takes_the_coercion_path() {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL set");
        let pool = connect(&database_url).await.expect("connect");

        sqlx::query("DROP TABLE IF EXISTS dq_smoke CASCADE")
            .execute(&pool)
            .await
            .expect("drop table");
        sqlx::query("CREATE TABLE dq_smoke (id INT, phone BIGINT)")
            .execute(&pool)
            .await
            .expect("create table");
        sqlx::query("INSERT INTO dq_smoke VALUES (1, 5551234567), (2, 5559876543)")
            .execute(&pool)
            .await
            .expect("insert rows");

        let source = SourceHandle::Table(
            TableSource::resolve(pool.clone(), "dq_smoke")
                .await
                .expect("resolve table"),
        );
        let store = scratch_store();
        let rule = parse_rule(
            &json!({
                "kind": "expect_column_values_to_match_regex",
                "parameters": {"column": "phone", "regex": "^555[0-9]{7}$"}
            })
            .to_string(),
        )
        .expect("valid rule");

        let outcome = dispatch(&rule, &source, &store).await.expect("dispatch");
        assert!(outcome.passed);
        // The executed rule points at the cast column, not the original.
        assert_eq!(
            outcome.parameters["column"],
            json!("phone_text"),
            "coercion should rewrite the column"
        );

        let view_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM information_schema.views WHERE table_name = $1)",
        )
        .bind(cast_view_name("dq_smoke", "phone"))
        .fetch_one(&pool)
        .await
        .expect("view lookup");
        assert!(view_exists);

        // A second dispatch overwrites the same view rather than failing.
        dispatch(&rule, &source, &store).await.expect("re-dispatch");
    }
}
