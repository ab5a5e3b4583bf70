//! Tests for the generation instruction assembly.

use dq_llm::build_instruction;
use dq_model::{CheckKind, SchemaSummary, SourceSchema};

fn demo_schema() -> SchemaSummary {
    let mut schema = SchemaSummary::new();
    schema.push(
        SourceSchema::new("orders")
            .with_column("order_id", "integer")
            .with_column("status", "text")
            .with_column("total_amount", "float"),
    );
    schema.push(
        SourceSchema::new("Housing")
            .with_column("price", "integer")
            .with_column("zip", "text"),
    );
    schema
}

#[test]
fn instruction_restates_the_full_allow_list() {
    let instruction = build_instruction(&demo_schema());
    for kind in CheckKind::ALL {
        assert!(
            instruction.contains(kind.as_str()),
            "instruction should list {kind}"
        );
    }
}

#[test]
fn instruction_embeds_the_schema_summary() {
    let instruction = build_instruction(&demo_schema());
    assert!(instruction.contains("orders: order_id (integer), status (text), total_amount (float)"));
    assert!(instruction.contains("Housing: price (integer), zip (text)"));
}

#[test]
fn instruction_mandates_json_null_spelling() {
    let instruction = build_instruction(&demo_schema());
    assert!(instruction.contains(r#"{"max_value": null}"#));
    assert!(instruction.contains("never None"));
}

#[test]
fn instruction_carries_worked_examples() {
    let instruction = build_instruction(&demo_schema());
    assert!(instruction.contains("'Column price should be between 0 and 2000000.'"));
    assert!(instruction.contains(r#""value_set": ["COMPLETED", "PENDING", "SHIPPED"]"#));
}

#[test]
fn empty_schema_still_renders() {
    let instruction = build_instruction(&SchemaSummary::new());
    assert!(instruction.contains("no schema available"));
}
