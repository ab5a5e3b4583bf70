use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use serde_json::Value;

use crate::types::CheckReport;

pub fn print_outcome(report: &CheckReport) {
    let status = if report.outcome.error.is_some() {
        status_cell("ERROR", Color::Yellow)
    } else if report.outcome.passed {
        status_cell("PASS", Color::Green)
    } else {
        status_cell("FAIL", Color::Red)
    };

    let mut banner = Table::new();
    banner.set_header(vec![
        header_cell("Result"),
        header_cell("Check"),
        header_cell("Source"),
    ]);
    apply_table_style(&mut banner);
    banner.add_row(vec![
        status,
        Cell::new(report.outcome.kind.as_str()),
        Cell::new(&report.source),
    ]);
    println!("{banner}");

    if let Some(error) = &report.outcome.error {
        println!("Evaluation fault: {error}");
    }

    let mut detail = Table::new();
    detail.set_header(vec![header_cell("Field"), header_cell("Value")]);
    apply_table_style(&mut detail);
    for (key, value) in &report.outcome.parameters {
        detail.add_row(vec![format!("parameter: {key}"), format_value(value)]);
    }
    for (key, value) in &report.outcome.details {
        detail.add_row(vec![key.clone(), format_value(value)]);
    }
    if let Some(observed) = &report.outcome.observed_value {
        detail.add_row(vec!["observed_value".to_string(), format_value(observed)]);
    }
    println!("{detail}");

    println!("Data docs: {}", report.docs.display());
}

pub fn print_preview(headers: &[String], rows: &[Vec<String>]) {
    let mut table = Table::new();
    table.set_header(headers.iter().map(|h| header_cell(h)).collect::<Vec<_>>());
    apply_table_style(&mut table);
    for row in rows {
        table.add_row(row.clone());
    }
    println!("{table}");
}

/// Render a JSON value for a table cell: strings bare, the rest compact.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn status_cell(label: &str, color: Color) -> Cell {
    Cell::new(label).fg(color).add_attribute(Attribute::Bold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_value_keeps_strings_bare() {
        assert_eq!(format_value(&json!("PENDING")), "PENDING");
        assert_eq!(format_value(&json!(42)), "42");
        assert_eq!(format_value(&json!(["a", "b"])), r#"["a","b"]"#);
        assert_eq!(format_value(&json!(null)), "null");
    }
}
