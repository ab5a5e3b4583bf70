//! Integration tests for CSV discovery and loading.

use std::path::PathBuf;

use dq_ingest::{frame_schema, load_frame, resolve_source, source_map};

fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "dq-ingest-test-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn source_map_capitalizes_stems() {
    let dir = scratch_dir("map");
    std::fs::write(dir.join("housing.csv"), "id,price\n1,100\n").unwrap();
    std::fs::write(dir.join("users.csv"), "id,name\n1,a\n").unwrap();
    std::fs::write(dir.join("notes.txt"), "not a csv").unwrap();

    let mapping = source_map(&dir).expect("map sources");
    let names: Vec<&String> = mapping.keys().collect();
    assert_eq!(names, vec!["Housing", "Users"]);
}

#[test]
fn resolve_source_is_case_insensitive() {
    let dir = scratch_dir("resolve");
    std::fs::write(dir.join("housing.csv"), "id,price\n1,100\n").unwrap();

    let (name, path) = resolve_source(&dir, "HOUSING").expect("resolve");
    assert_eq!(name, "Housing");
    assert!(path.ends_with("housing.csv"));

    let error = resolve_source(&dir, "Sales").unwrap_err();
    assert!(error.to_string().contains("Housing"));
}

#[test]
fn load_frame_infers_types() {
    let dir = scratch_dir("load");
    let path = dir.join("products.csv");
    std::fs::write(
        &path,
        "product_id,name,price\n1,widget,9.99\n2,gadget,24.50\n",
    )
    .unwrap();

    let frame = load_frame(&path).expect("load frame");
    assert_eq!(frame.height(), 2);
    assert_eq!(frame.width(), 3);

    let schema = frame_schema("Products", &frame);
    assert_eq!(schema.name, "Products");
    let types: Vec<(&str, &str)> = schema
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.declared_type.as_str()))
        .collect();
    assert_eq!(
        types,
        vec![
            ("product_id", "integer"),
            ("name", "text"),
            ("price", "float")
        ]
    );
}
