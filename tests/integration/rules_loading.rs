use std::fs;

use segval::domain::error::RuleSetError;
use segval::domain::rules::RuleSet;
use segval::engine::{RuleSetSource, ValidatorOptions, validate_document};
use tempfile::tempdir;

const JSON_RULES: &str = r#"{
    "validation": {"structure": {"fields": {"segments": {
        "min_items": 1,
        "item_schema": {"fields": {
            "location": {"type": "string", "enum": ["Studio", "Field"]}
        }}
    }}}}
}"#;

#[test]
fn loads_rules_by_extension() {
    let dir = tempdir().expect("tempdir");
    let json_path = dir.path().join("rules.json");
    fs::write(&json_path, JSON_RULES).expect("write json rules");
    let yaml_path = dir.path().join("rules.yml");
    fs::write(
        &yaml_path,
        r#"
validation:
  structure:
    fields:
      segments:
        min_items: 1
        item_schema:
          fields:
            location:
              type: string
              enum: [Studio, Field]
"#,
    )
    .expect("write yaml rules");

    let from_json = RuleSet::load(&json_path).expect("json rules");
    let from_yaml = RuleSet::load(&yaml_path).expect("yaml rules");
    assert_eq!(from_json, from_yaml);
}

#[test]
fn missing_rules_file_is_reported_in_report() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nope.yaml");

    let report = validate_document(
        r#"{"segments": []}"#,
        RuleSetSource::Path(&path),
        ValidatorOptions::default(),
    );

    assert!(!report.valid);
    let error = report.error.expect("error");
    assert_eq!(error, format!("Rules file not found: {}", path.display()));
    assert_eq!(report.summary.total_segments, 0);
}

#[test]
fn malformed_rules_file_is_a_load_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("rules.yaml");
    fs::write(&path, "validation: [unclosed").expect("write rules");

    let error = RuleSet::load(&path).expect_err("must fail");
    assert!(matches!(error, RuleSetError::Parse { .. }));
    assert!(error.to_string().starts_with("Error loading rules: yaml parse error"));
}

#[test]
fn unknown_rules_extension_is_read_as_yaml() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("rules.ini");
    fs::write(&path, JSON_RULES).expect("write rules");

    let report = validate_document(
        r#"{"segments": [{"location": "Studio"}]}"#,
        RuleSetSource::Path(&path),
        ValidatorOptions::default(),
    );
    assert_eq!(report.error, None);
    assert!(report.valid);
}

#[test]
fn extensionless_rules_file_is_read_as_yaml() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("rules");
    fs::write(
        &path,
        "validation:\n  structure:\n    fields:\n      segments: {}\n",
    )
    .expect("write rules");

    let rules = RuleSet::load(&path).expect("load");
    assert_eq!(rules.min_segments(), 0);

    let report = validate_document(
        r#"{"segments": []}"#,
        RuleSetSource::Path(&path),
        ValidatorOptions::default(),
    );
    assert!(report.valid, "{:?}", report.error);
}

#[test]
fn invalid_document_is_reported_before_rules_are_read() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nope.yaml");

    let report = validate_document(
        "not json",
        RuleSetSource::Path(&path),
        ValidatorOptions::default(),
    );
    assert_eq!(report.error.as_deref(), Some("Invalid JSON format"));
}

#[test]
fn loaded_rules_are_reusable_across_calls() {
    let rules = RuleSet::from_value(&serde_json::from_str::<serde_json::Value>(JSON_RULES).expect("json"))
        .expect("rules");

    let studio = validate_document(
        r#"{"segments": [{"Location": "Studio"}]}"#,
        (&rules).into(),
        ValidatorOptions::default(),
    );
    let beach = validate_document(
        r#"{"segments": [{"Location": "Beach"}]}"#,
        (&rules).into(),
        ValidatorOptions::default(),
    );

    assert!(studio.valid);
    assert!(!beach.valid);
    let location = beach.segments_validation[0]
        .field_validations
        .get("location")
        .expect("location");
    assert_eq!(
        location.errors,
        vec!["Field 'location' should be one of [\"Studio\",\"Field\"]".to_string()]
    );
}
