use segval::domain::report::OverallStatus;
use segval::domain::rules::RuleSet;
use segval::engine::{RuleSetSource, SharedValueMode, ValidatorOptions, validate_document};
use segval::io::Format;
use serde_json::{Value, json};

const RULES: &str = r#"
validation:
  structure:
    fields:
      segments:
        item_schema:
          fields:
            segment_title:
              type: string
              required: true
              pattern: "^[A-Z]"
            timestamps:
              type: array
              min_items: 1
              confidence:
                threshold: medium
            names:
              type: array
              confidence:
                threshold: medium
              score:
                type: number
                min: 0
                max: 1
"#;

fn documents() -> Vec<String> {
    [
        json!({"segments": []}),
        json!({"segments": [{"Segment Title": "Intro"}]}),
        json!({"segments": [{"Segment Title": "intro"}]}),
        json!({"segments": [{}, {"segment_title": "Outro", "confidence": "high"}]}),
        json!({"segments": [{"segment_title": "A", "confidence": "low", "score": 2}]}),
        json!({"segments": [7, null, [], {"Segment Title": null}]}),
        json!({"segments": [{"Segment Title": "B", "timestamps": [], "names": "x"}]}),
        json!({"segments": {}}),
        json!({"other": 1}),
        json!([]),
    ]
    .iter()
    .map(Value::to_string)
    .chain(["".to_string(), "{".to_string(), "null".to_string()])
    .collect()
}

#[test]
fn report_invariants_hold_for_every_document() {
    let rules = RuleSet::from_text(RULES, Format::Yaml).expect("rules");

    for mode in [SharedValueMode::PerField, SharedValueMode::PerSegment] {
        let options = ValidatorOptions {
            shared_values: mode,
        };
        for document in documents() {
            let report = validate_document(&document, RuleSetSource::Loaded(&rules), options);
            let summary = report.summary;

            assert_eq!(
                summary.valid_segments + summary.invalid_segments,
                summary.total_segments,
                "{document}"
            );
            assert_eq!(
                summary.overall_status == OverallStatus::Pass,
                report.valid,
                "{document}"
            );
            if report.error.is_some() {
                assert!(!report.valid, "{document}");
                assert!(report.segments_validation.is_empty(), "{document}");
                continue;
            }

            let parsed: Value = serde_json::from_str(&document).expect("parsable document");
            let expected_total = parsed["segments"].as_array().map(Vec::len);
            assert_eq!(Some(summary.total_segments), expected_total, "{document}");
            for (index, segment) in report.segments_validation.iter().enumerate() {
                assert_eq!(segment.segment_index, index);
                assert_eq!(segment.field_validations.len(), 6);
                assert_eq!(segment.valid, segment.field_validations.all_valid());
                for (_, field) in segment.field_validations.iter() {
                    assert_eq!(field.valid, field.errors.is_empty(), "{document}");
                }
            }
        }
    }
}

#[test]
fn required_title_reports_exactly_one_error_when_absent() {
    let rules = RuleSet::from_text(RULES, Format::Yaml).expect("rules");
    let report = validate_document(
        r#"{"segments": [{"segment_title": null}, {"Names": ["x"]}]}"#,
        RuleSetSource::Loaded(&rules),
        ValidatorOptions::default(),
    );

    for segment in &report.segments_validation {
        let title = segment.field_validations.get("segment_title").expect("title");
        assert_eq!(
            title.errors,
            vec!["Required field 'segment_title' is missing".to_string()]
        );
    }
    let first = &report.segments_validation[0];
    assert_eq!(
        first
            .field_validations
            .get("segment_title")
            .expect("title")
            .json_field_name
            .as_deref(),
        Some("segment_title")
    );
    assert_eq!(first.segment_title, Value::Null);
}

#[test]
fn shared_values_are_merged_into_each_declaring_field() {
    let rules = RuleSet::from_text(RULES, Format::Yaml).expect("rules");
    let report = validate_document(
        r#"{"segments": [{"segment_title": "A", "timestamps": ["0"], "names": [], "confidence": "low", "score": 2}]}"#,
        RuleSetSource::Loaded(&rules),
        ValidatorOptions::default(),
    );

    let fields = &report.segments_validation[0].field_validations;
    assert_eq!(
        fields.get("timestamps").expect("timestamps").errors,
        vec!["Field 'timestamps_confidence' should be at least 'medium'".to_string()]
    );
    assert_eq!(
        fields.get("names").expect("names").errors,
        vec![
            "Field 'names_confidence' should be at least 'medium'".to_string(),
            "Field 'names_score' should be at most 1".to_string(),
        ]
    );
}
