use std::borrow::Cow;
use std::path::Path;

use serde_json::{Map, Value};

use crate::domain::error::RuleSetError;
use crate::domain::report::{
    FieldValidation, FieldValidations, SegmentValidation, ValidationReport,
};
use crate::domain::rules::RuleSet;
use crate::engine::field::validate_field;
use crate::io::Format;

/// Canonical field names with the document keys accepted for each, first match wins.
pub const FIELD_ALIASES: [(&str, &[&str]); 6] = [
    ("segment_title", &["Segment Title", "segment_title"]),
    ("timestamps", &["Timestamps", "timestamps"]),
    ("editorial_subjects", &["Editorial subjects", "editorial_subjects"]),
    ("visual_subjects", &["Visual Subjects", "visual_subjects"]),
    ("names", &["Names", "names"]),
    ("location", &["Location", "location"]),
];

const UNKNOWN_TITLE: &str = "Unknown";

/// How segment-level `confidence` and `score` values are applied to field sub-rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SharedValueMode {
    /// Re-check the shared value for every field that declares the sub-rule.
    #[default]
    PerField,
    /// Check the shared value once, against the first field declaring the sub-rule.
    PerSegment,
}

/// Knobs for a validation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidatorOptions {
    pub shared_values: SharedValueMode,
}

/// Where the rule set comes from.
#[derive(Debug, Clone, Copy)]
pub enum RuleSetSource<'a> {
    /// Rules file; format inferred from the extension.
    Path(&'a Path),
    /// Rules text already in memory.
    Text { text: &'a str, format: Format },
    /// Previously loaded rules, reused as-is.
    Loaded(&'a RuleSet),
}

impl<'a> RuleSetSource<'a> {
    pub fn load(self) -> Result<Cow<'a, RuleSet>, RuleSetError> {
        match self {
            Self::Path(path) => RuleSet::load(path).map(Cow::Owned),
            Self::Text { text, format } => RuleSet::from_text(text, format).map(Cow::Owned),
            Self::Loaded(rules) => Ok(Cow::Borrowed(rules)),
        }
    }
}

impl<'a> From<&'a Path> for RuleSetSource<'a> {
    fn from(path: &'a Path) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<&'a RuleSet> for RuleSetSource<'a> {
    fn from(rules: &'a RuleSet) -> Self {
        Self::Loaded(rules)
    }
}

/// Validates raw document text against a rule set.
///
/// Never fails: every structural problem is reported through
/// [`ValidationReport::error`] with no segments processed.
pub fn validate_document(
    document_text: &str,
    rules: RuleSetSource<'_>,
    options: ValidatorOptions,
) -> ValidationReport {
    let document: Value = match serde_json::from_str(document_text) {
        Ok(document) => document,
        Err(error) => {
            tracing::debug!(%error, "document is not valid JSON");
            return ValidationReport::structural_failure("Invalid JSON format");
        }
    };

    let rules = match rules.load() {
        Ok(rules) => rules,
        Err(error) => {
            tracing::debug!(%error, "rule set could not be loaded");
            return ValidationReport::structural_failure(error.to_string());
        }
    };

    validate_value(&document, &rules, options)
}

/// Validates an already-parsed document.
pub fn validate_value(
    document: &Value,
    rules: &RuleSet,
    options: ValidatorOptions,
) -> ValidationReport {
    let Some(segments) = document.get("segments") else {
        return ValidationReport::structural_failure("Required field 'segments' is missing");
    };
    let Some(segments) = segments.as_array() else {
        return ValidationReport::structural_failure("Field 'segments' should be an array");
    };

    let min_segments = rules.min_segments();
    if segments.len() < min_segments {
        return ValidationReport::structural_failure_with_total(
            format!("There should be at least {min_segments} segments"),
            segments.len(),
        );
    }

    let results = segments
        .iter()
        .enumerate()
        .map(|(index, segment)| validate_segment(index, segment, rules, options))
        .collect();
    let report = ValidationReport::from_segments(results);

    tracing::info!(
        total = report.summary.total_segments,
        valid = report.summary.valid_segments,
        status = report.summary.overall_status.as_str(),
        "document validated"
    );
    report
}

fn validate_segment(
    index: usize,
    segment: &Value,
    rules: &RuleSet,
    options: ValidatorOptions,
) -> SegmentValidation {
    let no_fields = Map::new();
    let fields = segment.as_object().unwrap_or(&no_fields);

    let confidence = fields.get("confidence").filter(|value| !value.is_null());
    let score = fields.get("score").filter(|value| !value.is_null());
    let mut confidence_claim = SharedClaim::new(options.shared_values);
    let mut score_claim = SharedClaim::new(options.shared_values);

    let mut field_validations = FieldValidations::default();
    for (field_name, aliases) in FIELD_ALIASES {
        let resolved = aliases
            .iter()
            .find_map(|alias| fields.get(*alias).map(|value| (*alias, value)));
        let rule = rules.field(field_name);

        let mut outcome = validate_field(resolved.map(|(_, value)| value), rule, field_name);

        if let (Some(value), Some(sub_rule)) = (confidence, rule.confidence.as_deref()) {
            if confidence_claim.claim() {
                let name = format!("{field_name}_confidence");
                outcome.merge(validate_field(Some(value), sub_rule, &name));
            }
        }

        if let (Some(value), Some(sub_rule)) = (score, rule.score.as_deref()) {
            if score_claim.claim() {
                let name = format!("{field_name}_score");
                outcome.merge(validate_field(Some(value), sub_rule, &name));
            }
        }

        field_validations.push(
            field_name,
            FieldValidation {
                valid: outcome.valid,
                json_field_name: resolved.map(|(key, _)| key.to_string()),
                errors: outcome.errors,
            },
        );
    }

    let segment_title = fields
        .get("Segment Title")
        .or_else(|| fields.get("segment_title"))
        .cloned()
        .unwrap_or_else(|| Value::String(UNKNOWN_TITLE.to_string()));
    let valid = field_validations.all_valid();

    tracing::debug!(segment_index = index, valid, "segment validated");

    SegmentValidation {
        segment_index: index,
        segment_title,
        valid,
        field_validations,
    }
}

/// Tracks whether a shared segment value may still be checked.
struct SharedClaim {
    mode: SharedValueMode,
    claimed: bool,
}

impl SharedClaim {
    fn new(mode: SharedValueMode) -> Self {
        Self {
            mode,
            claimed: false,
        }
    }

    fn claim(&mut self) -> bool {
        match self.mode {
            SharedValueMode::PerField => true,
            SharedValueMode::PerSegment => !std::mem::replace(&mut self.claimed, true),
        }
    }
}
