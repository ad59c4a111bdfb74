use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Whole-document validation outcome.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub segments_validation: Vec<SegmentValidation>,
    pub summary: ValidationSummary,
}

impl ValidationReport {
    /// Report for a failure that prevented any segment from being checked.
    pub fn structural_failure(error: impl Into<String>) -> Self {
        Self::structural_failure_with_total(error, 0)
    }

    /// Structural failure that still accounts for `total` segments as invalid.
    pub fn structural_failure_with_total(error: impl Into<String>, total: usize) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            segments_validation: Vec::new(),
            summary: ValidationSummary::new(total, 0),
        }
    }

    /// Aggregates per-segment results in input order.
    pub fn from_segments(segments: Vec<SegmentValidation>) -> Self {
        let valid_segments = segments.iter().filter(|segment| segment.valid).count();
        let summary = ValidationSummary::new(segments.len(), valid_segments);
        Self {
            valid: summary.overall_status == OverallStatus::Pass,
            error: None,
            segments_validation: segments,
            summary,
        }
    }
}

/// Counts and overall verdict.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ValidationSummary {
    pub total_segments: usize,
    pub valid_segments: usize,
    pub invalid_segments: usize,
    pub overall_status: OverallStatus,
}

impl ValidationSummary {
    pub fn new(total_segments: usize, valid_segments: usize) -> Self {
        let overall_status = if valid_segments == total_segments {
            OverallStatus::Pass
        } else {
            OverallStatus::Fail
        };
        Self {
            total_segments,
            valid_segments,
            invalid_segments: total_segments - valid_segments,
            overall_status,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverallStatus {
    Pass,
    Fail,
}

impl OverallStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

/// Result for one segment.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SegmentValidation {
    pub segment_index: usize,
    pub segment_title: Value,
    pub valid: bool,
    pub field_validations: FieldValidations,
}

/// Field results keyed by canonical name, serialized in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValidations(Vec<(String, FieldValidation)>);

impl FieldValidations {
    pub fn push(&mut self, field_name: impl Into<String>, validation: FieldValidation) {
        self.0.push((field_name.into(), validation));
    }

    pub fn get(&self, field_name: &str) -> Option<&FieldValidation> {
        self.0
            .iter()
            .find(|(name, _)| name == field_name)
            .map(|(_, validation)| validation)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValidation)> {
        self.0
            .iter()
            .map(|(name, validation)| (name.as_str(), validation))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn all_valid(&self) -> bool {
        self.0.iter().all(|(_, validation)| validation.valid)
    }
}

impl Serialize for FieldValidations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, validation) in &self.0 {
            map.serialize_entry(name, validation)?;
        }
        map.end()
    }
}

/// Result for one canonical field of a segment.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldValidation {
    pub valid: bool,
    /// Literal document key that supplied the value, if any.
    pub json_field_name: Option<String>,
    pub errors: Vec<String>,
}
