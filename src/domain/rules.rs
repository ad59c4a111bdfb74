use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::path::Path;

use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::domain::error::RuleSetError;
use crate::io::{self, Format};

/// JSON pointer of the rule node governing the `segments` array.
pub const SEGMENTS_RULE_POINTER: &str = "/validation/structure/fields/segments";

/// Parsed rule set: only the `segments` node is consulted.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RuleSet {
    pub segments: SegmentsRule,
}

impl RuleSet {
    /// Extracts the `segments` rule node from a parsed rules document.
    pub fn from_value(value: &Value) -> Result<Self, RuleSetError> {
        let node = value
            .pointer(SEGMENTS_RULE_POINTER)
            .ok_or(RuleSetError::MissingSegmentsRule)?;
        let segments = SegmentsRule::deserialize(node)
            .map_err(|source| RuleSetError::InvalidShape { source })?;
        Ok(Self { segments })
    }

    /// Parses rules from in-memory text.
    pub fn from_text(text: &str, format: Format) -> Result<Self, RuleSetError> {
        let value = io::reader::parse_str(text, format)
            .map_err(|source| RuleSetError::Parse { source })?;
        Self::from_value(&value)
    }

    /// Loads rules from a file whose format is inferred from its extension.
    pub fn load(path: &Path) -> Result<Self, RuleSetError> {
        if !path.exists() {
            return Err(RuleSetError::NotFound {
                path: path.display().to_string(),
            });
        }
        let format = io::resolve_rules_format(None, path);
        let file = File::open(path).map_err(|source| RuleSetError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let value =
            io::reader::read_value(file, format).map_err(|source| RuleSetError::Parse { source })?;
        Self::from_value(&value)
    }

    /// Minimum number of segments; 0 when unspecified.
    pub fn min_segments(&self) -> usize {
        self.segments.min_items.unwrap_or(0)
    }

    /// Rule for a canonical field; a missing node is the empty rule.
    pub fn field(&self, name: &str) -> &FieldRule {
        self.segments
            .item_schema
            .fields
            .get(name)
            .unwrap_or(&EMPTY_FIELD_RULE)
    }
}

static EMPTY_FIELD_RULE: FieldRule = FieldRule {
    required: false,
    rule_type: None,
    min_length: None,
    pattern: None,
    allowed: None,
    min_items: None,
    min: None,
    max: None,
    threshold: None,
    confidence: None,
    score: None,
};

/// Rule node for the `segments` array.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmentsRule {
    #[serde(deserialize_with = "deserialize_count")]
    pub min_items: Option<usize>,
    pub item_schema: ItemSchema,
}

/// Reads a length bound. Integral floats such as `1.0` are accepted, as YAML and
/// TOML writers often emit them.
fn deserialize_count<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<usize>, D::Error> {
    let Some(number) = Option::<Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(count) = number.as_u64() {
        return usize::try_from(count).map(Some).map_err(D::Error::custom);
    }
    match number.as_f64() {
        Some(count) if count.is_finite() && count >= 0.0 && count.fract() == 0.0 => {
            Ok(Some(count as usize))
        }
        _ => Err(D::Error::custom(format!(
            "expected a non-negative whole number, found {number}"
        ))),
    }
}

/// Per-segment schema keyed by canonical field name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ItemSchema {
    pub fields: BTreeMap<String, FieldRule>,
}

/// Constraints for one field. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldRule {
    pub required: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<RuleType>,
    #[serde(
        deserialize_with = "deserialize_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
    #[serde(
        deserialize_with = "deserialize_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Threshold>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Box<FieldRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Box<FieldRule>>,
}

/// Declared value type of a field.
///
/// Names outside the known set deserialize to [`RuleType::Unsupported`],
/// which disables every type-specific check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    String,
    Number,
    Array,
    Object,
    #[serde(other)]
    Unsupported,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Array => "array",
            Self::Object => "object",
            Self::Unsupported => "unsupported",
        }
    }

    /// `None` for [`RuleType::Unsupported`], which accepts anything.
    pub fn matches(&self, value: &Value) -> Option<bool> {
        match self {
            Self::String => Some(value.is_string()),
            Self::Number => Some(value.is_number()),
            Self::Array => Some(value.is_array()),
            Self::Object => Some(value.is_object()),
            Self::Unsupported => None,
        }
    }
}

/// Lower bound that is numeric for number fields or a level for confidence fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Threshold {
    Number(Number),
    Level(String),
}

impl Threshold {
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(number) => Some(number),
            Self::Level(_) => None,
        }
    }

    /// Ordinal rank; a numeric threshold ranks 0.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Level(level) => confidence_rank(level),
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Level(level) => f.write_str(level),
        }
    }
}

/// Rank of a qualitative confidence level: low=1, medium=2, high=3, else 0.
pub fn confidence_rank(level: &str) -> u8 {
    match level {
        "low" => 1,
        "medium" => 2,
        "high" => 3,
        _ => 0,
    }
}

/// Regular expression compiled at load time and anchored at the start of the input.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    anchored: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let anchored = Regex::new(&format!(r"\A(?:{source})"))?;
        Ok(Self {
            source: source.to_string(),
            anchored,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True when a match begins at the first character.
    pub fn matches_from_start(&self, haystack: &str) -> bool {
        self.anchored.is_match(haystack)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Self::new(&source)
            .map_err(|error| D::Error::custom(format!("invalid pattern `{source}`: {error}")))
    }
}
