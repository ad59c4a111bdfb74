use std::io::Read;

use serde_json::Value;

use crate::io::format::{json, toml, yaml};
use crate::io::{Format, IoError};

/// Reads exactly one structured document in `format`.
pub fn read_value<R: Read>(reader: R, format: Format) -> Result<Value, IoError> {
    match format {
        Format::Json => json::read_json(reader),
        Format::Yaml => yaml::read_yaml(reader),
        Format::Toml => toml::read_toml(reader),
    }
}

/// Parses already-loaded text in `format`.
pub fn parse_str(text: &str, format: Format) -> Result<Value, IoError> {
    read_value(text.as_bytes(), format)
}
