use thiserror::Error;

use crate::io::IoError;

/// Failures while locating or interpreting a rule set.
///
/// The `Display` text is surfaced verbatim as the report's `error` field.
#[derive(Debug, Error)]
pub enum RuleSetError {
    /// Rules path does not exist.
    #[error("Rules file not found: {path}")]
    NotFound { path: String },

    /// Rules file exists but could not be opened.
    #[error("Error loading rules: failed to open `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Rules text could not be parsed in its format.
    #[error("Error loading rules: {source}")]
    Parse {
        #[source]
        source: IoError,
    },

    /// `validation.structure.fields.segments` is absent.
    #[error("Error loading rules: missing rule node `validation.structure.fields.segments`")]
    MissingSegmentsRule,

    /// The `segments` rule node has the wrong shape.
    #[error("Error loading rules: invalid segments rule: {source}")]
    InvalidShape {
        #[source]
        source: serde_json::Error,
    },
}
