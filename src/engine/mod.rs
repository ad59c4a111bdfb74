pub mod document;
pub mod field;

pub use document::{
    FIELD_ALIASES, RuleSetSource, SharedValueMode, ValidatorOptions, validate_document,
    validate_value,
};
pub use field::{FieldOutcome, validate_field};
