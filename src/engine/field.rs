use std::cmp::Ordering;

use serde_json::{Number, Value};

use crate::domain::rules::{FieldRule, RuleType, confidence_rank};

/// Pass/fail verdict for one value plus the messages explaining a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOutcome {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl FieldOutcome {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Folds another outcome into this one: errors append, validity ANDs.
    pub fn merge(&mut self, other: FieldOutcome) {
        self.valid = self.valid && other.valid;
        self.errors.extend(other.errors);
    }
}

/// Checks `value` against `rule`, reporting problems under `field_name`.
///
/// `None` and JSON `null` are both treated as an absent value. Only the
/// required-but-absent case stops early; every other check appends its own
/// message so a single value can collect several errors.
pub fn validate_field(value: Option<&Value>, rule: &FieldRule, field_name: &str) -> FieldOutcome {
    let Some(value) = value.filter(|value| !value.is_null()) else {
        if rule.required {
            return FieldOutcome::from_errors(vec![format!(
                "Required field '{field_name}' is missing"
            )]);
        }
        return FieldOutcome::from_errors(Vec::new());
    };

    let mut errors = Vec::new();

    if let Some(rule_type) = rule.rule_type {
        if rule_type.matches(value) == Some(false) {
            errors.push(type_mismatch_message(field_name, rule_type));
        }

        match (rule_type, value) {
            (RuleType::String, Value::String(text)) => {
                check_string(text, rule, field_name, &mut errors)
            }
            (RuleType::Array, Value::Array(items)) => {
                check_array(items, rule, field_name, &mut errors)
            }
            (RuleType::Number, Value::Number(number)) => {
                check_number(number, rule, field_name, &mut errors)
            }
            _ => {}
        }
    }

    check_confidence_level(value, rule, field_name, &mut errors);

    FieldOutcome::from_errors(errors)
}

fn type_mismatch_message(field_name: &str, rule_type: RuleType) -> String {
    let article = match rule_type {
        RuleType::Array | RuleType::Object | RuleType::Unsupported => "an",
        RuleType::String | RuleType::Number => "a",
    };
    format!(
        "Field '{field_name}' should be {article} {}",
        rule_type.as_str()
    )
}

fn check_string(text: &str, rule: &FieldRule, field_name: &str, errors: &mut Vec<String>) {
    if let Some(min_length) = rule.min_length {
        if text.chars().count() < min_length {
            errors.push(format!(
                "Field '{field_name}' length should be at least {min_length}"
            ));
        }
    }

    if let Some(pattern) = &rule.pattern {
        if !pattern.matches_from_start(text) {
            errors.push(format!(
                "Field '{field_name}' does not match required pattern"
            ));
        }
    }

    if let Some(allowed) = &rule.allowed {
        if !allowed.iter().any(|candidate| candidate.as_str() == Some(text)) {
            errors.push(format!(
                "Field '{field_name}' should be one of {}",
                Value::Array(allowed.clone())
            ));
        }
    }
}

fn check_array(items: &[Value], rule: &FieldRule, field_name: &str, errors: &mut Vec<String>) {
    if let Some(min_items) = rule.min_items {
        if items.len() < min_items {
            errors.push(format!(
                "Field '{field_name}' should have at least {min_items} items"
            ));
        }
    }
}

fn check_number(number: &Number, rule: &FieldRule, field_name: &str, errors: &mut Vec<String>) {
    if let Some(min) = &rule.min {
        if compare_numbers(number, min) == Ordering::Less {
            errors.push(format!("Field '{field_name}' should be at least {min}"));
        }
    }

    if let Some(max) = &rule.max {
        if compare_numbers(number, max) == Ordering::Greater {
            errors.push(format!("Field '{field_name}' should be at most {max}"));
        }
    }

    if let Some(threshold) = rule.threshold.as_ref().and_then(|t| t.as_number()) {
        if compare_numbers(number, threshold) == Ordering::Less {
            errors.push(format!("Field '{field_name}' should be at least {threshold}"));
        }
    }
}

fn check_confidence_level(
    value: &Value,
    rule: &FieldRule,
    field_name: &str,
    errors: &mut Vec<String>,
) {
    if !field_name.ends_with("confidence") {
        return;
    }
    let Some(threshold) = &rule.threshold else {
        return;
    };

    let actual = value.as_str().map(confidence_rank).unwrap_or(0);
    if actual < threshold.rank() {
        errors.push(format!(
            "Field '{field_name}' should be at least '{threshold}'"
        ));
    }
}

fn compare_numbers(left: &Number, right: &Number) -> Ordering {
    if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
        return left.cmp(&right);
    }

    if let (Some(left), Some(right)) = (left.as_u64(), right.as_u64()) {
        return left.cmp(&right);
    }

    if let (Some(left), Some(_)) = (left.as_i64(), right.as_u64()) {
        if left.is_negative() {
            return Ordering::Less;
        }
    }

    if let (Some(_), Some(right)) = (left.as_u64(), right.as_i64()) {
        if right.is_negative() {
            return Ordering::Greater;
        }
    }

    // serde_json numbers are always finite.
    left.as_f64()
        .zip(right.as_f64())
        .and_then(|(left, right)| left.partial_cmp(&right))
        .unwrap_or(Ordering::Equal)
}
