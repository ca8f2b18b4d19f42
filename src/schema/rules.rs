//! Validator rules attached to fields
//!
//! A rule pairs a `Check` with the stage it runs in (before or after type
//! coercion) and whether it applies to each list item. Checks are pure:
//! given a value they return the accepted value (possibly transformed) or
//! the reason for rejection.

use regex::Regex;
use serde_json::Value;

use super::coerce::json_type_name;
use super::errors::{SchemaError, SchemaResult};

/// When a rule runs relative to type coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Receives the raw input value
    Pre,
    /// Receives the coerced value
    Post,
}

/// Closed set of validator variants
#[derive(Debug, Clone)]
pub enum Check {
    /// Value must already be a string
    IsString,
    /// String or list must not be empty
    NonEmpty,
    /// Minimum character count (strings) or element count (lists)
    MinLength(usize),
    /// Maximum character count (strings) or element count (lists)
    MaxLength(usize),
    /// String must match the pattern
    Pattern(Regex),
    /// Number within inclusive bounds
    Range { min: Option<f64>, max: Option<f64> },
    /// Value must equal one of the listed values
    OneOf(Vec<Value>),
    /// Strips surrounding whitespace from strings
    Trim,
    /// Lowercases strings
    Lowercase,
}

impl Check {
    /// Compiles a pattern check.
    ///
    /// # Errors
    ///
    /// Returns `FC_INVALID_RULE` naming `field` if the regex does not compile.
    pub fn pattern(field: &str, regex: &str) -> SchemaResult<Self> {
        Regex::new(regex).map(Check::Pattern).map_err(|e| {
            SchemaError::invalid_rule(field, format!("invalid regex {:?}: {}", regex, e))
        })
    }

    /// Returns the check name used in schema files
    pub fn name(&self) -> &'static str {
        match self {
            Check::IsString => "is_string",
            Check::NonEmpty => "non_empty",
            Check::MinLength(_) => "min_length",
            Check::MaxLength(_) => "max_length",
            Check::Pattern(_) => "pattern",
            Check::Range { .. } => "range",
            Check::OneOf(_) => "one_of",
            Check::Trim => "trim",
            Check::Lowercase => "lowercase",
        }
    }

    /// Applies the check to a single value.
    pub fn apply(&self, value: Value) -> Result<Value, String> {
        match self {
            Check::IsString => {
                if value.is_string() {
                    Ok(value)
                } else {
                    Err(format!("value must be a string, got {}", json_type_name(&value)))
                }
            }
            Check::NonEmpty => match length_of(&value) {
                Some(0) => Err("value must not be empty".to_string()),
                Some(_) => Ok(value),
                None => Err(format!("cannot check emptiness of {}", json_type_name(&value))),
            },
            Check::MinLength(min) => match length_of(&value) {
                Some(len) if len < *min => Err(format!("length {} is below minimum {}", len, min)),
                Some(_) => Ok(value),
                None => Err(format!("cannot check length of {}", json_type_name(&value))),
            },
            Check::MaxLength(max) => match length_of(&value) {
                Some(len) if len > *max => Err(format!("length {} exceeds maximum {}", len, max)),
                Some(_) => Ok(value),
                None => Err(format!("cannot check length of {}", json_type_name(&value))),
            },
            Check::Pattern(re) => match value.as_str() {
                Some(s) if re.is_match(s) => Ok(value),
                Some(s) => Err(format!("{:?} does not match pattern {:?}", s, re.as_str())),
                None => Err(format!("cannot match pattern against {}", json_type_name(&value))),
            },
            Check::Range { min, max } => {
                let n = value
                    .as_f64()
                    .ok_or_else(|| format!("expected a number, got {}", json_type_name(&value)))?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(format!("{} is below minimum {}", n, min));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(format!("{} exceeds maximum {}", n, max));
                    }
                }
                Ok(value)
            }
            Check::OneOf(allowed) => {
                if allowed.iter().any(|candidate| same_value(candidate, &value)) {
                    Ok(value)
                } else {
                    Err(format!("{} is not one of the allowed values", value))
                }
            }
            Check::Trim => Ok(match value {
                Value::String(s) => Value::String(s.trim().to_string()),
                other => other,
            }),
            Check::Lowercase => Ok(match value {
                Value::String(s) => Value::String(s.to_lowercase()),
                other => other,
            }),
        }
    }
}

/// Equality where numbers compare by numeric value, so `1` matches `1.0`.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// A check bound to a stage.
#[derive(Debug, Clone)]
pub struct Rule {
    check: Check,
    stage: Stage,
    each_item: bool,
}

impl Rule {
    /// Rule that runs on the raw value, before coercion
    pub fn pre(check: Check) -> Self {
        Self {
            check,
            stage: Stage::Pre,
            each_item: false,
        }
    }

    /// Rule that runs on the coerced value
    pub fn post(check: Check) -> Self {
        Self {
            check,
            stage: Stage::Post,
            each_item: false,
        }
    }

    /// Applies the check to every element of a list value.
    pub fn each_item(mut self) -> Self {
        self.each_item = true;
        self
    }

    pub fn check(&self) -> &Check {
        &self.check
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn runs_before_coercion(&self) -> bool {
        self.stage == Stage::Pre
    }

    pub fn applies_to_each_item(&self) -> bool {
        self.each_item
    }

    /// Runs the rule. Non-list values are checked as a whole even when
    /// `each_item` is set.
    pub fn apply(&self, value: Value) -> Result<Value, String> {
        match value {
            Value::Array(items) if self.each_item => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    self.check
                        .apply(item)
                        .map_err(|reason| format!("item {}: {}", i, reason))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => self.check.apply(other),
        }
    }
}
