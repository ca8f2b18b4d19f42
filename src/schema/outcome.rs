//! Per-record validation results
//!
//! A record is either accepted with every field populated or rejected with
//! every field failure found. There is no partially populated success.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Why a single field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Required field absent (or null) with no default
    MissingRequiredField,
    /// Value could not be converted to the declared type
    TypeCoercionFailure,
    /// A field rule rejected the value
    CustomValidationFailure,
}

impl FailureKind {
    /// Returns the stable failure code
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            FailureKind::TypeCoercionFailure => "TYPE_COERCION_FAILED",
            FailureKind::CustomValidationFailure => "CUSTOM_VALIDATION_FAILED",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Reason recorded for a missing required field
pub const MISSING_REQUIRED_FIELD: &str = "missing required field";

/// One rejected field, keyed by canonical name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field '{field}': {reason}")]
pub struct FieldFailure {
    pub field: String,
    pub kind: FailureKind,
    pub reason: String,
}

impl FieldFailure {
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FailureKind::MissingRequiredField,
            reason: MISSING_REQUIRED_FIELD.to_string(),
        }
    }

    pub fn coercion(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FailureKind::TypeCoercionFailure,
            reason: reason.into(),
        }
    }

    pub fn custom(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FailureKind::CustomValidationFailure,
            reason: reason.into(),
        }
    }

    /// JSON form used in CLI responses
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "field": self.field,
            "code": self.kind.code(),
            "reason": self.reason,
        })
    }
}

/// All failures of a rejected record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record rejected with {} failure(s): {}", .0.len(), summarize(.0))]
pub struct ValidationErrors(pub Vec<FieldFailure>);

fn summarize(failures: &[FieldFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn failures(&self) -> &[FieldFailure] {
        &self.0
    }
}

/// A single accepted field value
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub name: String,
    pub alias: String,
    pub value: Value,
}

/// Accepted record in schema order.
///
/// Serializes under external aliases, which makes the serialized form valid
/// input for the same schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidatedRecord {
    values: Vec<FieldValue>,
}

impl ValidatedRecord {
    pub(crate) fn push(&mut self, name: &str, alias: &str, value: Value) {
        self.values.push(FieldValue {
            name: name.to_string(),
            alias: alias.to_string(),
            value,
        });
    }

    /// Value by canonical name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|v| v.name == name).map(|v| &v.value)
    }

    /// Fields in schema order
    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Internal form: canonical name -> value
    pub fn to_canonical_map(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|v| (v.name.clone(), v.value.clone()))
            .collect()
    }

    /// Wire form: alias -> value
    pub fn to_alias_map(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|v| (v.alias.clone(), v.value.clone()))
            .collect()
    }
}

impl Serialize for ValidatedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for v in &self.values {
            map.serialize_entry(&v.alias, &v.value)?;
        }
        map.end()
    }
}

/// Result of validating one record
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Success(ValidatedRecord),
    Failure(Vec<FieldFailure>),
}

impl ValidationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationOutcome::Success(_))
    }

    /// Accepted record, if any
    pub fn record(&self) -> Option<&ValidatedRecord> {
        match self {
            ValidationOutcome::Success(record) => Some(record),
            ValidationOutcome::Failure(_) => None,
        }
    }

    /// Failures; empty on success
    pub fn failures(&self) -> &[FieldFailure] {
        match self {
            ValidationOutcome::Success(_) => &[],
            ValidationOutcome::Failure(failures) => failures,
        }
    }

    /// Converts into a `Result` so callers can use `?`.
    pub fn into_result(self) -> Result<ValidatedRecord, ValidationErrors> {
        match self {
            ValidationOutcome::Success(record) => Ok(record),
            ValidationOutcome::Failure(failures) => Err(ValidationErrors(failures)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> ValidatedRecord {
        let mut record = ValidatedRecord::default();
        record.push("field1", "field1", json!("lola"));
        record.push("field3", "field with space", json!("spacy"));
        record
    }

    #[test]
    fn test_serializes_under_alias() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json, json!({"field1": "lola", "field with space": "spacy"}));
    }

    #[test]
    fn test_canonical_map() {
        let map = sample_record().to_canonical_map();
        assert_eq!(map.get("field3"), Some(&json!("spacy")));
        assert!(map.get("field with space").is_none());
    }

    #[test]
    fn test_serialized_order_follows_schema() {
        let mut record = ValidatedRecord::default();
        record.push("zeta", "zeta", json!(1));
        record.push("alpha", "alpha", json!(2));
        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text, r#"{"zeta":1,"alpha":2}"#);
    }

    #[test]
    fn test_into_result() {
        let ok = ValidationOutcome::Success(sample_record()).into_result();
        assert!(ok.is_ok());

        let err = ValidationOutcome::Failure(vec![
            FieldFailure::missing("field2"),
            FieldFailure::coercion("age", "expected int, got bool"),
        ])
        .into_result()
        .unwrap_err();
        assert_eq!(err.failures().len(), 2);
        let display = err.to_string();
        assert!(display.contains("2 failure(s)"));
        assert!(display.contains("field 'field2': missing required field"));
    }

    #[test]
    fn test_failure_json() {
        let json = FieldFailure::custom("field1", "nope").to_json();
        assert_eq!(json["code"], "CUSTOM_VALIDATION_FAILED");
        assert_eq!(json["field"], "field1");
    }
}
