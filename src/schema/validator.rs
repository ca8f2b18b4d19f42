//! Record validation against a `RecordSchema`
//!
//! For each field, in schema order:
//! 1. Look the raw value up by alias (explicit null counts as absent)
//! 2. Absent: use the default, fail if required, else store null
//! 3. Run pre-coercion rules on the raw value
//! 4. Coerce to the declared type under the field's policy
//! 5. Run post-coercion rules on the coerced value
//!
//! A failure stops work on that field only. All field failures of a
//! record are returned together. Extra input keys are ignored.

use serde_json::{Map, Value};

use super::coerce::{coerce, json_type_name};
use super::errors::{SchemaError, SchemaResult};
use super::loader::SchemaLoader;
use super::outcome::{FieldFailure, ValidatedRecord, ValidationOutcome};
use super::rules::Stage;
use super::types::{FieldSpec, RecordSchema};

/// Pseudo-field used when the record itself is not an object
pub const ROOT_FIELD: &str = "$root";

/// Validates a raw record against a schema.
///
/// Pure and deterministic; safe to call concurrently on one schema.
pub fn validate(schema: &RecordSchema, raw: &Value) -> ValidationOutcome {
    match raw.as_object() {
        Some(obj) => validate_map(schema, obj),
        None => ValidationOutcome::Failure(vec![FieldFailure::coercion(
            ROOT_FIELD,
            format!("expected object, got {}", json_type_name(raw)),
        )]),
    }
}

/// Validates a raw record given as a JSON map keyed by alias.
pub fn validate_map(schema: &RecordSchema, raw: &Map<String, Value>) -> ValidationOutcome {
    let mut record = ValidatedRecord::default();
    let mut failures = Vec::new();

    for field in schema.fields() {
        match validate_field(field, raw.get(field.external_name())) {
            Ok(value) => record.push(field.name(), field.external_name(), value),
            Err(failure) => failures.push(failure),
        }
    }

    if failures.is_empty() {
        ValidationOutcome::Success(record)
    } else {
        ValidationOutcome::Failure(failures)
    }
}

fn validate_field(field: &FieldSpec, raw: Option<&Value>) -> Result<Value, FieldFailure> {
    let raw = match raw {
        Some(value) if !value.is_null() => value.clone(),
        _ => {
            if let Some(default) = field.default() {
                return Ok(default.clone());
            }
            if field.is_required() {
                return Err(FieldFailure::missing(field.name()));
            }
            return Ok(Value::Null);
        }
    };

    let value = run_rules(field, Stage::Pre, raw)?;

    let value = coerce(&value, field.field_type(), field.coercion_policy())
        .map_err(|reason| FieldFailure::coercion(field.name(), reason))?;

    run_rules(field, Stage::Post, value)
}

fn run_rules(field: &FieldSpec, stage: Stage, value: Value) -> Result<Value, FieldFailure> {
    field
        .rules()
        .iter()
        .filter(|rule| rule.stage() == stage)
        .try_fold(value, |value, rule| {
            rule.apply(value).map_err(|reason| {
                FieldFailure::custom(field.name(), format!("{}: {}", rule.check().name(), reason))
            })
        })
}

impl RecordSchema {
    /// Validates a raw record against this schema. See [`validate`].
    pub fn validate(&self, raw: &Value) -> ValidationOutcome {
        validate(self, raw)
    }
}

/// Validates records against schemas registered in a loader.
pub struct SchemaValidator<'a> {
    loader: &'a SchemaLoader,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a new validator backed by the given schema loader.
    pub fn new(loader: &'a SchemaLoader) -> Self {
        Self { loader }
    }

    /// Validates a record against a registered schema.
    ///
    /// # Errors
    ///
    /// Lookup failures are errors (FC_UNKNOWN_SCHEMA,
    /// FC_UNKNOWN_SCHEMA_VERSION). A rejected record is `Ok(Failure(..))`.
    pub fn validate_record(
        &self,
        schema_id: &str,
        schema_version: &str,
        raw: &Value,
    ) -> SchemaResult<ValidationOutcome> {
        if !self.loader.schema_id_exists(schema_id) {
            return Err(SchemaError::unknown_schema(schema_id));
        }

        let schema = self
            .loader
            .get(schema_id, schema_version)
            .ok_or_else(|| SchemaError::unknown_version(schema_id, schema_version))?;

        Ok(validate(schema, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::errors::SchemaErrorCode;
    use crate::schema::outcome::FailureKind;
    use crate::schema::rules::{Check, Rule};
    use crate::schema::types::{CoercionPolicy, FieldType};
    use serde_json::json;
    use tempfile::TempDir;

    fn aliased_schema(rule: Option<Rule>) -> RecordSchema {
        let mut field2 = FieldSpec::required_string("field2").alias("field 2");
        if let Some(rule) = rule {
            field2 = field2.rule(rule);
        }
        RecordSchema::builder("aliased", "v1")
            .field(FieldSpec::required_string("field1").rule(Rule::pre(Check::IsString)))
            .field(field2)
            .field(FieldSpec::optional_string("field3").alias("field with space"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_valid_record_passes() {
        let schema = aliased_schema(None);
        let outcome = validate(
            &schema,
            &json!({"field1": "lola", "field 2": "some data", "field with space": "spacy"}),
        );
        let record = outcome.record().unwrap();
        assert_eq!(
            Value::Object(record.to_canonical_map()),
            json!({"field1": "lola", "field2": "some data", "field3": "spacy"})
        );
    }

    #[test]
    fn test_explicit_null_on_required_field() {
        let schema = aliased_schema(None);
        let outcome = validate(&schema, &json!({"field1": "lola", "field 2": null}));
        assert_eq!(outcome.failures(), &[FieldFailure::missing("field2")]);
    }

    #[test]
    fn test_optional_absent_is_null() {
        let schema = aliased_schema(None);
        let outcome = validate(&schema, &json!({"field1": "lola", "field 2": "x"}));
        assert_eq!(outcome.record().unwrap().get("field3"), Some(&Value::Null));
    }

    #[test]
    fn test_integer_stringified_without_rules() {
        let schema = aliased_schema(None);
        let outcome = validate(&schema, &json!({"field1": "lola", "field 2": 23}));
        assert_eq!(outcome.record().unwrap().get("field2"), Some(&json!("23")));
    }

    #[test]
    fn test_pre_rule_rejects_integer() {
        let schema = aliased_schema(Some(Rule::pre(Check::IsString)));
        let outcome = validate(&schema, &json!({"field1": "lola", "field 2": 23}));
        let failures = outcome.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].field, "field2");
        assert_eq!(failures[0].kind, FailureKind::CustomValidationFailure);
        assert!(failures[0].reason.starts_with("is_string:"));
    }

    #[test]
    fn test_post_rule_sees_coerced_value() {
        let schema = aliased_schema(Some(Rule::post(Check::IsString)));
        let outcome = validate(&schema, &json!({"field1": "lola", "field 2": 23}));
        assert_eq!(outcome.record().unwrap().get("field2"), Some(&json!("23")));
    }

    #[test]
    fn test_failures_accumulate_in_schema_order() {
        let schema = aliased_schema(None);
        let outcome = validate(&schema, &json!({"field1": 5, "field with space": [1]}));
        let fields: Vec<_> = outcome.failures().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["field1", "field2", "field3"]);
        assert_eq!(outcome.failures()[2].kind, FailureKind::TypeCoercionFailure);
    }

    #[test]
    fn test_extra_keys_ignored() {
        let schema = aliased_schema(None);
        let outcome = validate(
            &schema,
            &json!({"field1": "a", "field 2": "b", "field2": "ignored", "other": 1}),
        );
        assert_eq!(outcome.record().unwrap().get("field2"), Some(&json!("b")));
    }

    #[test]
    fn test_canonical_key_does_not_address_aliased_field() {
        let schema = aliased_schema(None);
        let outcome = validate(&schema, &json!({"field1": "a", "field2": "b"}));
        assert_eq!(outcome.failures(), &[FieldFailure::missing("field2")]);
    }

    #[test]
    fn test_default_used_when_absent() {
        let schema = RecordSchema::builder("s", "v1")
            .field(FieldSpec::required_int("retries").default_value(json!(3)))
            .build()
            .unwrap();
        let outcome = validate(&schema, &json!({}));
        assert_eq!(outcome.record().unwrap().get("retries"), Some(&json!(3)));
    }

    #[test]
    fn test_default_skips_rules() {
        let schema = RecordSchema::builder("s", "v1")
            .field(
                FieldSpec::optional_string("tag")
                    .default_value(json!(""))
                    .rule(Rule::post(Check::NonEmpty)),
            )
            .build()
            .unwrap();
        assert!(validate(&schema, &json!({"tag": null})).is_success());
        assert!(!validate(&schema, &json!({"tag": ""})).is_success());
    }

    #[test]
    fn test_transform_output_feeds_coercion() {
        let schema = RecordSchema::builder("s", "v1")
            .field(
                FieldSpec::required_string("code")
                    .rule(Rule::pre(Check::Trim))
                    .rule(Rule::post(Check::Lowercase))
                    .rule(Rule::post(Check::pattern("code", "^[a-z]+$").unwrap())),
            )
            .build()
            .unwrap();
        let outcome = validate(&schema, &json!({"code": "  ABC "}));
        assert_eq!(outcome.record().unwrap().get("code"), Some(&json!("abc")));
    }

    #[test]
    fn test_first_failing_rule_short_circuits() {
        let schema = RecordSchema::builder("s", "v1")
            .field(
                FieldSpec::required_string("name")
                    .rule(Rule::post(Check::MinLength(3)))
                    .rule(Rule::post(Check::MaxLength(1))),
            )
            .build()
            .unwrap();
        let outcome = validate(&schema, &json!({"name": "ab"}));
        assert_eq!(outcome.failures().len(), 1);
        assert!(outcome.failures()[0].reason.starts_with("min_length:"));
    }

    #[test]
    fn test_strict_policy_rejects_integer_for_string() {
        let schema = RecordSchema::builder("s", "v1")
            .field(FieldSpec::required_string("id").coercion(CoercionPolicy::Strict))
            .build()
            .unwrap();
        let outcome = validate(&schema, &json!({"id": 23}));
        assert_eq!(outcome.failures()[0].kind, FailureKind::TypeCoercionFailure);
    }

    #[test]
    fn test_each_item_rule_on_list() {
        let schema = RecordSchema::builder("s", "v1")
            .field(
                FieldSpec::required_list("tags", FieldType::String)
                    .rule(Rule::pre(Check::IsString).each_item()),
            )
            .build()
            .unwrap();
        assert!(validate(&schema, &json!({"tags": ["a", "b"]})).is_success());

        let outcome = validate(&schema, &json!({"tags": ["a", 2]}));
        assert!(outcome.failures()[0].reason.contains("item 1"));
    }

    #[test]
    fn test_non_object_record() {
        let schema = aliased_schema(None);
        let outcome = validate(&schema, &json!(["field1"]));
        assert_eq!(outcome.failures()[0].field, ROOT_FIELD);
    }

    #[test]
    fn test_one_of_agrees_across_policies() {
        let schema = RecordSchema::builder("s", "v1")
            .field(
                FieldSpec::required("ratio", FieldType::Float)
                    .rule(Rule::post(Check::OneOf(vec![json!(1), json!(2)]))),
            )
            .field(
                FieldSpec::required_int("level")
                    .rule(Rule::post(Check::OneOf(vec![json!(1.0), json!(2.0)]))),
            )
            .build()
            .unwrap();
        let strict = schema.strict();

        let raw = json!({"ratio": 1, "level": 2});
        assert!(validate(&schema, &raw).is_success());
        assert!(validate(&strict, &raw).is_success());
        assert!(validate(&schema, &json!({"ratio": "1", "level": "2"})).is_success());

        let outcome = validate(&schema, &json!({"ratio": 3, "level": 2}));
        assert_eq!(outcome.failures().len(), 1);
        assert_eq!(outcome.failures()[0].field, "ratio");
    }

    #[test]
    fn test_validator_over_loader() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path());
        loader.register(aliased_schema(None)).unwrap();
        let validator = SchemaValidator::new(&loader);

        let outcome = validator
            .validate_record("aliased", "v1", &json!({"field1": "a", "field 2": "b"}))
            .unwrap();
        assert!(outcome.is_success());

        let err = validator
            .validate_record("missing", "v1", &json!({}))
            .unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::UnknownSchema);

        let err = validator
            .validate_record("aliased", "v9", &json!({}))
            .unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::UnknownSchemaVersion);
    }
}
