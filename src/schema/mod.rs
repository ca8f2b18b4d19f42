//! Field validation subsystem
//!
//! A `RecordSchema` maps external aliases to canonical field names, declared
//! types, coercion policies and ordered validator rules. Validating a raw
//! record yields a `ValidationOutcome`.
//!
//! # Design Principles
//!
//! - Schemas are built once and immutable afterwards
//! - Input and serialized output are keyed by alias; canonical names are
//!   available through `ValidatedRecord::to_canonical_map`
//! - Field failures accumulate; one field never masks another
//! - Rule order relative to coercion is observable and preserved
//! - Malformed schemas are `SchemaError`s, rejected records are not
//! - Deterministic validation

mod coerce;
mod errors;
mod loader;
mod outcome;
mod rules;
mod types;
mod validator;

pub use coerce::{coerce, json_type_name};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use loader::{parse_schema, read_schema_file, SchemaLoader};
pub use outcome::{
    FailureKind, FieldFailure, FieldValue, ValidatedRecord, ValidationErrors, ValidationOutcome,
    MISSING_REQUIRED_FIELD,
};
pub use rules::{Check, Rule, Stage};
pub use types::{CoercionPolicy, FieldSpec, FieldType, RecordSchema, RecordSchemaBuilder};
pub use validator::{validate, validate_map, SchemaValidator, ROOT_FIELD};
