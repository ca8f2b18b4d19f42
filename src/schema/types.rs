//! Field and record schema definitions
//!
//! Supported field types:
//! - string: UTF-8 string
//! - int: 64-bit signed integer
//! - float: 64-bit floating point
//! - bool: Boolean
//! - list: Homogeneous list with an item type
//!
//! A `RecordSchema` is built once through `RecordSchemaBuilder` and is
//! immutable afterwards. Input is looked up by alias. Accepted records
//! serialize under the alias too; `ValidatedRecord::to_canonical_map` gives
//! canonical keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use super::coerce::coerce;
use super::errors::{SchemaError, SchemaResult};
use super::rules::{Check, Rule};

/// Declared type of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// Boolean
    Bool,
    /// Homogeneous list with single item type
    List {
        /// Item type (boxed to allow nested lists)
        item: Box<FieldType>,
    },
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::List { .. } => "list",
        }
    }

    /// Creates a list type with the given item type
    pub fn list_of(item: FieldType) -> Self {
        FieldType::List {
            item: Box::new(item),
        }
    }
}

/// How far a raw value may be converted to reach the declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionPolicy {
    /// Numbers stringify, numeric strings parse, bool-like strings convert
    #[default]
    Lax,
    /// Value must already have the declared type
    Strict,
}

/// A single field of a record schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
    pub(crate) field_type: FieldType,
    pub(crate) required: bool,
    pub(crate) default: Option<Value>,
    pub(crate) coercion: CoercionPolicy,
    pub(crate) rules: Vec<Rule>,
}

impl FieldSpec {
    /// Create a required field of the given type
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            alias: None,
            field_type,
            required: true,
            default: None,
            coercion: CoercionPolicy::default(),
            rules: Vec::new(),
        }
    }

    /// Create an optional field of the given type
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, field_type)
        }
    }

    /// Create a required string field
    pub fn required_string(name: impl Into<String>) -> Self {
        Self::required(name, FieldType::String)
    }

    /// Create an optional string field
    pub fn optional_string(name: impl Into<String>) -> Self {
        Self::optional(name, FieldType::String)
    }

    /// Create a required int field
    pub fn required_int(name: impl Into<String>) -> Self {
        Self::required(name, FieldType::Int)
    }

    /// Create an optional int field
    pub fn optional_int(name: impl Into<String>) -> Self {
        Self::optional(name, FieldType::Int)
    }

    /// Create a required float field
    pub fn required_float(name: impl Into<String>) -> Self {
        Self::required(name, FieldType::Float)
    }

    /// Create a required bool field
    pub fn required_bool(name: impl Into<String>) -> Self {
        Self::required(name, FieldType::Bool)
    }

    /// Create a required list field
    pub fn required_list(name: impl Into<String>, item: FieldType) -> Self {
        Self::required(name, FieldType::list_of(item))
    }

    /// Sets the external name used for input lookup and serialized output.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the value stored when the field is absent.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn coercion(mut self, policy: CoercionPolicy) -> Self {
        self.coercion = policy;
        self
    }

    /// Appends a rule; rules run in the order they are added.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Canonical (internal) name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// External name; falls back to the canonical name
    pub fn external_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn coercion_policy(&self) -> CoercionPolicy {
        self.coercion
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Checks the field definition itself and coerces its default.
    fn prepare(&mut self) -> SchemaResult<()> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::invalid_schema("field name must not be empty"));
        }
        if self.external_name().trim().is_empty() {
            return Err(SchemaError::invalid_schema(format!(
                "field '{}' has an empty alias",
                self.name
            )));
        }

        for rule in &self.rules {
            if let Check::Range {
                min: Some(min),
                max: Some(max),
            } = rule.check()
            {
                if min > max {
                    return Err(SchemaError::invalid_rule(
                        &self.name,
                        format!("range min {} exceeds max {}", min, max),
                    ));
                }
            }
        }

        if let Some(default) = self.default.take() {
            if default.is_null() {
                if self.required {
                    return Err(SchemaError::invalid_default(
                        &self.name,
                        "required field cannot default to null",
                    ));
                }
                self.default = Some(Value::Null);
            } else {
                let coerced = coerce(&default, &self.field_type, self.coercion)
                    .map_err(|reason| SchemaError::invalid_default(&self.name, reason))?;
                self.default = Some(coerced);
            }
        }

        Ok(())
    }
}

/// Ordered set of fields addressed by alias on input.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    schema_id: String,
    schema_version: String,
    description: Option<String>,
    fields: Vec<FieldSpec>,
    by_alias: HashMap<String, usize>,
}

impl RecordSchema {
    /// Starts building a schema with the given id and version.
    pub fn builder(
        schema_id: impl Into<String>,
        schema_version: impl Into<String>,
    ) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            schema_id: schema_id.into(),
            schema_version: schema_version.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the unique key for this schema (id, version)
    pub fn key(&self) -> (&str, &str) {
        (&self.schema_id, &self.schema_version)
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by its external name.
    pub fn field_by_alias(&self, alias: &str) -> Option<&FieldSpec> {
        self.by_alias.get(alias).map(|&idx| &self.fields[idx])
    }

    /// Looks up a field by its canonical name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Copy of this schema with identity coercion on every field.
    ///
    /// Output of a successful validation is valid input for the strict copy.
    pub fn strict(&self) -> RecordSchema {
        let mut schema = self.clone();
        for field in &mut schema.fields {
            field.coercion = CoercionPolicy::Strict;
        }
        schema
    }
}

/// Builder for `RecordSchema`; `build` enforces schema invariants.
#[derive(Debug)]
pub struct RecordSchemaBuilder {
    schema_id: String,
    schema_version: String,
    description: Option<String>,
    fields: Vec<FieldSpec>,
}

impl RecordSchemaBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a field; declaration order is validation order.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Validates the schema structure and freezes it.
    ///
    /// # Errors
    ///
    /// - Empty schema id or version
    /// - Empty field name or alias
    /// - Duplicate canonical name or alias
    /// - Contradictory rule parameters
    /// - Default that does not coerce to the declared type
    pub fn build(self) -> SchemaResult<RecordSchema> {
        if self.schema_id.trim().is_empty() || self.schema_version.trim().is_empty() {
            return Err(SchemaError::invalid_schema(
                "schema id and version must not be empty",
            ));
        }

        let mut names = HashSet::new();
        let mut by_alias = HashMap::new();
        let mut fields = Vec::with_capacity(self.fields.len());

        for mut field in self.fields {
            field.prepare()?;

            if !names.insert(field.name.clone()) {
                return Err(SchemaError::duplicate_field(&field.name));
            }
            let alias = field.external_name().to_string();
            if by_alias.insert(alias.clone(), fields.len()).is_some() {
                return Err(SchemaError::duplicate_alias(alias));
            }

            fields.push(field);
        }

        Ok(RecordSchema {
            schema_id: self.schema_id,
            schema_version: self.schema_version,
            description: self.description,
            fields,
            by_alias,
        })
    }
}
