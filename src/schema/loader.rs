//! Schema loader for JSON schema files
//!
//! - One schema version per `*.json` file in the schema directory
//! - Files go through the same builder as programmatic schemas
//! - A missing directory means nothing to load
//! - Registered (id, version) pairs are immutable
//!
//! File shape:
//!
//! ```json
//! {
//!   "schema_id": "aliased",
//!   "schema_version": "v1",
//!   "fields": [
//!     { "name": "field1", "type": "string",
//!       "validators": [ { "check": "is_string", "pre": true } ] },
//!     { "name": "field3", "alias": "field with space", "type": "string",
//!       "required": false }
//!   ]
//! }
//! ```

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{SchemaError, SchemaResult};
use super::rules::{Check, Rule};
use super::types::{CoercionPolicy, FieldSpec, FieldType, RecordSchema};

/// Schema file as stored on disk
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    schema_id: String,
    schema_version: String,
    #[serde(default)]
    description: Option<String>,
    fields: Vec<FieldEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldEntry {
    name: String,
    #[serde(default)]
    alias: Option<String>,
    #[serde(rename = "type")]
    kind: TypeName,
    #[serde(default)]
    item: Option<Box<TypeEntry>>,
    #[serde(default = "default_required")]
    required: bool,
    #[serde(default)]
    default: Option<Value>,
    #[serde(default)]
    coercion: CoercionPolicy,
    #[serde(default)]
    validators: Vec<RuleEntry>,
}

fn default_required() -> bool {
    true
}

/// List item type, nested as `"item": { "type": ... }`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeEntry {
    #[serde(rename = "type")]
    kind: TypeName,
    #[serde(default)]
    item: Option<Box<TypeEntry>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TypeName {
    String,
    Int,
    Float,
    Bool,
    List,
}

fn field_type(
    field: &str,
    kind: TypeName,
    item: Option<Box<TypeEntry>>,
) -> SchemaResult<FieldType> {
    match (kind, item) {
        (TypeName::List, Some(item)) => {
            let item_type = field_type(field, item.kind, item.item)?;
            Ok(FieldType::list_of(item_type))
        }
        (TypeName::List, None) => Err(SchemaError::invalid_schema(format!(
            "list field '{}' has no item type",
            field
        ))),
        (_, Some(_)) => Err(SchemaError::invalid_schema(format!(
            "field '{}' declares an item type but is not a list",
            field
        ))),
        (TypeName::String, None) => Ok(FieldType::String),
        (TypeName::Int, None) => Ok(FieldType::Int),
        (TypeName::Float, None) => Ok(FieldType::Float),
        (TypeName::Bool, None) => Ok(FieldType::Bool),
    }
}

/// One validator entry. Parameters are flat keys next to `check`; a
/// parameter the check does not take is an error.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleEntry {
    check: CheckName,
    #[serde(default)]
    pre: bool,
    #[serde(default)]
    each_item: bool,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    regex: Option<String>,
    #[serde(default)]
    values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum CheckName {
    IsString,
    NonEmpty,
    MinLength,
    MaxLength,
    Pattern,
    Range,
    OneOf,
    Trim,
    Lowercase,
}

impl CheckName {
    fn params(self) -> &'static [&'static str] {
        match self {
            CheckName::MinLength => &["min"],
            CheckName::MaxLength => &["max"],
            CheckName::Pattern => &["regex"],
            CheckName::Range => &["min", "max"],
            CheckName::OneOf => &["values"],
            _ => &[],
        }
    }
}

impl RuleEntry {
    fn given_params(&self) -> Vec<&'static str> {
        let mut given = Vec::new();
        if self.min.is_some() {
            given.push("min");
        }
        if self.max.is_some() {
            given.push("max");
        }
        if self.regex.is_some() {
            given.push("regex");
        }
        if self.values.is_some() {
            given.push("values");
        }
        given
    }

    fn into_rule(self, field: &str) -> SchemaResult<Rule> {
        let given = self.given_params();

        let check = match self.check {
            CheckName::IsString => Check::IsString,
            CheckName::NonEmpty => Check::NonEmpty,
            CheckName::MinLength => Check::MinLength(length_param(field, "min", self.min)?),
            CheckName::MaxLength => Check::MaxLength(length_param(field, "max", self.max)?),
            CheckName::Pattern => {
                let regex = self.regex.ok_or_else(|| missing_param(field, "regex"))?;
                Check::pattern(field, &regex)?
            }
            CheckName::Range => Check::Range {
                min: self.min,
                max: self.max,
            },
            CheckName::OneOf => {
                let values = self.values.ok_or_else(|| missing_param(field, "values"))?;
                Check::OneOf(values)
            }
            CheckName::Trim => Check::Trim,
            CheckName::Lowercase => Check::Lowercase,
        };

        let allowed = self.check.params();
        if let Some(stray) = given.into_iter().find(|p| !allowed.contains(p)) {
            return Err(SchemaError::invalid_rule(
                field,
                format!("{} does not take '{}'", check.name(), stray),
            ));
        }

        let rule = if self.pre {
            Rule::pre(check)
        } else {
            Rule::post(check)
        };
        Ok(if self.each_item { rule.each_item() } else { rule })
    }
}

fn missing_param(field: &str, param: &str) -> SchemaError {
    SchemaError::invalid_rule(field, format!("missing parameter '{}'", param))
}

fn length_param(field: &str, param: &str, value: Option<f64>) -> SchemaResult<usize> {
    let value = value.ok_or_else(|| missing_param(field, param))?;
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(SchemaError::invalid_rule(
            field,
            format!("'{}' must be a non-negative integer, got {}", param, value),
        ));
    }
    Ok(value as usize)
}

impl SchemaFile {
    fn into_schema(self) -> SchemaResult<RecordSchema> {
        let mut builder = RecordSchema::builder(self.schema_id, self.schema_version);
        if let Some(description) = self.description {
            builder = builder.description(description);
        }

        for entry in self.fields {
            let declared = field_type(&entry.name, entry.kind, entry.item)?;
            let mut field = if entry.required {
                FieldSpec::required(entry.name, declared)
            } else {
                FieldSpec::optional(entry.name, declared)
            }
            .coercion(entry.coercion);

            if let Some(alias) = entry.alias {
                field = field.alias(alias);
            }
            if let Some(default) = entry.default {
                field = field.default_value(default);
            }

            for rule in entry.validators {
                let rule = rule.into_rule(field.name())?;
                field = field.rule(rule);
            }

            builder = builder.field(field);
        }

        builder.build()
    }
}

/// Schema loader that reads schema files from disk and maintains an in-memory registry.
pub struct SchemaLoader {
    /// Directory containing schema files
    schema_dir: PathBuf,
    /// Loaded schemas indexed by (schema_id, schema_version)
    schemas: HashMap<(String, String), RecordSchema>,
}

impl SchemaLoader {
    /// Creates a loader for the given schema directory.
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: HashMap::new(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads all `*.json` schema files from the schema directory.
    ///
    /// Files are loaded in name order so duplicate errors are reproducible.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        if !self.schema_dir.exists() {
            return Ok(());
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_schema(
                self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_schema(
                    self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;

            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            self.load_file(&path)?;
        }

        Ok(())
    }

    /// Loads and registers a single schema file.
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<&RecordSchema> {
        let schema = read_schema_file(path)?;
        self.register(schema)
    }

    /// Registers a schema directly (for testing or programmatic creation).
    pub fn register(&mut self, schema: RecordSchema) -> SchemaResult<&RecordSchema> {
        let key = (
            schema.schema_id().to_string(),
            schema.schema_version().to_string(),
        );

        if self.schemas.contains_key(&key) {
            return Err(SchemaError::schema_immutable(&key.0, &key.1));
        }

        Ok(self.schemas.entry(key).or_insert(schema))
    }

    /// Gets a schema by ID and version.
    pub fn get(&self, schema_id: &str, schema_version: &str) -> Option<&RecordSchema> {
        self.schemas
            .get(&(schema_id.to_string(), schema_version.to_string()))
    }

    /// Checks if a schema exists.
    pub fn exists(&self, schema_id: &str, schema_version: &str) -> bool {
        self.get(schema_id, schema_version).is_some()
    }

    /// Checks if any version of a schema ID exists.
    pub fn schema_id_exists(&self, schema_id: &str) -> bool {
        self.schemas.keys().any(|(id, _)| id == schema_id)
    }

    /// Returns all loaded schemas, ordered by (id, version).
    pub fn all_schemas(&self) -> Vec<&RecordSchema> {
        let mut all: Vec<_> = self.schemas.values().collect();
        all.sort_by(|a, b| a.key().cmp(&b.key()));
        all
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

/// Reads one schema file without registering it.
pub fn read_schema_file(path: &Path) -> SchemaResult<RecordSchema> {
    let content = fs::read_to_string(path).map_err(|e| {
        SchemaError::malformed_schema(
            path.display().to_string(),
            format!("Failed to read file: {}", e),
        )
    })?;

    let file: SchemaFile = serde_json::from_str(&content).map_err(|e| {
        SchemaError::malformed_schema(path.display().to_string(), format!("Invalid JSON: {}", e))
    })?;

    file.into_schema()
}

/// Parses a schema from its JSON text.
pub fn parse_schema(content: &str) -> SchemaResult<RecordSchema> {
    let file: SchemaFile = serde_json::from_str(content)
        .map_err(|e| SchemaError::malformed_schema("<inline>", format!("Invalid JSON: {}", e)))?;
    file.into_schema()
}
