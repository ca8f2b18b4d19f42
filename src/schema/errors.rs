//! Schema error types
//!
//! These cover malformed schemas and failed schema lookups. They are
//! programmer or deployment errors; a rejected record is never a
//! `SchemaError` (see `ValidationOutcome`).
//!
//! Error codes:
//! - FC_INVALID_SCHEMA
//! - FC_DUPLICATE_FIELD
//! - FC_DUPLICATE_ALIAS
//! - FC_INVALID_RULE
//! - FC_INVALID_DEFAULT
//! - FC_UNKNOWN_SCHEMA
//! - FC_UNKNOWN_SCHEMA_VERSION
//! - FC_SCHEMA_IMMUTABLE
//! - FC_MALFORMED_SCHEMA_FILE

use std::fmt;

/// Schema error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Schema identity or field name is unusable
    InvalidSchema,
    /// Two fields share a canonical name
    DuplicateField,
    /// Two fields share an external alias
    DuplicateAlias,
    /// Rule parameters are invalid
    InvalidRule,
    /// Default value does not fit the field
    InvalidDefault,
    /// Schema ID not found
    UnknownSchema,
    /// Schema version not found
    UnknownSchemaVersion,
    /// Attempt to replace a registered schema
    SchemaImmutable,
    /// Schema file could not be read or parsed
    MalformedSchemaFile,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::InvalidSchema => "FC_INVALID_SCHEMA",
            SchemaErrorCode::DuplicateField => "FC_DUPLICATE_FIELD",
            SchemaErrorCode::DuplicateAlias => "FC_DUPLICATE_ALIAS",
            SchemaErrorCode::InvalidRule => "FC_INVALID_RULE",
            SchemaErrorCode::InvalidDefault => "FC_INVALID_DEFAULT",
            SchemaErrorCode::UnknownSchema => "FC_UNKNOWN_SCHEMA",
            SchemaErrorCode::UnknownSchemaVersion => "FC_UNKNOWN_SCHEMA_VERSION",
            SchemaErrorCode::SchemaImmutable => "FC_SCHEMA_IMMUTABLE",
            SchemaErrorCode::MalformedSchemaFile => "FC_MALFORMED_SCHEMA_FILE",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error with context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    field: Option<String>,
}

impl SchemaError {
    fn new(code: SchemaErrorCode, message: String, field: Option<String>) -> Self {
        Self {
            code,
            message,
            field,
        }
    }

    /// Create an invalid schema error
    pub fn invalid_schema(reason: impl Into<String>) -> Self {
        Self::new(SchemaErrorCode::InvalidSchema, reason.into(), None)
    }

    /// Create a duplicate canonical name error
    pub fn duplicate_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(
            SchemaErrorCode::DuplicateField,
            format!("Field '{}' is declared more than once", field),
            Some(field),
        )
    }

    /// Create a duplicate alias error
    pub fn duplicate_alias(alias: impl Into<String>) -> Self {
        let alias = alias.into();
        Self::new(
            SchemaErrorCode::DuplicateAlias,
            format!("Alias '{}' is used by more than one field", alias),
            Some(alias),
        )
    }

    /// Create an invalid rule error
    pub fn invalid_rule(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(
            SchemaErrorCode::InvalidRule,
            format!("Invalid rule on field '{}': {}", field, reason.into()),
            Some(field),
        )
    }

    /// Create an invalid default error
    pub fn invalid_default(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(
            SchemaErrorCode::InvalidDefault,
            format!("Invalid default for field '{}': {}", field, reason.into()),
            Some(field),
        )
    }

    /// Create an unknown schema error
    pub fn unknown_schema(schema_id: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::UnknownSchema,
            format!("Schema '{}' not found", schema_id.into()),
            None,
        )
    }

    /// Create an unknown schema version error
    pub fn unknown_version(schema_id: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::UnknownSchemaVersion,
            format!(
                "Schema '{}' version '{}' not found",
                schema_id.into(),
                version.into()
            ),
            None,
        )
    }

    /// Create a schema immutable error
    pub fn schema_immutable(schema_id: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::SchemaImmutable,
            format!(
                "Schema '{}' version '{}' is already registered",
                schema_id.into(),
                version.into()
            ),
            None,
        )
    }

    /// Create an error for an unreadable or unparsable schema file
    pub fn malformed_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::MalformedSchemaFile,
            format!("Malformed schema file '{}': {}", path.into(), reason.into()),
            None,
        )
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending field or alias, if any
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::DuplicateAlias.code(), "FC_DUPLICATE_ALIAS");
        assert_eq!(SchemaErrorCode::UnknownSchema.code(), "FC_UNKNOWN_SCHEMA");
        assert_eq!(
            SchemaErrorCode::UnknownSchemaVersion.code(),
            "FC_UNKNOWN_SCHEMA_VERSION"
        );
        assert_eq!(SchemaErrorCode::SchemaImmutable.code(), "FC_SCHEMA_IMMUTABLE");
        assert_eq!(
            SchemaErrorCode::MalformedSchemaFile.code(),
            "FC_MALFORMED_SCHEMA_FILE"
        );
    }

    #[test]
    fn test_display_includes_code() {
        let err = SchemaError::duplicate_alias("field 2");
        let display = format!("{}", err);
        assert!(display.starts_with("[FC_DUPLICATE_ALIAS]"));
        assert!(display.contains("field 2"));
        assert_eq!(err.field(), Some("field 2"));
    }

    #[test]
    fn test_invalid_rule_names_field() {
        let err = SchemaError::invalid_rule("age", "range min 5 exceeds max 1");
        assert!(err.message().contains("age"));
        assert_eq!(err.code(), SchemaErrorCode::InvalidRule);
    }
}
