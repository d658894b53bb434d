//! Model error types
//!
//! Error codes:
//! - MODEL_REQUIRED_FIELD_MISSING
//! - MODEL_INVALID_VALUE
//! - MODEL_VALIDATION_FAILED
//! - MODEL_MISSING_KEY
//! - MODEL_UNKNOWN_OPTION
//! - MODEL_INVALID_OPTIONS
//! - MODEL_INVALID_FIELD
//! - MODEL_INVALID_PATTERN

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Why a single field failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// Required field has no value
    RequiredMissing,
    /// Value present but rejected by the field's rule
    InvalidValue,
}

impl FieldErrorKind {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            FieldErrorKind::RequiredMissing => "MODEL_REQUIRED_FIELD_MISSING",
            FieldErrorKind::InvalidValue => "MODEL_INVALID_VALUE",
        }
    }
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Field-level validation failure.
///
/// Carries the field name and the offending value so callers can report
/// exactly what was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}: field '{field}', value {value}")]
pub struct FieldError {
    kind: FieldErrorKind,
    field: String,
    value: Value,
    message: String,
}

impl FieldError {
    /// Create a required field missing error
    pub fn required_missing(field: impl Into<String>, value: Value) -> Self {
        Self {
            kind: FieldErrorKind::RequiredMissing,
            field: field.into(),
            value,
            message: "Required field missing".into(),
        }
    }

    /// Create an invalid value error with a rule-specific message
    pub fn invalid_value(field: impl Into<String>, value: Value, message: impl Into<String>) -> Self {
        Self {
            kind: FieldErrorKind::InvalidValue,
            field: field.into(),
            value,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FieldErrorKind {
        self.kind
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether this is a required-field failure
    pub fn is_required_missing(&self) -> bool {
        self.kind == FieldErrorKind::RequiredMissing
    }
}

/// Errors raised by schema construction, instance access and validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("model '{model}' failed validation with {} error(s): {}", .errors.len(), join_errors(.errors))]
    Invalid { model: String, errors: Vec<FieldError> },

    #[error("field not found: {name}")]
    MissingKey { name: String },

    #[error("unknown option '{option}' in options for model '{model}'")]
    UnknownOption { model: String, option: String },

    #[error("invalid options for model '{model}': {reason}")]
    InvalidOptions { model: String, reason: String },

    #[error("invalid declaration for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("invalid regex '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl ModelError {
    pub fn missing_key(name: impl Into<String>) -> Self {
        ModelError::MissingKey { name: name.into() }
    }

    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::Field(err) => err.kind().code(),
            ModelError::Invalid { .. } => "MODEL_VALIDATION_FAILED",
            ModelError::MissingKey { .. } => "MODEL_MISSING_KEY",
            ModelError::UnknownOption { .. } => "MODEL_UNKNOWN_OPTION",
            ModelError::InvalidOptions { .. } => "MODEL_INVALID_OPTIONS",
            ModelError::InvalidField { .. } => "MODEL_INVALID_FIELD",
            ModelError::InvalidPattern { .. } => "MODEL_INVALID_PATTERN",
        }
    }

    /// Returns every field error carried by this error
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ModelError::Field(err) => std::slice::from_ref(err),
            ModelError::Invalid { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Returns whether this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            ModelError::UnknownOption { .. }
                | ModelError::InvalidOptions { .. }
                | ModelError::InvalidField { .. }
                | ModelError::InvalidPattern { .. }
        )
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_error_display() {
        let err = FieldError::invalid_value("age", json!("x"), "Value is not an integer");
        let display = err.to_string();
        assert!(display.contains("age"));
        assert!(display.contains("\"x\""));
        assert!(display.contains("not an integer"));
    }

    #[test]
    fn test_required_missing() {
        let err = FieldError::required_missing("name", Value::Null);
        assert!(err.is_required_missing());
        assert_eq!(err.message(), "Required field missing");
        assert_eq!(err.kind().code(), "MODEL_REQUIRED_FIELD_MISSING");
    }

    #[test]
    fn test_invalid_lists_every_error() {
        let err = ModelError::Invalid {
            model: "User".into(),
            errors: vec![
                FieldError::required_missing("name", Value::Null),
                FieldError::invalid_value("age", json!("x"), "Invalid value"),
            ],
        };
        let display = err.to_string();
        assert!(display.contains("User"));
        assert!(display.contains("2 error(s)"));
        assert!(display.contains("name"));
        assert!(display.contains("age"));
        assert_eq!(err.field_errors().len(), 2);
        assert_eq!(err.code(), "MODEL_VALIDATION_FAILED");
    }

    #[test]
    fn test_config_errors() {
        let err = ModelError::UnknownOption {
            model: "User".into(),
            option: "colour".into(),
        };
        assert!(err.is_config());
        assert!(err.to_string().contains("colour"));
        assert!(!ModelError::missing_key("x").is_config());

        let err = ModelError::InvalidField {
            field: "description".into(),
            reason: "alternate key 'name' collides with declared field 'name'".into(),
        };
        assert!(err.is_config());
        assert_eq!(err.code(), "MODEL_INVALID_FIELD");
    }

    #[test]
    fn test_field_variant_from() {
        let err: ModelError = FieldError::required_missing("name", Value::Null).into();
        assert_eq!(err.code(), "MODEL_REQUIRED_FIELD_MISSING");
        assert_eq!(err.field_errors()[0].field(), "name");
    }
}
