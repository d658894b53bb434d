//! Instance validation
//!
//! Validation semantics:
//! - A non-empty value must pass the field's rule
//! - An empty value (null or "") on a required field is an error
//! - An empty value on an optional field is accepted
//! - Fields are checked in declaration order

use tracing::debug;

use super::instance::Model;
use crate::schema::{is_empty_value, FieldDef, FieldError, ModelError, ModelResult};
use serde_json::Value;

/// Checks one field's current value.
pub(crate) fn check_field(field: &FieldDef, value: &Value) -> Result<(), FieldError> {
    if !is_empty_value(value) {
        field.validate(value)
    } else if field.required {
        Err(FieldError::required_missing(&field.name, value.clone()))
    } else {
        Ok(())
    }
}

impl Model {
    /// Validates every field, stopping at the first failure.
    pub fn validate_first(&self) -> Result<(), FieldError> {
        for field in self.schema().fields() {
            check_field(field, self.value(&field.name))?;
        }
        Ok(())
    }

    /// Validates every field and reports all failures together.
    ///
    /// # Errors
    ///
    /// `ModelError::Invalid` naming the model and listing every failing
    /// field, only when at least one field failed.
    pub fn validate_all(&self) -> ModelResult<()> {
        let errors: Vec<FieldError> = self
            .schema()
            .fields()
            .filter_map(|field| check_field(field, self.value(&field.name)).err())
            .collect();

        if errors.is_empty() {
            return Ok(());
        }

        debug!(model = %self.model_name(), errors = errors.len(), "model validation failed");
        Err(ModelError::Invalid {
            model: self.model_name().to_string(),
            errors,
        })
    }

    /// Flag-driven entry point: `validate_all` selects aggregate mode.
    ///
    /// Returns `Ok(true)` when the instance is valid. In single-error mode
    /// the failure is `ModelError::Field`.
    pub fn validate(&self, validate_all: bool) -> ModelResult<bool> {
        if validate_all {
            self.validate_all()?;
        } else {
            self.validate_first()?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::{FieldDef, FieldErrorKind, ModelError, ModelSchema};
    use crate::Model;
    use serde_json::json;
    use std::sync::Arc;

    fn person() -> Arc<ModelSchema> {
        ModelSchema::builder("Person")
            .field("name", FieldDef::string().required())
            .field("age", FieldDef::int())
            .build()
            .unwrap()
    }

    #[test]
    fn test_valid_instance() {
        let p = Model::new(&person(), [("name", json!("A"))]);
        assert!(p.validate_first().is_ok());
        assert!(p.validate_all().is_ok());
        assert!(p.validate(false).unwrap());
        assert!(p.validate(true).unwrap());
    }

    #[test]
    fn test_missing_required() {
        let p = Model::empty(&person());
        let err = p.validate_first().unwrap_err();
        assert_eq!(err.field(), "name");
        assert_eq!(err.kind(), FieldErrorKind::RequiredMissing);
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let p = Model::new(&person(), [("name", json!(""))]);
        assert!(p.validate_first().unwrap_err().is_required_missing());
    }

    #[test]
    fn test_type_error() {
        let p = Model::new(&person(), [("name", json!("A")), ("age", json!("x"))]);
        let err = p.validate_first().unwrap_err();
        assert_eq!(err.field(), "age");
        assert_eq!(err.value(), &json!("x"));
        assert_eq!(err.kind(), FieldErrorKind::InvalidValue);
    }

    #[test]
    fn test_first_stops_all_collects() {
        let p = Model::new(&person(), [("age", json!("x"))]);

        let first = p.validate_first().unwrap_err();
        assert_eq!(first.field(), "name");

        match p.validate_all().unwrap_err() {
            ModelError::Invalid { model, errors } => {
                assert_eq!(model, "Person");
                let fields: Vec<_> = errors.iter().map(|e| e.field()).collect();
                assert_eq!(fields, vec!["name", "age"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_flag_entry_point_error_shapes() {
        let p = Model::empty(&person());
        assert!(matches!(p.validate(false), Err(ModelError::Field(_))));
        assert!(matches!(p.validate(true), Err(ModelError::Invalid { .. })));
    }
}
