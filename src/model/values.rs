//! Validation of raw caller data against a schema
//!
//! Used before an instance exists, e.g. on update payloads. Two scopes:
//! - full: a field is checked if it is required or a value was supplied
//! - partial: a field is checked only if a value was supplied
//!
//! The `id` field is read from the `_id` key of the data. Null values and
//! blank strings count as not supplied.

use serde_json::{Map, Value};
use tracing::debug;

use crate::schema::{
    is_blank_value, FieldDef, FieldError, ModelSchema, ID_FIELD, UNIQUE_ID_KEY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Full,
    Partial,
}

/// Validator over a mutable JSON object of field values.
///
/// By default keys that match no declared field ("rogue" keys) are removed
/// from the data in place.
#[derive(Debug, Clone, Copy)]
pub struct ValuesValidator<'a> {
    schema: &'a ModelSchema,
    scope: Scope,
    delete_rogues: bool,
}

/// Data key a field is read from
fn data_key(name: &str) -> &str {
    if name == ID_FIELD {
        UNIQUE_ID_KEY
    } else {
        name
    }
}

impl<'a> ValuesValidator<'a> {
    /// Checks required fields and every supplied field
    pub fn full(schema: &'a ModelSchema) -> Self {
        Self {
            schema,
            scope: Scope::Full,
            delete_rogues: true,
        }
    }

    /// Checks supplied fields only
    pub fn partial(schema: &'a ModelSchema) -> Self {
        Self {
            schema,
            scope: Scope::Partial,
            delete_rogues: true,
        }
    }

    /// Leave undeclared keys in the data
    pub fn keep_rogues(mut self) -> Self {
        self.delete_rogues = false;
        self
    }

    /// Validates `values`, stopping at the first failure.
    ///
    /// Rogue keys are removed only when validation passes.
    pub fn validate_first(&self, values: &mut Map<String, Value>) -> Result<(), FieldError> {
        for field in self.schema.fields() {
            if let Some(err) = self.check(field, values) {
                return Err(err);
            }
        }
        self.remove_rogues(values);
        Ok(())
    }

    /// Validates `values` and returns every failure.
    ///
    /// Rogue keys are removed whether or not validation passes.
    pub fn validate_all(&self, values: &mut Map<String, Value>) -> Result<(), Vec<FieldError>> {
        let errors: Vec<FieldError> = self
            .schema
            .fields()
            .filter_map(|field| self.check(field, values))
            .collect();

        self.remove_rogues(values);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn check(&self, field: &FieldDef, values: &Map<String, Value>) -> Option<FieldError> {
        let supplied = values.get(data_key(&field.name));

        match (self.scope, supplied) {
            (_, Some(value)) if !is_blank_value(value) => field.validate(value).err(),
            (Scope::Full, supplied) if field.required => Some(FieldError::required_missing(
                &field.name,
                supplied.cloned().unwrap_or(Value::Null),
            )),
            _ => None,
        }
    }

    fn remove_rogues(&self, values: &mut Map<String, Value>) {
        if !self.delete_rogues {
            return;
        }

        let rogues: Vec<String> = values
            .keys()
            .filter(|key| !self.schema.field_names().any(|name| data_key(name) == key.as_str()))
            .cloned()
            .collect();

        for key in rogues {
            debug!(model = %self.schema.name(), key = %key, "removed rogue field");
            values.remove(&key);
        }
    }
}
