//! Model instances
//!
//! An instance holds one value per declared field and behaves as a mapping
//! restricted to those fields.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use crate::schema::{FieldDef, ModelError, ModelResult, ModelSchema, ID_FIELD};

static NULL: Value = Value::Null;

/// Values for one model, checked against its schema on demand.
#[derive(Clone)]
pub struct Model {
    schema: Arc<ModelSchema>,
    data: HashMap<String, Value>,
}

impl Model {
    /// Creates an instance from initial values.
    ///
    /// Every declared field first receives its default (or Null), then
    /// values whose key names a declared field are applied. Keys that match
    /// no field are dropped without error.
    pub fn new<I, K>(schema: &Arc<ModelSchema>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut model = Self::empty(schema);

        for (key, value) in values {
            let key = key.into();
            match schema.field(&key) {
                Some(field) => model.assign(field, value),
                None => trace!(model = %schema.name(), key = %key, "dropped undeclared initial value"),
            }
        }

        model
    }

    /// Creates an instance holding only defaults
    pub fn empty(schema: &Arc<ModelSchema>) -> Self {
        let data = schema
            .fields()
            .map(|f| (f.name.clone(), f.initial_value()))
            .collect();

        Self {
            schema: Arc::clone(schema),
            data,
        }
    }

    /// Creates an instance from a JSON object's entries
    pub fn from_map(schema: &Arc<ModelSchema>, values: Map<String, Value>) -> Self {
        Self::new(schema, values)
    }

    fn assign(&mut self, field: &FieldDef, value: Value) {
        if let Some(alternate) = field.alternate_key() {
            self.data.insert(alternate.to_string(), value.clone());
        }
        self.data.insert(field.name.clone(), value);
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    pub fn model_name(&self) -> &str {
        self.schema.name()
    }

    /// Current value of a declared field.
    ///
    /// # Errors
    ///
    /// `MissingKey` if `name` is not a declared field.
    pub fn get(&self, name: &str) -> ModelResult<&Value> {
        if !self.schema.has_field(name) {
            return Err(ModelError::missing_key(name));
        }
        Ok(self.value(name))
    }

    /// Sets a declared field, mirroring the value to its alternate key.
    ///
    /// # Errors
    ///
    /// `MissingKey` if `name` is not a declared field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> ModelResult<()> {
        let schema = Arc::clone(&self.schema);
        let field = schema.field(name).ok_or_else(|| ModelError::missing_key(name))?;
        self.assign(field, value.into());
        Ok(())
    }

    /// True if `name` holds a non-null value
    pub fn contains(&self, name: &str) -> bool {
        self.data.get(name).is_some_and(|v| !v.is_null())
    }

    /// Declared field names in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.schema.field_names()
    }

    /// Declared fields with their current values
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .field_names()
            .map(move |name| (name, self.value(name)))
    }

    /// Number of entries in the value store, alternate keys included
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reads any key from the value store, including alternate keys
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Declared fields as a JSON object
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    /// Declared fields visible under the model's visibility options
    pub fn public_view(&self) -> Map<String, Value> {
        let options = self.schema.options();
        self.iter()
            .filter(|(k, _)| options.is_public(k))
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    pub(crate) fn value(&self, name: &str) -> &Value {
        self.data.get(name).unwrap_or(&NULL)
    }

    fn same_model(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) || *self.schema == *other.schema
    }
}

impl PartialEq for Model {
    /// Same model and equal declared values. `id` is ignored when either
    /// side has no id yet.
    fn eq(&self, other: &Self) -> bool {
        if !self.same_model(other) {
            return false;
        }

        self.schema.field_names().all(|name| {
            let (ours, theirs) = (self.value(name), other.value(name));
            if name == ID_FIELD && (ours.is_null() || theirs.is_null()) {
                return true;
            }
            ours == theirs
        })
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} object", self.schema.name())
    }
}

impl fmt::Debug for Model {
    /// `<User: User object>`; the alternate form lists declared values.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            let mut out = f.debug_struct(self.schema.name());
            for (name, value) in self.iter() {
                out.field(name, value);
            }
            out.finish()
        } else {
            write!(f, "<{}: {}>", self.schema.name(), self)
        }
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.schema.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
