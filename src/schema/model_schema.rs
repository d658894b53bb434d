//! Model schemas
//!
//! A schema is the complete, ordered set of field declarations for a model
//! plus its options. Schemas are composed explicitly: a derived schema copies
//! its bases' fields and applies its own declarations on top.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::errors::{ModelError, ModelResult};
use super::field::FieldDef;
use super::options::ModelOptions;

/// Ordered field mapping and options for one model.
///
/// Immutable once built; share it with [`Arc`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    name: String,
    parent: Option<String>,
    fields: Vec<FieldDef>,
    index: HashMap<String, usize>,
    options: ModelOptions,
}

impl ModelSchema {
    /// Start building a schema for `name`
    pub fn builder(name: impl Into<String>) -> ModelSchemaBuilder {
        ModelSchemaBuilder::new(name)
    }

    /// Composes a schema from ancestors and new declarations.
    ///
    /// Ancestor fields are merged in order, then `declared` is applied. A
    /// declaration with an existing name replaces that field in place; new
    /// names are appended. Declared fields are stamped with their name and
    /// `name` as owner. Options are parsed from `options` and are not
    /// inherited.
    ///
    /// # Errors
    ///
    /// - `InvalidField` for an empty field name, or an alternate key that
    ///   names another declared field
    /// - `UnknownOption` / `InvalidOptions` for a bad options block
    pub fn compose(
        name: &str,
        bases: &[&ModelSchema],
        declared: Vec<(String, FieldDef)>,
        options: Option<&Value>,
    ) -> ModelResult<Self> {
        Self::compose_accepting(name, bases, declared, options, &[])
    }

    /// Like [`ModelSchema::compose`], also accepting `extra_options` in the
    /// options block.
    ///
    /// Extra option names accepted by any base are accepted as well, so a
    /// model family shares one set of option names.
    pub fn compose_accepting(
        name: &str,
        bases: &[&ModelSchema],
        declared: Vec<(String, FieldDef)>,
        options: Option<&Value>,
        extra_options: &[String],
    ) -> ModelResult<Self> {
        let mut accepted: Vec<String> = Vec::new();
        let inherited = bases.iter().flat_map(|b| b.options.accepted_extra.iter());
        for option in inherited.chain(extra_options) {
            if !accepted.contains(option) {
                accepted.push(option.clone());
            }
        }
        let options = ModelOptions::parse_with(name, options, &accepted)?;

        let mut schema = Self {
            name: name.to_string(),
            parent: bases.first().map(|b| b.name.clone()),
            fields: Vec::new(),
            index: HashMap::new(),
            options,
        };

        for base in bases {
            for field in &base.fields {
                schema.upsert(field.clone());
            }
        }

        for (field_name, mut field) in declared {
            if field_name.is_empty() {
                return Err(ModelError::InvalidField {
                    field: field_name,
                    reason: "field name must not be empty".into(),
                });
            }
            field.name = field_name;
            field.owner_model = Some(name.to_string());
            schema.upsert(field);
        }

        schema.check_alternate_keys()?;

        debug!(
            model = %schema.name,
            parent = ?schema.parent,
            fields = schema.fields.len(),
            "composed model schema"
        );

        Ok(schema)
    }

    /// Copy of this schema with `replacements` applied, owned by the same
    /// model name and recording this schema as parent.
    pub(crate) fn derive_with(&self, replacements: Vec<FieldDef>) -> ModelResult<Self> {
        let mut derived = self.clone();
        derived.parent = Some(self.name.clone());
        for field in replacements {
            derived.upsert(field);
        }
        derived.check_alternate_keys()?;
        Ok(derived)
    }

    /// An instance stores a copy of each value under the field's alternate
    /// key, so that key must not be another field's name.
    fn check_alternate_keys(&self) -> ModelResult<()> {
        for field in &self.fields {
            let Some(key) = field.alternate_key() else {
                continue;
            };
            if key != field.name && self.has_field(key) {
                return Err(ModelError::InvalidField {
                    field: field.name.clone(),
                    reason: format!("alternate key '{key}' collides with declared field '{key}'"),
                });
            }
        }
        Ok(())
    }

    fn upsert(&mut self, field: FieldDef) {
        match self.index.get(&field.name) {
            Some(&pos) => self.fields[pos] = field,
            None => {
                self.index.insert(field.name.clone(), self.fields.len());
                self.fields.push(field);
            }
        }
    }

    /// Model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the first base schema, if any
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// Field declarations in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.index.get(name).map(|&pos| &self.fields[pos])
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The field marked as the model's unique identifier
    pub fn unique_field(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.is_unique_id())
    }
}

/// Builder over [`ModelSchema::compose`]
#[derive(Debug)]
pub struct ModelSchemaBuilder {
    name: String,
    bases: Vec<Arc<ModelSchema>>,
    declared: Vec<(String, FieldDef)>,
    options: Option<Value>,
    extra_options: Vec<String>,
}

impl ModelSchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            declared: Vec::new(),
            options: None,
            extra_options: Vec::new(),
        }
    }

    /// Inherit the fields of `base`
    pub fn extends(mut self, base: &Arc<ModelSchema>) -> Self {
        self.bases.push(Arc::clone(base));
        self
    }

    /// Declare a field
    pub fn field(mut self, name: impl Into<String>, field: FieldDef) -> Self {
        self.declared.push((name.into(), field));
        self
    }

    /// Attach an options block
    pub fn options(mut self, block: Value) -> Self {
        self.options = Some(block);
        self
    }

    /// Accept an additional option name for this model and models
    /// extending it; its value lands in [`ModelOptions::extra`]
    pub fn accept_option(mut self, name: impl Into<String>) -> Self {
        self.extra_options.push(name.into());
        self
    }

    pub fn build(self) -> ModelResult<Arc<ModelSchema>> {
        let bases: Vec<&ModelSchema> = self.bases.iter().map(|b| &**b).collect();
        ModelSchema::compose_accepting(
            &self.name,
            &bases,
            self.declared,
            self.options.as_ref(),
            &self.extra_options,
        )
        .map(Arc::new)
    }
}
