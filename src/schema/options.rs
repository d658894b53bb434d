//! Per-model configuration options
//!
//! Options come from an optional JSON object attached to a model definition.
//! Recognized keys:
//! - `db_namespace`: storage namespace label
//! - `private_fields`: fields hidden from public views
//! - `public_fields`: fields exposed in public views
//!
//! A model family (e.g. the schemas of one storage backend) can accept
//! additional option names; their values are kept in [`ModelOptions::extra`].
//! Keys starting with `_` are ignored. Any other key is rejected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::errors::{ModelError, ModelResult};

/// Option names accepted in every options block
pub const KNOWN_OPTIONS: &[&str] = &["db_namespace", "private_fields", "public_fields"];

#[derive(Debug, Default, Deserialize)]
struct OptionsBlock {
    #[serde(default)]
    db_namespace: Option<String>,
    #[serde(default)]
    private_fields: Option<Vec<String>>,
    #[serde(default)]
    public_fields: Option<Vec<String>>,
}

/// Configuration record attached to every model schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelOptions {
    /// Model these options belong to
    pub model: String,
    pub db_namespace: Option<String>,
    pub private_fields: Option<Vec<String>>,
    pub public_fields: Option<Vec<String>>,
    /// Additional option names this model accepts; inherited by derived
    /// schemas
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accepted_extra: Vec<String>,
    /// Values of additional options
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl ModelOptions {
    /// Empty options for a model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Parses an options block for `model` accepting only [`KNOWN_OPTIONS`].
    ///
    /// # Errors
    ///
    /// - `UnknownOption` for a key outside [`KNOWN_OPTIONS`]
    /// - `InvalidOptions` if the block is not an object or a value has the
    ///   wrong type
    pub fn parse(model: &str, block: Option<&Value>) -> ModelResult<Self> {
        Self::parse_with(model, block, &[])
    }

    /// Parses an options block for `model`, also accepting `extra_names`.
    ///
    /// Values of extra names are stored untyped in [`ModelOptions::extra`].
    pub fn parse_with(
        model: &str,
        block: Option<&Value>,
        extra_names: &[String],
    ) -> ModelResult<Self> {
        let mut options = Self::new(model);
        options.accepted_extra = extra_names.to_vec();

        let Some(block) = block else {
            return Ok(options);
        };

        let obj = block.as_object().ok_or_else(|| ModelError::InvalidOptions {
            model: model.to_string(),
            reason: "options block must be an object".into(),
        })?;

        let mut known = Map::new();
        for (key, value) in obj {
            if key.starts_with('_') {
                continue;
            }
            if KNOWN_OPTIONS.contains(&key.as_str()) {
                known.insert(key.clone(), value.clone());
            } else if extra_names.iter().any(|name| name == key) {
                options.extra.insert(key.clone(), value.clone());
            } else {
                return Err(ModelError::UnknownOption {
                    model: model.to_string(),
                    option: key.clone(),
                });
            }
        }

        let parsed: OptionsBlock =
            serde_json::from_value(Value::Object(known)).map_err(|e| {
                ModelError::InvalidOptions {
                    model: model.to_string(),
                    reason: e.to_string(),
                }
            })?;

        options.db_namespace = parsed.db_namespace;
        options.private_fields = parsed.private_fields;
        options.public_fields = parsed.public_fields;
        Ok(options)
    }

    /// Value of an additional option
    pub fn extra(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Returns whether a field appears in a public view
    pub fn is_public(&self, field: &str) -> bool {
        match (&self.public_fields, &self.private_fields) {
            (Some(public), _) => public.iter().any(|f| f == field),
            (None, Some(private)) => !private.iter().any(|f| f == field),
            (None, None) => true,
        }
    }
}
