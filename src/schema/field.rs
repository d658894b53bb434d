//! Field declarations

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::errors::{FieldError, ModelError, ModelResult};
use super::types::{FieldType, Pattern, Violation};

/// A named, typed rule describing one model attribute.
///
/// `name` and `owner_model` are filled in when the declaration is registered
/// on a schema, so declarations can be written once and reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Field data type and constraints
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Whether a value must be present
    #[serde(default)]
    pub required: bool,
    /// Value assigned at construction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Allowed values, checked after the type rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,
    /// Alternate short name for storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimized_field_name: Option<String>,
    /// Alternate internal key; `_id` marks the unique identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniq_field: Option<String>,
    /// Name of the model that owns this declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_model: Option<String>,
}

/// Internal key that marks a field as the model's unique identifier
pub const UNIQUE_ID_KEY: &str = "_id";

impl FieldDef {
    /// Create an optional field of the given type
    pub fn new(field_type: FieldType) -> Self {
        Self {
            name: String::new(),
            field_type,
            required: false,
            default: None,
            choices: None,
            minimized_field_name: None,
            uniq_field: None,
            owner_model: None,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldType::String {
            min_length: None,
            max_length: None,
            regex: None,
        })
    }

    pub fn int() -> Self {
        Self::new(FieldType::Int {
            min_value: None,
            max_value: None,
        })
    }

    pub fn float() -> Self {
        Self::new(FieldType::Float {
            min_value: None,
            max_value: None,
        })
    }

    pub fn bool() -> Self {
        Self::new(FieldType::Bool)
    }

    pub fn uuid() -> Self {
        Self::new(FieldType::Uuid { auto_fill: false })
    }

    /// UUID field that generates a v4 value when none is supplied
    pub fn auto_uuid() -> Self {
        Self::new(FieldType::Uuid { auto_fill: true })
    }

    pub fn datetime() -> Self {
        Self::new(FieldType::DateTime)
    }

    pub fn list(element_type: FieldType) -> Self {
        Self::new(FieldType::List {
            element_type: Box::new(element_type),
            min_size: None,
            max_size: None,
        })
    }

    /// Nested object field; nested declarations take their map key as name
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldDef)>,
        K: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(name, mut field)| {
                field.name = name.into();
                (field.name.clone(), field)
            })
            .collect::<BTreeMap<_, _>>();
        Self::new(FieldType::Object { fields })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn minimized(mut self, short_name: impl Into<String>) -> Self {
        self.minimized_field_name = Some(short_name.into());
        self
    }

    pub fn with_uniq_field(mut self, key: impl Into<String>) -> Self {
        self.uniq_field = Some(key.into());
        self
    }

    /// Attach a regex to a string field.
    ///
    /// # Errors
    ///
    /// `InvalidPattern` if the pattern does not compile or the field is not
    /// a string field.
    pub fn with_regex(mut self, source: &str) -> ModelResult<Self> {
        let compiled = Pattern::new(source).map_err(|e| ModelError::InvalidPattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;
        match &mut self.field_type {
            FieldType::String { regex, .. } => {
                *regex = Some(compiled);
                Ok(self)
            }
            other => Err(ModelError::InvalidPattern {
                pattern: source.to_string(),
                reason: format!("regex requires a string field, not {}", other.type_name()),
            }),
        }
    }

    /// Returns whether this field is the model's unique identifier
    pub fn is_unique_id(&self) -> bool {
        self.uniq_field.as_deref() == Some(UNIQUE_ID_KEY)
    }

    /// Key under which an alternate copy of the value is stored, if any
    pub fn alternate_key(&self) -> Option<&str> {
        self.minimized_field_name
            .as_ref()
            .map(|short| self.uniq_field.as_deref().unwrap_or(short))
    }

    /// Initial value for a fresh instance
    pub fn initial_value(&self) -> Value {
        self.default
            .clone()
            .or_else(|| self.field_type.generated_default())
            .unwrap_or(Value::Null)
    }

    /// Runs the type rule and choices against a value.
    pub(crate) fn check(&self, value: &Value) -> Result<(), Violation> {
        self.field_type.check(value)?;
        if let Some(choices) = &self.choices {
            if !choices.contains(value) {
                return Err(Violation::invalid(
                    value,
                    "Value must be one of the declared choices",
                ));
            }
        }
        Ok(())
    }

    /// Validates a present value against this declaration.
    ///
    /// Failures inside nested objects and lists are reported under their
    /// full path, e.g. `address.city` or `lines[1].sku`.
    pub fn validate(&self, value: &Value) -> Result<(), FieldError> {
        self.check(value)
            .map_err(|violation| violation.into_field_error(&self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builders() {
        let field = FieldDef::int().required().with_default(3);
        assert!(field.required);
        assert_eq!(field.initial_value(), json!(3));
        assert_eq!(FieldDef::string().initial_value(), Value::Null);
    }

    #[test]
    fn test_validate_names_field() {
        let mut field = FieldDef::int();
        field.name = "age".into();
        let err = field.validate(&json!("x")).unwrap_err();
        assert_eq!(err.field(), "age");
        assert_eq!(err.value(), &json!("x"));
        assert!(!err.is_required_missing());
    }

    #[test]
    fn test_choices() {
        let field = FieldDef::string().with_choices(["red", "green"]);
        assert!(field.validate(&json!("red")).is_ok());
        let err = field.validate(&json!("blue")).unwrap_err();
        assert!(err.message().contains("choices"));
    }

    #[test]
    fn test_with_regex() {
        let field = FieldDef::string().with_regex("^[0-9]+$").unwrap();
        assert!(field.validate(&json!("123")).is_ok());
        assert!(field.validate(&json!("12a")).is_err());

        let err = FieldDef::string().with_regex("(").unwrap_err();
        assert!(matches!(err, ModelError::InvalidPattern { ref pattern, .. } if pattern == "("));
        assert!(err.to_string().starts_with("invalid regex '('"));

        let err = FieldDef::int().with_regex("^a").unwrap_err();
        assert!(err.to_string().contains("requires a string field"));
    }

    #[test]
    fn test_alternate_key() {
        assert_eq!(FieldDef::string().alternate_key(), None);
        assert_eq!(FieldDef::string().minimized("n").alternate_key(), Some("n"));
        let id = FieldDef::uuid().minimized("i").with_uniq_field(UNIQUE_ID_KEY);
        assert_eq!(id.alternate_key(), Some("_id"));
        assert!(id.is_unique_id());
    }

    #[test]
    fn test_auto_uuid_initial_value() {
        let value = FieldDef::auto_uuid().initial_value();
        assert!(FieldDef::uuid().validate(&value).is_ok());
    }

    #[test]
    fn test_deserialize_declaration() {
        let field: FieldDef = serde_json::from_value(json!({
            "type": "int",
            "min_value": 0,
            "required": true,
            "default": 1
        }))
        .unwrap();
        assert!(field.required);
        assert_eq!(field.field_type.type_name(), "int");
        assert!(field.validate(&json!(-1)).is_err());
    }

    #[test]
    fn test_object_builder_reports_nested_path() {
        let mut address = FieldDef::object([
            ("city", FieldDef::string().required()),
            ("zip", FieldDef::int()),
        ]);
        address.name = "address".into();

        if let FieldType::Object { fields } = &address.field_type {
            assert_eq!(fields["city"].name, "city");
        } else {
            panic!("expected object field");
        }

        let err = address.validate(&json!({"zip": 1})).unwrap_err();
        assert_eq!(err.field(), "address.city");
        assert!(err.is_required_missing());

        let err = address.validate(&json!({"city": "Oslo", "zip": "x"})).unwrap_err();
        assert_eq!(err.field(), "address.zip");
        assert_eq!(err.value(), &json!("x"));
    }
}
