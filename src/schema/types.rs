//! Field type rules
//!
//! Supported types:
//! - string: UTF-8 string with optional length bounds and regex
//! - int: 64-bit integer with optional bounds (floats rejected)
//! - float: any JSON number with optional bounds
//! - bool: Boolean
//! - uuid: hyphenated UUID string, optionally auto-filled
//! - datetime: RFC 3339 timestamp string
//! - list: homogeneous list with element type
//! - object: nested object with its own field mapping

use chrono::DateTime;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::errors::{FieldError, FieldErrorKind};
use super::field::FieldDef;

/// Compiled regular expression compared by its source text
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Pattern)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.as_str())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(serde::de::Error::custom)
    }
}

/// Validation rule attached to a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        regex: Option<Pattern>,
    },
    Int {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_value: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_value: Option<i64>,
    },
    Float {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_value: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_value: Option<f64>,
    },
    Bool,
    Uuid {
        /// Generate a v4 UUID as the default value
        #[serde(default)]
        auto_fill: bool,
    },
    DateTime,
    List {
        element_type: Box<FieldType>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_size: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_size: Option<usize>,
    },
    Object {
        fields: BTreeMap<String, FieldDef>,
    },
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String { .. } => "string",
            FieldType::Int { .. } => "int",
            FieldType::Float { .. } => "float",
            FieldType::Bool => "bool",
            FieldType::Uuid { .. } => "uuid",
            FieldType::DateTime => "datetime",
            FieldType::List { .. } => "list",
            FieldType::Object { .. } => "object",
        }
    }

    /// Value assigned at construction when the field declares no default
    pub fn generated_default(&self) -> Option<Value> {
        match self {
            FieldType::Uuid { auto_fill: true } => Some(Value::String(Uuid::new_v4().to_string())),
            _ => None,
        }
    }

    /// Checks a non-empty value against this rule, descending into list
    /// elements and nested object fields.
    pub fn check(&self, value: &Value) -> Result<(), Violation> {
        self.check_shape(value)
            .map_err(|reason| Violation::invalid(value, reason))?;

        match self {
            FieldType::List { element_type, .. } => {
                for (i, item) in value.as_array().into_iter().flatten().enumerate() {
                    let segment = format!("[{}]", i);
                    if item.is_null() {
                        return Err(Violation::invalid(item, "Null element").at(&segment));
                    }
                    element_type.check(item).map_err(|v| v.at(&segment))?;
                }
            }
            FieldType::Object { fields } => {
                let obj = value.as_object();
                for (name, def) in fields {
                    match obj.and_then(|o| o.get(name)) {
                        Some(inner) if !is_empty_value(inner) => {
                            def.check(inner).map_err(|v| v.at(name))?;
                        }
                        inner if def.required => {
                            let missing = inner.cloned().unwrap_or(Value::Null);
                            return Err(Violation::required_missing(missing).at(name));
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Type and bound checks on the value itself, without recursion
    fn check_shape(&self, value: &Value) -> Result<(), String> {
        match self {
            FieldType::String {
                min_length,
                max_length,
                regex,
            } => {
                let s = value.as_str().ok_or_else(|| mismatch("string", value))?;
                let len = s.chars().count();
                if let Some(min) = min_length {
                    if len < *min {
                        return Err(format!("String value is too short (minimum {})", min));
                    }
                }
                if let Some(max) = max_length {
                    if len > *max {
                        return Err(format!("String value is too long (maximum {})", max));
                    }
                }
                if let Some(pattern) = regex {
                    if !pattern.is_match(s) {
                        return Err(format!("String value did not match regex '{}'", pattern.as_str()));
                    }
                }
            }
            FieldType::Int { min_value, max_value } => {
                // u64 values above i64::MAX still compare correctly as i128
                let n = value
                    .as_i64()
                    .map(i128::from)
                    .or_else(|| value.as_u64().map(i128::from))
                    .ok_or_else(|| mismatch("int", value))?;
                if let Some(min) = min_value {
                    if n < i128::from(*min) {
                        return Err(format!("Int value below min value {}", min));
                    }
                }
                if let Some(max) = max_value {
                    if n > i128::from(*max) {
                        return Err(format!("Int value above max value {}", max));
                    }
                }
            }
            FieldType::Float { min_value, max_value } => {
                let n = value.as_f64().ok_or_else(|| mismatch("float", value))?;
                if let Some(min) = min_value {
                    if n < *min {
                        return Err(format!("Float value below min value {}", min));
                    }
                }
                if let Some(max) = max_value {
                    if n > *max {
                        return Err(format!("Float value above max value {}", max));
                    }
                }
            }
            FieldType::Bool => {
                if !value.is_boolean() {
                    return Err(mismatch("bool", value));
                }
            }
            FieldType::Uuid { .. } => {
                let s = value.as_str().ok_or_else(|| mismatch("uuid", value))?;
                Uuid::parse_str(s).map_err(|e| format!("Not a valid UUID: {}", e))?;
            }
            FieldType::DateTime => {
                let s = value.as_str().ok_or_else(|| mismatch("datetime", value))?;
                DateTime::parse_from_rfc3339(s)
                    .map_err(|e| format!("Not a valid RFC 3339 timestamp: {}", e))?;
            }
            FieldType::List {
                min_size, max_size, ..
            } => {
                let items = value.as_array().ok_or_else(|| mismatch("list", value))?;
                if let Some(min) = min_size {
                    if items.len() < *min {
                        return Err(format!("List has fewer than {} items", min));
                    }
                }
                if let Some(max) = max_size {
                    if items.len() > *max {
                        return Err(format!("List has more than {} items", max));
                    }
                }
            }
            FieldType::Object { .. } => {
                if !value.is_object() {
                    return Err(mismatch("object", value));
                }
            }
        }

        Ok(())
    }
}

/// A rule failure, located relative to the value that was checked.
///
/// `path` is empty when the checked value itself failed, `city` or `[2]`
/// style when a nested object field or list element did.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    kind: FieldErrorKind,
    path: String,
    value: Value,
    reason: String,
}

impl Violation {
    pub(crate) fn invalid(value: &Value, reason: impl Into<String>) -> Self {
        Self {
            kind: FieldErrorKind::InvalidValue,
            path: String::new(),
            value: value.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn required_missing(value: Value) -> Self {
        Self {
            kind: FieldErrorKind::RequiredMissing,
            path: String::new(),
            value,
            reason: "Required field missing".into(),
        }
    }

    /// Prefix the path with an enclosing field name or list index
    fn at(mut self, segment: &str) -> Self {
        self.path = join_path(segment, &self.path);
        self
    }

    pub fn kind(&self) -> FieldErrorKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The value that failed, at `path`
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Converts into a field error for the field named `field`
    pub(crate) fn into_field_error(self, field: &str) -> FieldError {
        let field = join_path(field, &self.path);
        match self.kind {
            FieldErrorKind::RequiredMissing => FieldError::required_missing(field, self.value),
            FieldErrorKind::InvalidValue => FieldError::invalid_value(field, self.value, self.reason),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{}: {}", self.path, self.reason)
        }
    }
}

/// Joins `outer` and a relative path: `outer.inner`, `outer[0]`
pub(crate) fn join_path(outer: &str, rest: &str) -> String {
    if rest.is_empty() {
        outer.to_string()
    } else if outer.is_empty() {
        rest.to_string()
    } else if rest.starts_with('[') {
        format!("{}{}", outer, rest)
    } else {
        format!("{}.{}", outer, rest)
    }
}

/// Null and the empty string count as "no value"
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Like [`is_empty_value`], but whitespace-only strings are empty too
pub fn is_blank_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: &str, actual: &Value) -> String {
    format!("Expected {}, got {}", expected, json_type_name(actual))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn string_type() -> FieldType {
        FieldType::String {
            min_length: None,
            max_length: None,
            regex: None,
        }
    }

    fn int_type() -> FieldType {
        FieldType::Int {
            min_value: None,
            max_value: None,
        }
    }

    fn reason(rule: &FieldType, value: Value) -> String {
        rule.check(&value).unwrap_err().to_string()
    }

    #[test]
    fn test_int_rejects_float_and_string() {
        assert!(int_type().check(&json!(3)).is_ok());
        assert!(int_type().check(&json!(3.5)).is_err());
        assert!(reason(&int_type(), json!("x")).contains("Expected int"));
    }

    #[test]
    fn test_int_bounds_with_large_unsigned() {
        let bounded = FieldType::Int {
            min_value: Some(0),
            max_value: Some(10),
        };
        assert!(bounded.check(&json!(10)).is_ok());
        assert!(bounded.check(&json!(-1)).is_err());
        assert!(bounded.check(&json!(u64::MAX)).is_err());
    }

    #[test]
    fn test_float_accepts_integers() {
        let float = FieldType::Float {
            min_value: Some(0.5),
            max_value: None,
        };
        assert!(float.check(&json!(2)).is_ok());
        assert!(float.check(&json!(0.1)).is_err());
    }

    #[test]
    fn test_string_constraints() {
        let code = FieldType::String {
            min_length: Some(2),
            max_length: Some(4),
            regex: Some(Pattern::new("^[a-z]+$").unwrap()),
        };
        assert!(code.check(&json!("abc")).is_ok());
        assert!(reason(&code, json!("a")).contains("too short"));
        assert!(reason(&code, json!("abcde")).contains("too long"));
        assert!(reason(&code, json!("AB")).contains("regex"));
        assert!(string_type().check(&json!(1)).is_err());
    }

    #[test]
    fn test_uuid_and_datetime() {
        let id = FieldType::Uuid { auto_fill: false };
        assert!(id.check(&json!("67e55044-10b1-426f-9247-bb680e5fe0c8")).is_ok());
        assert!(id.check(&json!("not-a-uuid")).is_err());

        assert!(FieldType::DateTime.check(&json!("2024-05-01T12:00:00Z")).is_ok());
        assert!(FieldType::DateTime.check(&json!("yesterday")).is_err());
    }

    #[test]
    fn test_uuid_auto_fill_generates_default() {
        let generated = FieldType::Uuid { auto_fill: true }.generated_default().unwrap();
        assert!(FieldType::Uuid { auto_fill: false }.check(&generated).is_ok());
        assert!(FieldType::Uuid { auto_fill: false }.generated_default().is_none());
        assert!(FieldType::Bool.generated_default().is_none());
    }

    #[test]
    fn test_list_elements() {
        let tags = FieldType::List {
            element_type: Box::new(string_type()),
            min_size: None,
            max_size: Some(2),
        };
        assert!(tags.check(&json!(["a", "b"])).is_ok());

        let bad = tags.check(&json!(["a", 1])).unwrap_err();
        assert_eq!(bad.path(), "[1]");
        assert_eq!(bad.value(), &json!(1));

        let null = tags.check(&json!(["a", null])).unwrap_err();
        assert!(null.reason().contains("Null"));

        let too_many = tags.check(&json!(["a", "b", "c"])).unwrap_err();
        assert_eq!(too_many.path(), "");
    }

    #[test]
    fn test_nested_object() {
        let mut fields = BTreeMap::new();
        fields.insert("city".to_string(), FieldDef::new(string_type()).required());
        fields.insert("zip".to_string(), FieldDef::new(int_type()));
        let address = FieldType::Object { fields };

        assert!(address.check(&json!({"city": "Oslo"})).is_ok());

        let missing = address.check(&json!({"zip": 1})).unwrap_err();
        assert_eq!(missing.path(), "city");
        assert_eq!(missing.kind(), FieldErrorKind::RequiredMissing);
        assert_eq!(missing.to_string(), "city: Required field missing");

        let bad_zip = address.check(&json!({"city": "Oslo", "zip": "x"})).unwrap_err();
        assert_eq!(bad_zip.path(), "zip");
        assert_eq!(bad_zip.value(), &json!("x"));
    }

    #[test]
    fn test_list_of_objects_path() {
        let mut fields = BTreeMap::new();
        fields.insert("sku".to_string(), FieldDef::new(string_type()).required());
        let lines = FieldType::List {
            element_type: Box::new(FieldType::Object { fields }),
            min_size: None,
            max_size: None,
        };

        let err = lines.check(&json!([{"sku": "a"}, {"qty": 2}])).unwrap_err();
        assert_eq!(err.path(), "[1].sku");
        assert_eq!(err.into_field_error("lines").field(), "lines[1].sku");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("address", ""), "address");
        assert_eq!(join_path("address", "city"), "address.city");
        assert_eq!(join_path("tags", "[0]"), "tags[0]");
        assert_eq!(join_path("", "city"), "city");
    }

    #[test]
    fn test_empty_and_blank() {
        assert!(is_empty_value(&Value::Null));
        assert!(is_empty_value(&json!("")));
        assert!(!is_empty_value(&json!("  ")));
        assert!(is_blank_value(&json!("  ")));
        assert!(!is_blank_value(&json!(0)));
    }

    #[test]
    fn test_deserialize_from_json() {
        let parsed: FieldType =
            serde_json::from_value(json!({"type": "string", "regex": "^a"})).unwrap();
        assert_eq!(parsed.type_name(), "string");
        assert!(parsed.check(&json!("b")).is_err());

        let bad = serde_json::from_value::<FieldType>(json!({"type": "string", "regex": "("}));
        assert!(bad.is_err());

        let list: FieldType = serde_json::from_value(
            json!({"type": "list", "element_type": {"type": "uuid"}}),
        )
        .unwrap();
        assert_eq!(list.type_name(), "list");
    }
}
