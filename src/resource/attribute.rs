//! Attribute values held by directory entries.
//!
//! Whether an attribute is single- or multi-valued is decided by its type in
//! the directory schema, so the gateway never guesses: it keeps whatever shape
//! the directory returned and only collapses it when rendering JSON.

use crate::error::{ValidationError, ValidationResult};
use serde_json::Value;
use std::fmt;

/// The value(s) of one attribute on an entry.
///
/// Exactly one of the two shapes is populated; there is no "both" state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// A single-valued attribute
    Single(String),
    /// A multi-valued attribute, in the order the directory returned it
    Multi(Vec<String>),
}

impl AttributeValue {
    /// Create a single-valued attribute value.
    pub fn single(value: impl Into<String>) -> Self {
        Self::Single(value.into())
    }

    /// Create a multi-valued attribute value.
    pub fn multi<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Multi(values.into_iter().map(Into::into).collect())
    }

    /// Whether the value came from a multi-valued attribute type.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Self::Multi(_))
    }

    /// All values as a slice, regardless of shape.
    pub fn values(&self) -> &[String] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Multi(values) => values,
        }
    }

    /// Number of values held.
    pub fn len(&self) -> usize {
        self.values().len()
    }

    /// True when a multi-valued attribute has no values.
    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    /// The value when exactly one is held.
    pub fn as_scalar(&self) -> Option<&str> {
        match self.values() {
            [value] => Some(value.as_str()),
            _ => None,
        }
    }

    /// Render as minimal JSON.
    ///
    /// One value renders as a bare string and several as an array, so JSON
    /// consumers never special-case the attribute type. No values renders as
    /// `null`.
    pub fn to_json(&self) -> Value {
        match self.values() {
            [] => Value::Null,
            [value] => Value::String(value.clone()),
            values => Value::Array(values.iter().cloned().map(Value::String).collect()),
        }
    }

    /// Parse a JSON member into an attribute value.
    ///
    /// Strings, numbers and booleans are scalars; arrays of those are
    /// multi-valued. Objects and nested arrays are rejected.
    pub fn from_json(name: &str, value: &Value) -> ValidationResult<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    scalar_to_string(item).ok_or_else(|| {
                        ValidationError::invalid_entry(format!(
                            "attribute '{}' contains a non-scalar value",
                            name
                        ))
                    })
                })
                .collect::<ValidationResult<Vec<_>>>()
                .map(Self::Multi),
            other => scalar_to_string(other).map(Self::Single).ok_or_else(|| {
                ValidationError::invalid_entry(format!(
                    "attribute '{}' must be a string, number, boolean or array",
                    name
                ))
            }),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(value) => write!(f, "{}", value),
            Self::Multi(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::single(value)
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_value_renders_as_scalar() {
        let value = AttributeValue::single("bat");
        assert_eq!(value.to_json(), json!("bat"));
        assert_eq!(value.as_scalar(), Some("bat"));
        assert!(!value.is_multi_valued());
    }

    #[test]
    fn test_multi_value_renders_as_array_in_order() {
        let value = AttributeValue::multi(["fiz", "buz"]);
        assert_eq!(value.to_json(), json!(["fiz", "buz"]));
        assert_eq!(value.as_scalar(), None);
        assert_eq!(value.len(), 2);
    }

    #[test]
    fn test_multi_with_one_value_collapses() {
        let value = AttributeValue::multi(["only"]);
        assert!(value.is_multi_valued());
        assert_eq!(value.to_json(), json!("only"));
    }

    #[test]
    fn test_empty_multi_renders_null() {
        let value = AttributeValue::Multi(Vec::new());
        assert!(value.is_empty());
        assert_eq!(value.to_json(), Value::Null);
    }

    #[test]
    fn test_from_json_shapes() {
        assert_eq!(
            AttributeValue::from_json("a", &json!(42)).unwrap(),
            AttributeValue::single("42")
        );
        assert_eq!(
            AttributeValue::from_json("a", &json!(true)).unwrap(),
            AttributeValue::single("true")
        );
        assert_eq!(
            AttributeValue::from_json("a", &json!(["x", 1])).unwrap(),
            AttributeValue::multi(["x", "1"])
        );
        assert!(AttributeValue::from_json("a", &json!({"nested": 1})).is_err());
        assert!(AttributeValue::from_json("a", &json!([["x"]])).is_err());
        assert!(AttributeValue::from_json("a", &Value::Null).is_err());
    }
}
