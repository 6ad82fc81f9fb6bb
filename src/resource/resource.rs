//! Directory entry representation.
//!
//! A [`Resource`] is a typed attribute bag: attribute names map to an
//! [`AttributeValue`], and the identity attributes `ObjectID` and
//! `ObjectType` live in the same bag with dedicated accessors.

use super::attribute::AttributeValue;
use crate::error::{ValidationError, ValidationResult};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Attribute holding the store-assigned identifier.
pub const OBJECT_ID: &str = "ObjectID";
/// Attribute holding the object type; immutable once created.
pub const OBJECT_TYPE: &str = "ObjectType";
/// Selection token meaning "every attribute the entry has".
pub const SELECT_ALL: &str = "*";

/// A directory entry.
///
/// Once persisted, `ObjectID` and `ObjectType` are always present. An entry
/// returned from a search with a partial selection carries only the selected
/// attributes plus the identity pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    attributes: BTreeMap<String, AttributeValue>,
}

impl Resource {
    /// Create a new, not yet persisted entry of the given type.
    pub fn new(object_type: impl Into<String>) -> Self {
        let mut resource = Self::default();
        resource.set_scalar(OBJECT_TYPE, object_type);
        resource
    }

    /// Parse an entry from its flat JSON representation.
    ///
    /// # Example
    /// ```rust
    /// use idm_api::Resource;
    /// use serde_json::json;
    ///
    /// let person = Resource::from_json(json!({
    ///     "ObjectType": "Person",
    ///     "DisplayName": "Jane Doe",
    ///     "ProxyAddressCollection": ["smtp:jane@example.com", "SMTP:jdoe@example.com"]
    /// })).unwrap();
    ///
    /// assert_eq!(person.object_type(), Some("Person"));
    /// assert_eq!(person.get_list("ProxyAddressCollection").map(|v| v.len()), Some(2));
    /// ```
    pub fn from_json(data: Value) -> ValidationResult<Self> {
        let obj = data
            .as_object()
            .ok_or_else(|| ValidationError::invalid_entry("entry must be a JSON object"))?;

        let mut attributes = BTreeMap::new();
        for (name, value) in obj {
            if value.is_null() {
                continue;
            }
            attributes.insert(name.clone(), AttributeValue::from_json(name, value)?);
        }

        let resource = Self { attributes };
        match resource.object_type() {
            Some(object_type) if !object_type.trim().is_empty() => Ok(resource),
            _ => Err(ValidationError::invalid_entry(
                "'ObjectType' is required and must be a single non-empty value",
            )),
        }
    }

    /// Render the entry as a flat JSON object.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        Value::Object(map)
    }

    /// The store-assigned identifier, if the entry has been persisted.
    pub fn object_id(&self) -> Option<&str> {
        self.get_scalar(OBJECT_ID)
    }

    /// The object type.
    pub fn object_type(&self) -> Option<&str> {
        self.get_scalar(OBJECT_TYPE)
    }

    /// Assign the identifier. Only directory clients should call this.
    pub fn set_object_id(&mut self, id: impl Into<String>) {
        self.set_scalar(OBJECT_ID, id);
    }

    /// Check whether an entry is of the given type.
    pub fn is_type(&self, object_type: &str) -> bool {
        self.object_type() == Some(object_type)
    }

    /// Look up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Look up an attribute expected to hold exactly one value.
    pub fn get_scalar(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttributeValue::as_scalar)
    }

    /// Look up all values of an attribute.
    pub fn get_list(&self, name: &str) -> Option<&[String]> {
        self.get(name).map(AttributeValue::values)
    }

    /// Whether the attribute is present.
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Set a single-valued attribute, replacing any previous value.
    pub fn set_scalar(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes
            .insert(name.into(), AttributeValue::Single(value.into()));
    }

    /// Set a multi-valued attribute, replacing any previous values.
    pub fn set_list<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .insert(name.into(), AttributeValue::multi(values));
    }

    /// Set an attribute to an already-shaped value.
    pub fn set(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(name.into(), value);
    }

    /// Builder form of [`Resource::set_scalar`].
    pub fn with_scalar(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_scalar(name, value);
        self
    }

    /// Builder form of [`Resource::set_list`].
    pub fn with_list<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_list(name, values);
        self
    }

    /// Remove an attribute entirely.
    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.attributes.remove(name)
    }

    /// Append a value to a multi-valued attribute.
    ///
    /// An absent attribute is created as multi-valued; a single value is
    /// promoted to a list.
    pub fn add_value(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.get_mut(name) {
            Some(AttributeValue::Multi(values)) => values.push(value),
            Some(AttributeValue::Single(first)) => {
                let first = std::mem::take(first);
                self.attributes
                    .insert(name.to_string(), AttributeValue::Multi(vec![first, value]));
            }
            None => {
                self.attributes
                    .insert(name.to_string(), AttributeValue::Multi(vec![value]));
            }
        }
    }

    /// Remove one value from a multi-valued attribute.
    ///
    /// Returns `false` when the value was not present.
    pub fn remove_value(&mut self, name: &str, value: &str) -> bool {
        match self.attributes.get_mut(name) {
            Some(AttributeValue::Multi(values)) => {
                let before = values.len();
                values.retain(|v| v != value);
                before != values.len()
            }
            Some(AttributeValue::Single(current)) if current == value => {
                self.attributes.remove(name);
                true
            }
            _ => false,
        }
    }

    /// Iterate over all attributes in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of attributes, identity attributes included.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// True when no attribute is set at all.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Keep only the selected attributes plus the identity pair.
    ///
    /// A `*` anywhere in the selection keeps everything.
    pub fn select(&self, selection: &[String]) -> Self {
        if selection.iter().any(|name| name == SELECT_ALL) {
            return self.clone();
        }

        let attributes = self
            .attributes
            .iter()
            .filter(|(name, _)| {
                name.as_str() == OBJECT_ID
                    || name.as_str() == OBJECT_TYPE
                    || selection.iter().any(|s| s == *name)
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        Self { attributes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_sets_object_type() {
        let resource = Resource::new("Person");
        assert_eq!(resource.object_type(), Some("Person"));
        assert_eq!(resource.object_id(), None);
        assert!(resource.is_type("Person"));
    }

    #[test]
    fn test_from_json_requires_object_type() {
        assert!(Resource::from_json(json!({"DisplayName": "x"})).is_err());
        assert!(Resource::from_json(json!({"ObjectType": ""})).is_err());
        assert!(Resource::from_json(json!({"ObjectType": ["a", "b"]})).is_err());
        assert!(Resource::from_json(json!("Person")).is_err());
    }

    #[test]
    fn test_from_json_skips_nulls() {
        let resource =
            Resource::from_json(json!({"ObjectType": "Person", "Manager": null})).unwrap();
        assert!(!resource.contains("Manager"));
    }

    #[test]
    fn test_json_shape() {
        let resource = Resource::new("Group")
            .with_scalar("DisplayName", "Admins")
            .with_list("ExplicitMember", ["a", "b"]);
        assert_eq!(
            resource.to_json(),
            json!({
                "ObjectType": "Group",
                "DisplayName": "Admins",
                "ExplicitMember": ["a", "b"]
            })
        );
    }

    #[test]
    fn test_add_value_promotes_single() {
        let mut resource = Resource::new("Group").with_scalar("Owner", "a");
        resource.add_value("Owner", "b");
        resource.add_value("Member", "c");
        assert_eq!(
            resource.get("Owner"),
            Some(&AttributeValue::multi(["a", "b"]))
        );
        assert_eq!(resource.get("Member"), Some(&AttributeValue::multi(["c"])));
    }

    #[test]
    fn test_remove_value() {
        let mut resource = Resource::new("Group").with_list("Owner", ["a", "b"]);
        assert!(resource.remove_value("Owner", "a"));
        assert!(!resource.remove_value("Owner", "a"));
        assert_eq!(resource.get_list("Owner"), Some(&["b".to_string()][..]));
    }

    #[test]
    fn test_select_keeps_identity() {
        let mut resource = Resource::new("Person")
            .with_scalar("DisplayName", "Jane")
            .with_scalar("Email", "jane@example.com");
        resource.set_object_id("42");

        let projected = resource.select(&["DisplayName".to_string()]);
        assert_eq!(projected.object_id(), Some("42"));
        assert_eq!(projected.object_type(), Some("Person"));
        assert_eq!(projected.get_scalar("DisplayName"), Some("Jane"));
        assert!(!projected.contains("Email"));

        let everything = resource.select(&[SELECT_ALL.to_string()]);
        assert_eq!(everything, resource);
    }
}
