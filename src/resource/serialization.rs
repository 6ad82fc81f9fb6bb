//! Serde implementations for directory entries.
//!
//! Entries travel as flat JSON objects, see [`Resource::to_json`] and
//! [`Resource::from_json`].

use crate::resource::resource::Resource;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

impl Serialize for Resource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_serialization() {
        let mut resource = Resource::new("Person").with_scalar("DisplayName", "Jane");
        resource.set_object_id("7fb2b853-24f0-4498-9534-4e10589723c4");

        let serialized = serde_json::to_string(&resource).unwrap();
        assert!(serialized.contains("\"ObjectID\":\"7fb2b853-24f0-4498-9534-4e10589723c4\""));
        assert!(serialized.contains("\"DisplayName\":\"Jane\""));
    }

    #[test]
    fn test_resource_deserialization() {
        let resources: Vec<Resource> = serde_json::from_value(json!([
            {"ObjectType": "Person", "ObjectID": "1", "Mail": ["a", "b"]},
            {"ObjectType": "Group", "ObjectID": "2"}
        ]))
        .unwrap();

        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].get_list("Mail").map(<[String]>::len), Some(2));
        assert!(resources[1].is_type("Group"));
    }

    #[test]
    fn test_resource_deserialization_error_is_descriptive() {
        let error = serde_json::from_value::<Resource>(json!({"DisplayName": "x"})).unwrap_err();
        assert!(error.to_string().contains("ObjectType"));
    }
}
