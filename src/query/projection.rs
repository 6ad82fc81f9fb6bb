//! Minimal JSON rendering of entry attributes.

use crate::resource::Resource;
use serde_json::{Map, Value};

/// Render one attribute of an entry.
///
/// Returns `None` when the entry does not carry the attribute. A single value
/// renders as a bare scalar and several values as an array in directory order.
pub fn project_attribute(resource: &Resource, name: &str) -> Option<Value> {
    resource
        .get(name)
        .map(|value| value.to_json())
        .filter(|json| !json.is_null())
}

/// Render `{ "<name>": <value> }` for the attribute endpoint.
pub fn attribute_document(resource: &Resource, name: &str) -> Option<Value> {
    project_attribute(resource, name).map(|value| {
        let mut document = Map::new();
        document.insert(name.to_string(), value);
        Value::Object(document)
    })
}

/// Render a page of entries as a JSON array.
pub fn project_resources(resources: &[Resource]) -> Value {
    Value::Array(resources.iter().map(Resource::to_json).collect())
}
