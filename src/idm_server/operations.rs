//! Entry operations: reads, counts, creates and attribute-level changes.
//!
//! Each operation validates its input locally, then makes exactly one
//! directory call and maps the client error into [`IdmError`].

use super::core::IdmServer;
use crate::directory::DirectoryClient;
use crate::error::{IdmError, IdmResult, ValidationError};
use crate::query::{SearchCriteria, attribute_document};
use crate::resource::{Change, OBJECT_ID, OBJECT_TYPE, Resource, SELECT_ALL, validate_changes};
use log::{debug, info};
use serde_json::Value;

impl<C: DirectoryClient> IdmServer<C> {
    /// Fetch one entry projected to `selection` plus the identity attributes.
    pub async fn get_resource(&self, id: &str, selection: &[String]) -> IdmResult<Resource> {
        Self::require_id(id)?;
        let selection = SearchCriteria::by_id(id, selection.to_vec()).effective_selection();

        debug!("Reading {} with selection {:?}", id, selection);
        self.client.get_by_id(id, &selection).await.map_err(Into::into)
    }

    /// Render `{ "<attribute>": <value> }` for one attribute of an entry.
    ///
    /// `Ok(None)` means the entry exists but does not carry the attribute.
    pub async fn get_attribute(&self, id: &str, attribute: &str) -> IdmResult<Option<Value>> {
        Self::require_id(id)?;
        let resource = self
            .client
            .get_by_id(
                id,
                &[
                    OBJECT_ID.to_string(),
                    OBJECT_TYPE.to_string(),
                    attribute.to_string(),
                ],
            )
            .await?;

        Ok(attribute_document(&resource, attribute))
    }

    /// Count the entries matching a filter.
    pub async fn count(&self, filter: &str) -> IdmResult<usize> {
        let criteria = SearchCriteria::build(Some(filter), None, None)?;
        let count = self.client.count(&criteria.filter).await?;
        debug!("Counted {} objects for '{}'", count, criteria.filter);
        Ok(count)
    }

    /// Create an entry; the directory assigns its `ObjectID`.
    pub async fn create_resource(&self, resource: Resource) -> IdmResult<Resource> {
        if resource.object_id().is_some() {
            return Err(ValidationError::invalid_entry(
                "ObjectID is assigned by the directory and must not be supplied",
            )
            .into());
        }

        let object_type = resource
            .object_type()
            .ok_or_else(|| ValidationError::invalid_entry("ObjectType is required"))?
            .to_string();

        let created = self.client.create(resource).await?;
        let id = created.object_id().ok_or_else(|| IdmError::RemoteFault {
            message: format!("directory created a {} without an ObjectID", object_type),
        })?;

        info!("Created {} {}", object_type, id);
        Ok(created)
    }

    /// Replace the value of a single-valued attribute.
    pub async fn replace_attribute(&self, id: &str, attribute: &str, value: &str) -> IdmResult<()> {
        Self::require_id(id)?;
        Change::replace(attribute, value).validate()?;

        self.client.replace_value(id, attribute, value).await?;
        info!("Replaced {} on {}", attribute, id);
        Ok(())
    }

    /// Add a value to a multi-valued attribute.
    pub async fn add_attribute_value(&self, id: &str, attribute: &str, value: &str) -> IdmResult<()> {
        Self::require_id(id)?;
        Change::add(attribute, value).validate()?;

        self.client.add_value(id, attribute, value).await?;
        info!("Added a value to {} on {}", attribute, id);
        Ok(())
    }

    /// Remove a value from a multi-valued attribute.
    pub async fn remove_attribute_value(
        &self,
        id: &str,
        attribute: &str,
        value: &str,
    ) -> IdmResult<()> {
        Self::require_id(id)?;
        Change::delete(attribute, value).validate()?;

        self.client.remove_value(id, attribute, value).await?;
        info!("Removed a value from {} on {}", attribute, id);
        Ok(())
    }

    /// Apply a batch of changes as one directory request.
    pub async fn apply_changes(&self, id: &str, changes: &[Change]) -> IdmResult<()> {
        Self::require_id(id)?;
        validate_changes(changes)?;

        self.client.apply_changes(id, changes).await?;
        info!("Applied {} changes to {}", changes.len(), id);
        Ok(())
    }

    pub async fn delete_resource(&self, id: &str) -> IdmResult<()> {
        Self::require_id(id)?;
        self.client.delete(id).await?;
        info!("Deleted {}", id);
        Ok(())
    }

    /// Fetch every attribute of an entry.
    pub async fn get_full_resource(&self, id: &str) -> IdmResult<Resource> {
        self.get_resource(id, &[SELECT_ALL.to_string()]).await
    }
}
