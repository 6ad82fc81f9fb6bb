//! Directory client boundary.
//!
//! The gateway never talks to a concrete directory; it goes through the
//! [`DirectoryClient`] trait. Search, paged enumeration, entry reads, creates
//! and attribute-level changes are all expressed here in terms of
//! [`Resource`] and [`PagingContext`], so a remote directory and the bundled
//! [`InMemoryDirectory`] are interchangeable.
//!
//! # Schema objects
//!
//! Directories describe their own schema with three kinds of objects, whose
//! type and attribute names are exported as constants:
//!
//! * `ObjectTypeDescription` - one per object type, keyed by `Name`
//! * `AttributeTypeDescription` - one per attribute, keyed by `Name`
//! * `BindingDescription` - links an attribute to an object type through
//!   `BoundObjectType` and `BoundAttributeType`

pub mod errors;
pub mod filter;
pub mod in_memory;

pub use errors::ClientError;
pub use filter::PathQuery;
pub use in_memory::InMemoryDirectory;

use crate::paging::PagingContext;
use crate::query::SearchCriteria;
use crate::resource::{Change, Resource};
use std::future::Future;

pub const OBJECT_TYPE_DESCRIPTION: &str = "ObjectTypeDescription";
pub const ATTRIBUTE_TYPE_DESCRIPTION: &str = "AttributeTypeDescription";
pub const BINDING_DESCRIPTION: &str = "BindingDescription";

pub const NAME: &str = "Name";
pub const DISPLAY_NAME: &str = "DisplayName";
pub const DESCRIPTION: &str = "Description";
pub const DATA_TYPE: &str = "DataType";
pub const MULTIVALUED: &str = "Multivalued";
pub const BOUND_OBJECT_TYPE: &str = "BoundObjectType";
pub const BOUND_ATTRIBUTE_TYPE: &str = "BoundAttributeType";
pub const REQUIRED: &str = "Required";

/// One page of an enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedResults {
    pub resources: Vec<Resource>,
    /// Cursor for the next page; `None` once the enumeration is exhausted
    pub paging_context: Option<PagingContext>,
}

impl PagedResults {
    /// A final page with nothing after it.
    pub fn last(resources: Vec<Resource>) -> Self {
        Self {
            resources,
            paging_context: None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.paging_context.is_none()
    }
}

/// Operations the gateway needs from a directory.
///
/// Selections passed to the read operations already include `ObjectID` and
/// `ObjectType`; a selection containing `*` asks for every attribute.
/// Identity attributes are never writable through the change operations.
pub trait DirectoryClient: Send + Sync {
    /// Run a search and return every match in one go.
    fn search(
        &self,
        criteria: &SearchCriteria,
    ) -> impl Future<Output = Result<Vec<Resource>, ClientError>> + Send;

    /// Start an enumeration and return its first page.
    ///
    /// The returned context is present only when more results exist beyond
    /// this page.
    fn search_paged(
        &self,
        criteria: &SearchCriteria,
        page_size: usize,
    ) -> impl Future<Output = Result<PagedResults, ClientError>> + Send;

    /// Continue an enumeration from a previously returned context.
    ///
    /// Fails with [`ClientError::Expired`] once the context's expiry instant
    /// has passed.
    fn pull(
        &self,
        context: &PagingContext,
        page_size: usize,
    ) -> impl Future<Output = Result<PagedResults, ClientError>> + Send;

    /// Fetch one object by identifier.
    fn get_by_id(
        &self,
        id: &str,
        selection: &[String],
    ) -> impl Future<Output = Result<Resource, ClientError>> + Send;

    /// Create an object and return it with its directory-assigned `ObjectID`.
    fn create(&self, resource: Resource)
    -> impl Future<Output = Result<Resource, ClientError>> + Send;

    /// Count the objects matching a filter.
    fn count(&self, filter: &str) -> impl Future<Output = Result<usize, ClientError>> + Send;

    /// Set a single-valued attribute.
    fn replace_value(
        &self,
        id: &str,
        attribute: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Add one value to a multi-valued attribute.
    fn add_value(
        &self,
        id: &str,
        attribute: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Remove one value from an attribute.
    fn remove_value(
        &self,
        id: &str,
        attribute: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Apply a batch of changes to one object as a single request.
    fn apply_changes(
        &self,
        id: &str,
        changes: &[Change],
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Delete an object.
    fn delete(&self, id: &str) -> impl Future<Output = Result<(), ClientError>> + Send;
}
