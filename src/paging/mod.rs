//! Resumable paging.
//!
//! * [`PagingContext`] - the directory's cursor for an in-flight enumeration
//! * [`etag`] - stores a cursor as an `ETag` directory object whose
//!   `ObjectID` becomes the continuation token
//! * [`EtagSchema`] - makes sure the `ETag` type exists before the first
//!   token is written

pub mod context;
pub mod etag;
pub mod schema;

pub use context::{EnumerationDirection, PagingContext};
pub use etag::ETAG_OBJECT_TYPE;
pub use schema::{EtagSchema, EtagSchemaIds};
