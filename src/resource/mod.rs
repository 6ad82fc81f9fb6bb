//! Directory entry model.
//!
//! Entries are modelled as one generic [`Resource`] type holding a typed
//! attribute bag. Specialised stored kinds (such as continuation tokens) are
//! not subclasses; they are plain resources with a reserved `ObjectType` and a
//! codec that converts them to and from their domain struct.
//!
//! # Key Components
//!
//! * [`Resource`] - A directory entry with identity and attributes
//! * [`AttributeValue`] - Single or multi-valued attribute contents
//! * [`Change`] - Replace/Add/Delete directive for one attribute

pub mod attribute;
pub mod change;
pub mod resource;
pub mod serialization;

pub use attribute::AttributeValue;
pub use change::{Change, ChangeMode, validate_changes};
pub use resource::{OBJECT_ID, OBJECT_TYPE, Resource, SELECT_ALL};
