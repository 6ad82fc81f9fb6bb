//! Query parameter handling and result projection.
//!
//! [`SearchCriteria::build`] turns the REST `filter`/`select`/`sort`
//! parameters into a normalized search request; [`projection`] turns entries
//! back into minimal JSON.

pub mod criteria;
pub mod projection;

pub use criteria::{
    ALL_OBJECTS_FILTER, DEFAULT_PAGE_SIZE, SearchCriteria, Sorting, SortingAttribute,
    parse_page_size, parse_select, parse_sort,
};
pub use projection::{attribute_document, project_attribute, project_resources};
