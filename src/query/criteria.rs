//! Search criteria built from REST query parameters.
//!
//! The filter is an opaque path-query string handed to the directory as-is.
//! Only `select`, `sort` and `pageSize` are interpreted here, and all of them
//! are validated before any directory call is made.

use crate::error::{ValidationError, ValidationResult};
use crate::resource::{OBJECT_ID, OBJECT_TYPE};
use std::fmt;

/// Filter matching every object in the directory.
pub const ALL_OBJECTS_FILTER: &str = "/*";

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// One sort key: attribute name plus direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortingAttribute {
    pub attribute_name: String,
    pub ascending: bool,
}

impl SortingAttribute {
    pub fn ascending(attribute_name: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            ascending: true,
        }
    }

    pub fn descending(attribute_name: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            ascending: false,
        }
    }
}

impl fmt::Display for SortingAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.ascending { "True" } else { "False" };
        write!(f, "{}:{}", self.attribute_name, direction)
    }
}

/// Ordered sort keys plus the optional sorting dialect.
///
/// An empty key list means the directory's natural order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sorting {
    pub dialect: Option<String>,
    pub attributes: Vec<SortingAttribute>,
}

impl Sorting {
    pub fn new(attributes: Vec<SortingAttribute>) -> Self {
        Self {
            dialect: None,
            attributes,
        }
    }

    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = Some(dialect.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Normalized search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Opaque path-query filter
    pub filter: String,
    /// Attributes to return besides `ObjectID` and `ObjectType`
    pub selection: Vec<String>,
    /// Sort keys in priority order
    pub sorting: Sorting,
    /// Maximum entries per page
    pub page_size: usize,
}

impl SearchCriteria {
    /// Create criteria for a filter with no selection or sorting.
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            selection: Vec::new(),
            sorting: Sorting::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Criteria matching exactly one object by its identifier.
    pub fn by_id(id: &str, selection: Vec<String>) -> Self {
        Self::new(format!("/*[{}='{}']", OBJECT_ID, id)).with_selection(selection)
    }

    /// Build criteria from the raw `filter`, `select` and `sort` parameters.
    ///
    /// # Example
    /// ```rust
    /// use idm_api::query::{SearchCriteria, SortingAttribute};
    ///
    /// let criteria = SearchCriteria::build(
    ///     Some("/BindingDescription"),
    ///     Some(" BoundObjectType, BoundAttributeType "),
    ///     Some("BoundObjectType:Ascending,BoundAttributeType:Descending"),
    /// ).unwrap();
    ///
    /// assert_eq!(criteria.selection, vec!["BoundObjectType", "BoundAttributeType"]);
    /// assert_eq!(criteria.sorting.attributes[1], SortingAttribute::descending("BoundAttributeType"));
    /// ```
    pub fn build(
        filter: Option<&str>,
        select: Option<&str>,
        sort: Option<&str>,
    ) -> ValidationResult<Self> {
        let filter = match filter.map(str::trim) {
            Some(filter) if !filter.is_empty() => filter.to_string(),
            _ => ALL_OBJECTS_FILTER.to_string(),
        };

        let selection = select.map(parse_select).unwrap_or_default();

        let sorting = match sort {
            Some(sort) if !sort.trim().is_empty() => Sorting::new(parse_sort(sort)?),
            _ => Sorting::default(),
        };

        Ok(Self {
            filter,
            selection,
            sorting,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    pub fn with_selection(mut self, selection: Vec<String>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_sorting(mut self, sorting: Sorting) -> Self {
        self.sorting = sorting;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// The selection sent to the directory: identity attributes first, then
    /// the caller's attributes without repeating the identity pair.
    pub fn effective_selection(&self) -> Vec<String> {
        let mut selection = vec![OBJECT_ID.to_string(), OBJECT_TYPE.to_string()];
        selection.extend(
            self.selection
                .iter()
                .filter(|name| name.as_str() != OBJECT_ID && name.as_str() != OBJECT_TYPE)
                .cloned(),
        );
        selection
    }
}

/// Split a `select` parameter into attribute names.
///
/// Tokens are trimmed and kept in order; empty tokens are dropped and `*` is
/// passed through for the directory to expand.
pub fn parse_select(select: &str) -> Vec<String> {
    select
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a `sort` parameter of `AttributeName:Direction` pairs.
///
/// Only `descending` (any case) sorts descending; every other direction
/// token sorts ascending.
pub fn parse_sort(sort: &str) -> ValidationResult<Vec<SortingAttribute>> {
    sort.split(',')
        .map(|token| {
            let parts: Vec<&str> = token.split(':').map(str::trim).collect();
            match parts.as_slice() {
                [name, direction] if !name.is_empty() => Ok(SortingAttribute {
                    attribute_name: name.to_string(),
                    ascending: !direction.eq_ignore_ascii_case("descending"),
                }),
                _ => Err(ValidationError::malformed_sort(sort)),
            }
        })
        .collect()
}

/// Resolve the `pageSize` parameter.
///
/// Absent means `default`; values above `max` are clamped; zero or
/// non-numeric values are rejected.
pub fn parse_page_size(raw: Option<&str>, default: usize, max: usize) -> ValidationResult<usize> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(default.min(max));
    };

    match raw.parse::<usize>() {
        Ok(0) | Err(_) => Err(ValidationError::InvalidPageSize {
            value: raw.to_string(),
        }),
        Ok(size) => Ok(size.min(max)),
    }
}
