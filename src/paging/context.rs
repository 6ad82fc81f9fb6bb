//! Server-side cursor state for resumable enumerations.

use crate::query::{SearchCriteria, Sorting};
use std::fmt;
use std::str::FromStr;

/// Direction a cursor walks the sorted result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EnumerationDirection {
    #[default]
    Forwards,
    Backwards,
}

impl EnumerationDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnumerationDirection::Forwards => "Forwards",
            EnumerationDirection::Backwards => "Backwards",
        }
    }
}

impl fmt::Display for EnumerationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnumerationDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Forwards" => Ok(EnumerationDirection::Forwards),
            "Backwards" => Ok(EnumerationDirection::Backwards),
            other => Err(format!("unknown enumeration direction '{}'", other)),
        }
    }
}

/// Everything the directory needs to continue an enumeration.
///
/// The context is a plain value: the directory hands one back with each page
/// that has more results after it, and the continuation-token codec stores
/// it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingContext {
    /// Zero-based position of the next entry to return
    pub current_index: usize,
    pub enumeration_direction: EnumerationDirection,
    /// Expiry instant, as the directory formats it
    pub expires: String,
    pub filter: String,
    /// Attributes returned on each page, identity attributes included
    pub selection: Vec<String>,
    pub sorting: Sorting,
}

impl PagingContext {
    /// Start a forward cursor for `criteria` positioned at `current_index`.
    pub fn for_criteria(
        criteria: &SearchCriteria,
        current_index: usize,
        expires: impl Into<String>,
    ) -> Self {
        Self {
            current_index,
            enumeration_direction: EnumerationDirection::Forwards,
            expires: expires.into(),
            filter: criteria.filter.clone(),
            selection: criteria.selection.clone(),
            sorting: criteria.sorting.clone(),
        }
    }

    /// The same cursor moved to a new position.
    pub fn advanced_to(&self, current_index: usize) -> Self {
        Self {
            current_index,
            ..self.clone()
        }
    }

    /// Criteria that re-run the enumeration this cursor belongs to.
    pub fn criteria(&self, page_size: usize) -> SearchCriteria {
        SearchCriteria::new(self.filter.clone())
            .with_selection(self.selection.clone())
            .with_sorting(self.sorting.clone())
            .with_page_size(page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortingAttribute;

    #[test]
    fn test_direction_parsing() {
        assert_eq!(
            "Backwards".parse::<EnumerationDirection>().unwrap(),
            EnumerationDirection::Backwards
        );
        assert_eq!(EnumerationDirection::default().to_string(), "Forwards");
        assert!("forwards".parse::<EnumerationDirection>().is_err());
    }

    #[test]
    fn test_context_from_criteria() {
        let criteria = SearchCriteria::new("/ConstantSpecifier")
            .with_selection(vec!["ObjectID".into(), "ObjectType".into()])
            .with_sorting(Sorting::new(vec![SortingAttribute::ascending("ObjectID")]));

        let context = PagingContext::for_criteria(&criteria, 5, "2026-01-01T00:00:00Z");
        assert_eq!(context.current_index, 5);
        assert_eq!(context.filter, "/ConstantSpecifier");

        let next = context.advanced_to(10);
        assert_eq!(next.current_index, 10);
        assert_eq!(next.expires, context.expires);

        let rerun = next.criteria(5);
        assert_eq!(rerun.sorting, criteria.sorting);
        assert_eq!(rerun.page_size, 5);
    }
}
