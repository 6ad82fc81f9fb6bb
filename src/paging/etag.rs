//! Continuation-token codec.
//!
//! A continuation token is a directory object of type `ETag` whose
//! attributes hold a serialized [`PagingContext`]. Its `ObjectID` is the
//! opaque token handed to clients.
//!
//! | Attribute              | Contents                                       |
//! |------------------------|------------------------------------------------|
//! | `CurrentIndex`         | decimal cursor position                        |
//! | `EnumerationDirection` | `Forwards` or `Backwards`                      |
//! | `Expires`              | cursor expiry, as reported by the directory    |
//! | `Filter`               | path-query filter                              |
//! | `Select`               | comma separated attribute names                |
//! | `SortingDialect`       | optional sorting dialect                       |
//! | `SortingAttributes`    | comma separated `Name:True`/`Name:False` pairs |

use crate::error::{ValidationError, ValidationResult};
use crate::paging::{EnumerationDirection, PagingContext};
use crate::query::{Sorting, SortingAttribute};
use crate::resource::Resource;

/// Object type of stored continuation tokens.
pub const ETAG_OBJECT_TYPE: &str = "ETag";

pub const CURRENT_INDEX: &str = "CurrentIndex";
pub const ENUMERATION_DIRECTION: &str = "EnumerationDirection";
pub const EXPIRES: &str = "Expires";
pub const FILTER: &str = "Filter";
pub const SELECT: &str = "Select";
pub const SORTING_DIALECT: &str = "SortingDialect";
pub const SORTING_ATTRIBUTES: &str = "SortingAttributes";

/// Token attributes and their directory data types.
pub const ETAG_ATTRIBUTES: [(&str, &str); 7] = [
    (CURRENT_INDEX, "Integer"),
    (ENUMERATION_DIRECTION, "String"),
    (EXPIRES, "String"),
    (FILTER, "String"),
    (SELECT, "String"),
    (SORTING_DIALECT, "String"),
    (SORTING_ATTRIBUTES, "String"),
];

/// Serialize a cursor into an unsaved `ETag` entry.
pub fn encode(context: &PagingContext) -> Resource {
    let sorting_attributes = context
        .sorting
        .attributes
        .iter()
        .map(SortingAttribute::to_string)
        .collect::<Vec<_>>()
        .join(",");

    let mut entry = Resource::new(ETAG_OBJECT_TYPE)
        .with_scalar(CURRENT_INDEX, context.current_index.to_string())
        .with_scalar(ENUMERATION_DIRECTION, context.enumeration_direction.as_str())
        .with_scalar(EXPIRES, context.expires.clone())
        .with_scalar(FILTER, context.filter.clone())
        .with_scalar(SELECT, context.selection.join(","))
        .with_scalar(SORTING_ATTRIBUTES, sorting_attributes);

    if let Some(dialect) = &context.sorting.dialect {
        entry.set_scalar(SORTING_DIALECT, dialect.clone());
    }
    entry
}

/// Rebuild a cursor from a stored `ETag` entry.
///
/// Any missing or malformed attribute makes the token unrecognized.
pub fn decode(entry: &Resource) -> ValidationResult<PagingContext> {
    let token = entry.object_id().unwrap_or("<unsaved>");
    let invalid = |reason: String| ValidationError::unrecognized_token(token, reason);

    if !entry.is_type(ETAG_OBJECT_TYPE) {
        return Err(invalid(format!(
            "object is a {}, not a continuation token",
            entry.object_type().unwrap_or("<untyped>")
        )));
    }

    let required = |name: &str| -> ValidationResult<&str> {
        entry
            .get_scalar(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| invalid(format!("{} is missing", name)))
    };

    let current_index = required(CURRENT_INDEX)?
        .parse::<usize>()
        .map_err(|e| invalid(format!("{} is not a valid index: {}", CURRENT_INDEX, e)))?;

    let enumeration_direction = required(ENUMERATION_DIRECTION)?
        .parse::<EnumerationDirection>()
        .map_err(invalid)?;

    let expires = required(EXPIRES)?.to_string();
    let filter = required(FILTER)?.to_string();

    let selection: Vec<String> = required(SELECT)?
        .split(',')
        .map(|name| name.trim().to_string())
        .collect();
    if selection.iter().any(String::is_empty) {
        return Err(invalid(format!("{} contains an empty attribute name", SELECT)));
    }

    let attributes = required(SORTING_ATTRIBUTES)?
        .split(',')
        .map(|pair| decode_sorting_attribute(pair).ok_or_else(|| {
            invalid(format!("{} entry '{}' is malformed", SORTING_ATTRIBUTES, pair))
        }))
        .collect::<ValidationResult<Vec<_>>>()?;

    let dialect = entry
        .get_scalar(SORTING_DIALECT)
        .map(str::trim)
        .filter(|dialect| !dialect.is_empty())
        .map(str::to_string);

    Ok(PagingContext {
        current_index,
        enumeration_direction,
        expires,
        filter,
        selection,
        sorting: Sorting {
            dialect,
            attributes,
        },
    })
}

fn decode_sorting_attribute(pair: &str) -> Option<SortingAttribute> {
    let (name, ascending) = pair.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let ascending = match ascending.trim() {
        flag if flag.eq_ignore_ascii_case("true") => true,
        flag if flag.eq_ignore_ascii_case("false") => false,
        _ => return None,
    };

    Some(SortingAttribute {
        attribute_name: name.to_string(),
        ascending,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> PagingContext {
        PagingContext {
            current_index: 5,
            enumeration_direction: EnumerationDirection::Forwards,
            expires: "2026-10-16T12:00:00Z".to_string(),
            filter: "/ConstantSpecifier".to_string(),
            selection: vec!["ObjectID".to_string(), "ObjectType".to_string()],
            sorting: Sorting::new(vec![
                SortingAttribute::ascending("SomeGroupingAttribute"),
                SortingAttribute::descending("SomeUniqueAttribute"),
            ]),
        }
    }

    #[test]
    fn test_encode_layout() {
        let entry = encode(&context());
        assert!(entry.is_type(ETAG_OBJECT_TYPE));
        assert_eq!(entry.object_id(), None);
        assert_eq!(entry.get_scalar(CURRENT_INDEX), Some("5"));
        assert_eq!(entry.get_scalar(SELECT), Some("ObjectID,ObjectType"));
        assert_eq!(
            entry.get_scalar(SORTING_ATTRIBUTES),
            Some("SomeGroupingAttribute:True,SomeUniqueAttribute:False")
        );
        assert!(!entry.contains(SORTING_DIALECT));
    }

    #[test]
    fn test_sorting_attributes_survive_round_trip() {
        let original = context();
        let decoded = decode(&encode(&original)).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(
            decoded.sorting.attributes,
            vec![
                SortingAttribute::ascending("SomeGroupingAttribute"),
                SortingAttribute::descending("SomeUniqueAttribute"),
            ]
        );
    }

    #[test]
    fn test_dialect_round_trip() {
        let mut original = context();
        original.sorting = original.sorting.with_dialect("http://www.w3.org/TR/xpath20");
        original.enumeration_direction = EnumerationDirection::Backwards;
        assert_eq!(decode(&encode(&original)).unwrap(), original);
    }

    #[test]
    fn test_flags_are_case_insensitive() {
        let entry = encode(&context()).with_scalar(SORTING_ATTRIBUTES, "A:true,B:FALSE");
        let decoded = decode(&entry).unwrap();
        assert!(decoded.sorting.attributes[0].ascending);
        assert!(!decoded.sorting.attributes[1].ascending);
    }

    #[test]
    fn test_malformed_entries_are_unrecognized() {
        let cases = [
            encode(&context()).with_scalar(CURRENT_INDEX, "five"),
            encode(&context()).with_scalar(ENUMERATION_DIRECTION, "Sideways"),
            encode(&context()).with_scalar(SORTING_ATTRIBUTES, "A:maybe"),
            encode(&context()).with_scalar(SORTING_ATTRIBUTES, "A"),
            encode(&context()).with_scalar(SORTING_ATTRIBUTES, ""),
            encode(&context()).with_scalar(SELECT, "ObjectID,,DisplayName"),
            encode(&context()).with_scalar(FILTER, " "),
        ];

        for entry in cases {
            let error = decode(&entry).unwrap_err();
            assert!(matches!(error, ValidationError::UnrecognizedToken { .. }));
        }

        let mut missing = encode(&context());
        missing.remove(EXPIRES);
        assert!(decode(&missing).is_err());
    }

    #[test]
    fn test_wrong_object_type_is_unrecognized() {
        let mut person = Resource::new("Person");
        person.set_object_id("abc");
        let error = decode(&person).unwrap_err();
        assert!(error.to_string().contains("abc"));
    }
}
