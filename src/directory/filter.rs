//! Path-query matching for the in-memory directory.
//!
//! Only a small subset of the XPath-like filter language is understood:
//!
//! ```text
//! /*                                   every object
//! /Person                              every object of one type
//! /Person[AccountName='jdoe']          equality on one attribute
//! /*[A='x' and B="y"]                  conjunction of equalities
//! ```
//!
//! Anything else is rejected the way a real directory rejects a filter it
//! cannot evaluate: with a remote fault.

use crate::directory::ClientError;
use crate::resource::Resource;

/// One `Attribute='value'` test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub attribute: String,
    pub value: String,
}

/// A parsed filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    /// `None` for `/*`
    pub object_type: Option<String>,
    pub predicates: Vec<Predicate>,
}

impl PathQuery {
    pub fn parse(filter: &str) -> Result<Self, ClientError> {
        let unsupported = || ClientError::fault(format!("Unsupported filter: {}", filter));

        let rest = filter.trim().strip_prefix('/').ok_or_else(unsupported)?;
        let (type_part, predicate_part) = match rest.find('[') {
            Some(index) => (&rest[..index], Some(&rest[index..])),
            None => (rest, None),
        };

        let object_type = match type_part.trim() {
            "*" => None,
            name if is_name(name) => Some(name.to_string()),
            _ => return Err(unsupported()),
        };

        let predicates = match predicate_part {
            None => Vec::new(),
            Some(part) => {
                let inner = part
                    .strip_prefix('[')
                    .and_then(|part| part.strip_suffix(']'))
                    .ok_or_else(unsupported)?;
                parse_predicates(inner).ok_or_else(unsupported)?
            }
        };

        Ok(Self {
            object_type,
            predicates,
        })
    }

    pub fn matches(&self, resource: &Resource) -> bool {
        if let Some(object_type) = &self.object_type {
            if !resource.is_type(object_type) {
                return false;
            }
        }

        self.predicates.iter().all(|predicate| {
            resource
                .get(&predicate.attribute)
                .map(|value| value.values().iter().any(|v| v == &predicate.value))
                .unwrap_or(false)
        })
    }
}

fn is_name(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn parse_predicates(input: &str) -> Option<Vec<Predicate>> {
    let mut predicates = Vec::new();
    let mut rest = input.trim_start();

    loop {
        let eq = rest.find('=')?;
        let attribute = rest[..eq].trim();
        if !is_name(attribute) {
            return None;
        }

        let after = rest[eq + 1..].trim_start();
        let quote = after.chars().next().filter(|c| *c == '\'' || *c == '"')?;
        let body = &after[1..];
        let close = body.find(quote)?;

        predicates.push(Predicate {
            attribute: attribute.to_string(),
            value: body[..close].to_string(),
        });

        rest = body[close + 1..].trim_start();
        if rest.is_empty() {
            return Some(predicates);
        }

        rest = rest.strip_prefix("and")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        rest = rest.trim_start();
    }
}
