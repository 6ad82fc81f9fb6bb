//! In-memory directory implementation.
//!
//! This module provides a thread-safe in-memory implementation of the
//! [`DirectoryClient`] trait, suitable for tests, demos and local
//! development. It behaves like a small identity directory:
//!
//! * Objects get a random `ObjectID` on create
//! * Objects may only be created for known object types, that is the three
//!   schema kinds plus every type with an `ObjectTypeDescription`
//! * Schema objects are unique (by `Name`, or by binding pair)
//! * An enumeration fixes its ordered result set when it starts and pulls
//!   slice that snapshot, so objects created meanwhile (continuation tokens
//!   included) never shift later pages. Objects deleted meanwhile are
//!   skipped. Cursors expire after a configurable lifetime
//! * Filters are evaluated with [`PathQuery`]
//!
//! # Example Usage
//!
//! ```rust
//! use idm_api::directory::{DirectoryClient, InMemoryDirectory};
//! use idm_api::query::SearchCriteria;
//! use idm_api::resource::Resource;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let directory = InMemoryDirectory::with_object_types(["Person"]);
//! let created = directory
//!     .create(Resource::new("Person").with_scalar("DisplayName", "Jane"))
//!     .await?;
//! assert!(created.object_id().is_some());
//!
//! let people = directory.search(&SearchCriteria::new("/Person")).await?;
//! assert_eq!(people.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::directory::{
    ATTRIBUTE_TYPE_DESCRIPTION, BINDING_DESCRIPTION, BOUND_ATTRIBUTE_TYPE, BOUND_OBJECT_TYPE,
    ClientError, DISPLAY_NAME, DirectoryClient, NAME, OBJECT_TYPE_DESCRIPTION, PagedResults,
    PathQuery,
};
use crate::paging::{EnumerationDirection, PagingContext};
use crate::query::{SearchCriteria, Sorting};
use crate::resource::{Change, ChangeMode, OBJECT_ID, OBJECT_TYPE, Resource};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use log::{debug, trace};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cursor lifetime used when none is configured.
pub const DEFAULT_CURSOR_LIFETIME_SECS: i64 = 3600;

const SCHEMA_TYPES: [&str; 3] = [
    OBJECT_TYPE_DESCRIPTION,
    ATTRIBUTE_TYPE_DESCRIPTION,
    BINDING_DESCRIPTION,
];

struct StoredEntry {
    // Insertion order, used as the natural order and as the final tie-break.
    sequence: u64,
    resource: Resource,
}

/// Ordered result set of an enumeration, fixed when it starts.
struct Enumeration {
    filter: String,
    sorting: Sorting,
    object_ids: Vec<String>,
}

impl Enumeration {
    fn answers(&self, criteria: &SearchCriteria) -> bool {
        self.filter == criteria.filter && self.sorting == criteria.sorting
    }
}

#[derive(Default)]
struct DirectoryState {
    entries: HashMap<String, StoredEntry>,
    next_sequence: u64,
    // Keyed by the expiry issued to the enumeration's cursors.
    enumerations: HashMap<String, Enumeration>,
}

impl DirectoryState {
    fn insert(&mut self, mut resource: Resource) -> Resource {
        let id = match resource.object_id() {
            Some(id) => id.to_string(),
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                resource.set_object_id(id.clone());
                id
            }
        };

        self.next_sequence += 1;
        self.entries.insert(
            id,
            StoredEntry {
                sequence: self.next_sequence,
                resource: resource.clone(),
            },
        );
        resource
    }

    fn is_known_type(&self, object_type: &str) -> bool {
        SCHEMA_TYPES.contains(&object_type)
            || self.entries.values().any(|entry| {
                entry.resource.is_type(OBJECT_TYPE_DESCRIPTION)
                    && entry.resource.get_scalar(NAME) == Some(object_type)
            })
    }

    fn register_type(&mut self, object_type: &str) {
        if !self.is_known_type(object_type) {
            debug!("Registering object type '{}'", object_type);
            self.insert(
                Resource::new(OBJECT_TYPE_DESCRIPTION)
                    .with_scalar(NAME, object_type)
                    .with_scalar(DISPLAY_NAME, object_type),
            );
        }
    }

    fn check_unique(&self, resource: &Resource) -> Result<(), ClientError> {
        let collides = |keys: &[&str]| {
            self.entries.values().any(|entry| {
                entry.resource.object_type() == resource.object_type()
                    && keys
                        .iter()
                        .all(|key| entry.resource.get_scalar(key) == resource.get_scalar(key))
            })
        };

        match resource.object_type() {
            Some(OBJECT_TYPE_DESCRIPTION) | Some(ATTRIBUTE_TYPE_DESCRIPTION) => {
                if collides(&[NAME]) {
                    return Err(ClientError::already_exists(format!(
                        "{} '{}'",
                        resource.object_type().unwrap_or_default(),
                        resource.get_scalar(NAME).unwrap_or_default()
                    )));
                }
            }
            Some(BINDING_DESCRIPTION) => {
                if collides(&[BOUND_OBJECT_TYPE, BOUND_ATTRIBUTE_TYPE]) {
                    return Err(ClientError::already_exists(format!(
                        "{} binding {} to {}",
                        BINDING_DESCRIPTION,
                        resource.get_scalar(BOUND_ATTRIBUTE_TYPE).unwrap_or_default(),
                        resource.get_scalar(BOUND_OBJECT_TYPE).unwrap_or_default()
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Every entry matching the filter, in sort order.
    fn matching(&self, filter: &str, sorting: &Sorting) -> Result<Vec<&StoredEntry>, ClientError> {
        let query = PathQuery::parse(filter)?;
        let mut matches: Vec<&StoredEntry> = self
            .entries
            .values()
            .filter(|entry| query.matches(&entry.resource))
            .collect();

        matches.sort_by(|a, b| compare_entries(a, b, sorting));
        Ok(matches)
    }

    fn ordered_ids(&self, filter: &str, sorting: &Sorting) -> Result<Vec<String>, ClientError> {
        Ok(self
            .matching(filter, sorting)?
            .into_iter()
            .filter_map(|entry| entry.resource.object_id().map(str::to_string))
            .collect())
    }

    /// Issue a cursor expiry that no live enumeration uses yet.
    ///
    /// Enumerations past their expiry are dropped first.
    fn issue_expiry(&mut self, lifetime: Duration) -> String {
        let now = Utc::now();
        self.enumerations.retain(|expires, _| expiry_after(expires, now));

        let mut expires_at = now + lifetime;
        let mut expires = format_expiry(expires_at);
        while self.enumerations.contains_key(&expires) {
            expires_at += Duration::microseconds(1);
            expires = format_expiry(expires_at);
        }
        expires
    }

    /// One page of `object_ids`, read in `direction` from `start`.
    fn page(
        &self,
        object_ids: &[String],
        criteria: &SearchCriteria,
        start: usize,
        page_size: usize,
        direction: EnumerationDirection,
        expires: &str,
    ) -> Result<PagedResults, ClientError> {
        if page_size == 0 {
            return Err(ClientError::fault("Page size must be positive"));
        }

        let window: Vec<&String> = match direction {
            EnumerationDirection::Forwards => {
                object_ids.iter().skip(start).take(page_size).collect()
            }
            EnumerationDirection::Backwards => {
                object_ids.iter().rev().skip(start).take(page_size).collect()
            }
        };

        let total = object_ids.len();
        let end = start.saturating_add(window.len());
        let resources = window
            .into_iter()
            .filter_map(|id| self.entries.get(id))
            .map(|entry| entry.resource.select(&criteria.selection))
            .collect();

        trace!(
            "Enumerated {}..{} of {} for '{}'",
            start, end, total, criteria.filter
        );

        let paging_context = (end < total).then(|| PagingContext {
            current_index: end,
            enumeration_direction: direction,
            expires: expires.to_string(),
            filter: criteria.filter.clone(),
            selection: criteria.selection.clone(),
            sorting: criteria.sorting.clone(),
        });

        Ok(PagedResults {
            resources,
            paging_context,
        })
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut StoredEntry, ClientError> {
        self.entries
            .get_mut(id)
            .ok_or_else(|| ClientError::not_found(id))
    }
}

fn sort_key<'a>(resource: &'a Resource, attribute: &str) -> Option<&'a str> {
    resource
        .get(attribute)
        .and_then(|value| value.values().first())
        .map(String::as_str)
}

fn compare_entries(a: &StoredEntry, b: &StoredEntry, sorting: &Sorting) -> Ordering {
    for key in &sorting.attributes {
        let ordering = sort_key(&a.resource, &key.attribute_name)
            .cmp(&sort_key(&b.resource, &key.attribute_name));
        let ordering = if key.ascending {
            ordering
        } else {
            ordering.reverse()
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.sequence.cmp(&b.sequence)
}

fn format_expiry(expires_at: DateTime<Utc>) -> String {
    expires_at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn expiry_after(expires: &str, now: DateTime<Utc>) -> bool {
    DateTime::parse_from_rfc3339(expires)
        .map(|expires| expires.with_timezone(&Utc) > now)
        .unwrap_or(false)
}

fn ensure_writable(attribute: &str) -> Result<(), ClientError> {
    if attribute == OBJECT_ID || attribute == OBJECT_TYPE {
        return Err(ClientError::fault(format!(
            "Attribute '{}' is read-only",
            attribute
        )));
    }
    Ok(())
}

/// Thread-safe in-memory directory.
///
/// Clones share the same underlying data.
#[derive(Clone)]
pub struct InMemoryDirectory {
    state: Arc<RwLock<DirectoryState>>,
    cursor_lifetime: Duration,
}

impl InMemoryDirectory {
    /// Create an empty directory that only knows the schema object types.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(DirectoryState::default())),
            cursor_lifetime: Duration::seconds(DEFAULT_CURSOR_LIFETIME_SECS),
        }
    }

    /// Create a directory with an `ObjectTypeDescription` for each given type.
    pub fn with_object_types<I, S>(object_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = DirectoryState::default();
        for object_type in object_types {
            state.register_type(object_type.as_ref());
        }

        Self {
            state: Arc::new(RwLock::new(state)),
            ..Self::new()
        }
    }

    /// Set how long paging contexts stay valid after an enumeration starts.
    pub fn with_cursor_lifetime(mut self, lifetime: Duration) -> Self {
        self.cursor_lifetime = lifetime;
        self
    }

    pub fn cursor_lifetime(&self) -> Duration {
        self.cursor_lifetime
    }

    /// Load existing objects without going through create rules.
    ///
    /// Objects keep their `ObjectID` if they carry one; their object types
    /// are registered as needed. Returns the number of objects loaded.
    pub async fn seed(&self, resources: Vec<Resource>) -> Result<usize, ClientError> {
        let mut state = self.state.write().await;
        let mut loaded = 0;

        for resource in resources {
            let object_type = resource
                .object_type()
                .ok_or_else(|| ClientError::fault("Seed object has no ObjectType"))?
                .to_string();
            state.register_type(&object_type);
            state.insert(resource);
            loaded += 1;
        }

        debug!("Seeded {} objects", loaded);
        Ok(loaded)
    }

    /// Total number of stored objects, schema objects included.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove every object.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.enumerations.clear();
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryClient for InMemoryDirectory {
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Resource>, ClientError> {
        let state = self.state.read().await;
        let matches = state.matching(&criteria.filter, &criteria.sorting)?;
        Ok(matches
            .into_iter()
            .map(|entry| entry.resource.select(&criteria.selection))
            .collect())
    }

    async fn search_paged(
        &self,
        criteria: &SearchCriteria,
        page_size: usize,
    ) -> Result<PagedResults, ClientError> {
        let mut state = self.state.write().await;
        let object_ids = state.ordered_ids(&criteria.filter, &criteria.sorting)?;
        let expires = state.issue_expiry(self.cursor_lifetime);
        let results = state.page(
            &object_ids,
            criteria,
            0,
            page_size,
            EnumerationDirection::Forwards,
            &expires,
        )?;

        if results.paging_context.is_some() {
            debug!(
                "Started enumeration of {} objects for '{}'",
                object_ids.len(),
                criteria.filter
            );
            state.enumerations.insert(
                expires,
                Enumeration {
                    filter: criteria.filter.clone(),
                    sorting: criteria.sorting.clone(),
                    object_ids,
                },
            );
        }
        Ok(results)
    }

    async fn pull(
        &self,
        context: &PagingContext,
        page_size: usize,
    ) -> Result<PagedResults, ClientError> {
        let expires = DateTime::parse_from_rfc3339(&context.expires).map_err(|e| {
            ClientError::fault(format!(
                "Invalid paging context expiry '{}': {}",
                context.expires, e
            ))
        })?;

        if expires.with_timezone(&Utc) <= Utc::now() {
            return Err(ClientError::Expired {
                expires: context.expires.clone(),
            });
        }

        let criteria = context.criteria(page_size);
        let state = self.state.read().await;

        // A cursor this directory did not issue is served from a fresh query.
        let live;
        let object_ids = match state.enumerations.get(&context.expires) {
            Some(enumeration) if enumeration.answers(&criteria) => &enumeration.object_ids,
            _ => {
                live = state.ordered_ids(&criteria.filter, &criteria.sorting)?;
                &live
            }
        };

        state.page(
            object_ids,
            &criteria,
            context.current_index,
            page_size,
            context.enumeration_direction,
            &context.expires,
        )
    }

    async fn get_by_id(&self, id: &str, selection: &[String]) -> Result<Resource, ClientError> {
        let state = self.state.read().await;
        state
            .entries
            .get(id)
            .map(|entry| entry.resource.select(selection))
            .ok_or_else(|| ClientError::not_found(id))
    }

    async fn create(&self, resource: Resource) -> Result<Resource, ClientError> {
        let object_type = resource
            .object_type()
            .ok_or_else(|| ClientError::fault("ObjectType is required"))?
            .to_string();

        if resource.object_id().is_some() {
            return Err(ClientError::fault("ObjectID is assigned by the directory"));
        }

        let mut state = self.state.write().await;
        if !state.is_known_type(&object_type) {
            return Err(ClientError::fault(format!(
                "Unknown object type '{}'",
                object_type
            )));
        }
        state.check_unique(&resource)?;

        let created = state.insert(resource);
        debug!(
            "Created {} {}",
            object_type,
            created.object_id().unwrap_or_default()
        );
        Ok(created)
    }

    async fn count(&self, filter: &str) -> Result<usize, ClientError> {
        let query = PathQuery::parse(filter)?;
        let state = self.state.read().await;
        Ok(state
            .entries
            .values()
            .filter(|entry| query.matches(&entry.resource))
            .count())
    }

    async fn replace_value(&self, id: &str, attribute: &str, value: &str) -> Result<(), ClientError> {
        ensure_writable(attribute)?;
        let mut state = self.state.write().await;
        state.entry_mut(id)?.resource.set_scalar(attribute, value);
        Ok(())
    }

    async fn add_value(&self, id: &str, attribute: &str, value: &str) -> Result<(), ClientError> {
        ensure_writable(attribute)?;
        let mut state = self.state.write().await;
        state.entry_mut(id)?.resource.add_value(attribute, value);
        Ok(())
    }

    async fn remove_value(&self, id: &str, attribute: &str, value: &str) -> Result<(), ClientError> {
        ensure_writable(attribute)?;
        let mut state = self.state.write().await;
        if !state.entry_mut(id)?.resource.remove_value(attribute, value) {
            return Err(ClientError::fault(format!(
                "Value '{}' is not present on '{}'",
                value, attribute
            )));
        }
        Ok(())
    }

    async fn apply_changes(&self, id: &str, changes: &[Change]) -> Result<(), ClientError> {
        let mut state = self.state.write().await;
        let entry = state.entry_mut(id)?;

        // Work on a copy so a failing change leaves the object untouched.
        let mut updated = entry.resource.clone();
        for change in changes {
            ensure_writable(&change.attribute_name)?;
            if !change.apply_to(&mut updated) && change.mode == ChangeMode::Delete {
                return Err(ClientError::fault(format!(
                    "Value '{}' is not present on '{}'",
                    change.value, change.attribute_name
                )));
            }
        }

        entry.resource = updated;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let mut state = self.state.write().await;
        state
            .entries
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ClientError::not_found(id))
    }
}
