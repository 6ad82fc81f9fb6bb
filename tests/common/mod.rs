//! Shared fixtures for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use idm_api::directory::{ClientError, DirectoryClient, InMemoryDirectory, PagedResults};
use idm_api::paging::PagingContext;
use idm_api::query::SearchCriteria;
use idm_api::resource::{Change, Resource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const CONSTANT_SPECIFIER: &str = "ConstantSpecifier";

/// `count` constant specifiers with distinct display names.
pub fn constant_specifiers(count: usize) -> Vec<Resource> {
    (0..count)
        .map(|i| {
            Resource::new(CONSTANT_SPECIFIER)
                .with_scalar("DisplayName", format!("Constant {:03}", i))
                .with_scalar("ConstantValueKey", format!("key-{}", i % 7))
        })
        .collect()
}

pub async fn directory_with_constants(count: usize) -> InMemoryDirectory {
    let directory = InMemoryDirectory::with_object_types([CONSTANT_SPECIFIER, "Person"]);
    directory
        .seed(constant_specifiers(count))
        .await
        .expect("seeding should succeed");
    directory
}

fn is_schema_lookup(filter: &str) -> bool {
    filter.starts_with("/ObjectTypeDescription")
        || filter.starts_with("/AttributeTypeDescription")
        || filter.starts_with("/BindingDescription")
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

/// Directory wrapper that records every call and can simulate a concurrent
/// schema writer by hiding existing schema objects from lookups.
#[derive(Clone)]
pub struct RecordingDirectory<C> {
    inner: C,
    calls: Arc<Mutex<Vec<String>>>,
    stale_schema_lookups: Arc<AtomicUsize>,
    failing_schema_lookups: Arc<AtomicUsize>,
}

impl<C: DirectoryClient> RecordingDirectory<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
            stale_schema_lookups: Arc::new(AtomicUsize::new(0)),
            failing_schema_lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make the next `count` schema lookups report nothing.
    pub fn hide_schema_for(self, count: usize) -> Self {
        self.stale_schema_lookups.store(count, Ordering::SeqCst);
        self
    }

    /// Make the next `count` schema lookups fail as if the directory were down.
    pub fn fail_schema_lookups_for(self, count: usize) -> Self {
        self.failing_schema_lookups.store(count, Ordering::SeqCst);
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_stale_lookup(&self) -> bool {
        take_one(&self.stale_schema_lookups)
    }

    fn take_failing_lookup(&self) -> bool {
        take_one(&self.failing_schema_lookups)
    }
}

impl<C: DirectoryClient> DirectoryClient for RecordingDirectory<C> {
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Resource>, ClientError> {
        self.record(format!("search {}", criteria.filter));
        if is_schema_lookup(&criteria.filter) {
            if self.take_failing_lookup() {
                return Err(ClientError::unavailable("directory connection reset"));
            }
            if self.take_stale_lookup() {
                return Ok(Vec::new());
            }
        }
        self.inner.search(criteria).await
    }

    async fn search_paged(
        &self,
        criteria: &SearchCriteria,
        page_size: usize,
    ) -> Result<PagedResults, ClientError> {
        self.record(format!("search_paged {} {}", criteria.filter, page_size));
        self.inner.search_paged(criteria, page_size).await
    }

    async fn pull(
        &self,
        context: &PagingContext,
        page_size: usize,
    ) -> Result<PagedResults, ClientError> {
        self.record(format!("pull {} {}", context.current_index, page_size));
        self.inner.pull(context, page_size).await
    }

    async fn get_by_id(&self, id: &str, selection: &[String]) -> Result<Resource, ClientError> {
        self.record(format!("get_by_id {}", id));
        self.inner.get_by_id(id, selection).await
    }

    async fn create(&self, resource: Resource) -> Result<Resource, ClientError> {
        self.record(format!(
            "create {}",
            resource.object_type().unwrap_or_default()
        ));
        self.inner.create(resource).await
    }

    async fn count(&self, filter: &str) -> Result<usize, ClientError> {
        self.record(format!("count {}", filter));
        self.inner.count(filter).await
    }

    async fn replace_value(&self, id: &str, attribute: &str, value: &str) -> Result<(), ClientError> {
        self.record(format!("replace_value {} {}", id, attribute));
        self.inner.replace_value(id, attribute, value).await
    }

    async fn add_value(&self, id: &str, attribute: &str, value: &str) -> Result<(), ClientError> {
        self.record(format!("add_value {} {}", id, attribute));
        self.inner.add_value(id, attribute, value).await
    }

    async fn remove_value(&self, id: &str, attribute: &str, value: &str) -> Result<(), ClientError> {
        self.record(format!("remove_value {} {}", id, attribute));
        self.inner.remove_value(id, attribute, value).await
    }

    async fn apply_changes(&self, id: &str, changes: &[Change]) -> Result<(), ClientError> {
        self.record(format!("apply_changes {} {}", id, changes.len()));
        self.inner.apply_changes(id, changes).await
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.record(format!("delete {}", id));
        self.inner.delete(id).await
    }
}

/// Response pieces collected from an in-process request.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body should be JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Drive one request through the router.
pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should not fail");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable")
        .to_vec();

    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn head(uri: &str) -> Request<Body> {
    Request::head(uri).body(Body::empty()).unwrap()
}

pub fn with_json(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Path and query of an absolute link, for replaying it in-process.
pub fn path_of(link: &str) -> &str {
    let without_scheme = link.split_once("://").map(|(_, rest)| rest).unwrap_or(link);
    without_scheme
        .find('/')
        .map(|index| &without_scheme[index..])
        .unwrap_or("/")
}
