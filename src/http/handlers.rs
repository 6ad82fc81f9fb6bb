//! Request handlers.
//!
//! Handlers only translate between HTTP and [`IdmServer`](crate::IdmServer)
//! calls; all validation and directory access happens in the server.

use crate::directory::DirectoryClient;
use crate::error::{IdmError, IdmResult, ValidationError};
use crate::http::state::AppState;
use crate::http::{X_IDM_COUNT, X_IDM_NEXT_LINK};
use crate::idm_server::SearchPage;
use crate::query::{SearchCriteria, parse_select, project_resources};
use crate::resource::{Change, Resource};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use log::debug;
use serde::Deserialize;
use serde_json::Value;

/// Query parameters of `GET /api/resources`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub filter: Option<String>,
    pub select: Option<String>,
    pub sort: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
    #[serde(rename = "doPagedSearch")]
    pub do_paged_search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub filter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SelectParams {
    pub select: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

fn parse_flag(name: &str, raw: Option<&str>) -> Result<bool, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(false),
        Some(flag) if flag.eq_ignore_ascii_case("true") => Ok(true),
        Some(flag) if flag.eq_ignore_ascii_case("false") => Ok(false),
        Some(flag) => Err(ValidationError::custom(format!(
            "{} must be true or false (got '{}')",
            name, flag
        ))),
    }
}

fn header_value(value: &str) -> IdmResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| IdmError::internal(format!("'{}' cannot be sent as a header: {}", value, e)))
}

/// Accept a JSON string, number or boolean as a single attribute value.
fn scalar_body(attribute: &str, body: Value) -> Result<String, ValidationError> {
    match body {
        Value::String(value) => Ok(value),
        Value::Number(value) => Ok(value.to_string()),
        Value::Bool(value) => Ok(value.to_string()),
        _ => Err(ValidationError::InvalidChange {
            attribute: attribute.to_string(),
            message: "request body must be a single JSON scalar".to_string(),
        }),
    }
}

fn page_response(page: SearchPage) -> IdmResult<Response> {
    let mut headers = HeaderMap::new();
    if let Some(link) = &page.next_link {
        headers.insert(HeaderName::from_static(X_IDM_NEXT_LINK), header_value(link)?);
    }

    Ok((
        StatusCode::OK,
        headers,
        Json(project_resources(&page.resources)),
    )
        .into_response())
}

fn created_response(location: &str, body: Option<Value>) -> IdmResult<Response> {
    let headers = [(LOCATION, header_value(location)?)];
    Ok(match body {
        Some(body) => (StatusCode::CREATED, headers, Json(body)).into_response(),
        None => (StatusCode::CREATED, headers).into_response(),
    })
}

/// `GET /api/resources`
pub async fn list_resources<C: DirectoryClient>(
    State(state): State<AppState<C>>,
    Query(params): Query<SearchParams>,
) -> IdmResult<Response> {
    let criteria = SearchCriteria::build(
        params.filter.as_deref(),
        params.select.as_deref(),
        params.sort.as_deref(),
    )?;
    let page_size = state.server().page_size(params.page_size.as_deref())?;
    let resumable = parse_flag("doPagedSearch", params.do_paged_search.as_deref())?;

    debug!(
        "Search '{}' (page size {}, resumable {})",
        criteria.filter, page_size, resumable
    );
    let page = state
        .server()
        .search(criteria.with_page_size(page_size), resumable)
        .await?;
    page_response(page)
}

/// `HEAD /api/resources`
pub async fn count_resources<C: DirectoryClient>(
    State(state): State<AppState<C>>,
    Query(params): Query<FilterParams>,
) -> IdmResult<Response> {
    let filter = params.filter.unwrap_or_default();
    let count = state.server().count(&filter).await?;
    Ok((
        StatusCode::NO_CONTENT,
        [(HeaderName::from_static(X_IDM_COUNT), count.to_string())],
    )
        .into_response())
}

/// `POST /api/resources`
pub async fn create_resource<C: DirectoryClient>(
    State(state): State<AppState<C>>,
    Json(body): Json<Value>,
) -> IdmResult<Response> {
    let resource = Resource::from_json(body)?;
    let created = state.server().create_resource(resource).await?;
    let id = created.object_id().unwrap_or_default();
    created_response(
        &state.server().config().resource_location(id),
        Some(created.to_json()),
    )
}

/// `GET /api/resources/{id}`
pub async fn get_resource<C: DirectoryClient>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Query(params): Query<SelectParams>,
) -> IdmResult<Json<Value>> {
    let selection = params.select.as_deref().map(parse_select).unwrap_or_default();
    let resource = state.server().get_resource(&id, &selection).await?;
    Ok(Json(resource.to_json()))
}

/// `PUT /api/resources/{id}` with a change batch
pub async fn apply_changes<C: DirectoryClient>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Json(changes): Json<Vec<Change>>,
) -> IdmResult<StatusCode> {
    state.server().apply_changes(&id, &changes).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/resources/{id}`
pub async fn delete_resource<C: DirectoryClient>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> IdmResult<StatusCode> {
    state.server().delete_resource(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/resources/{id}/{attribute}`
///
/// An attribute the entry does not carry yields `204 No Content`.
pub async fn get_attribute<C: DirectoryClient>(
    State(state): State<AppState<C>>,
    Path((id, attribute)): Path<(String, String)>,
) -> IdmResult<Response> {
    Ok(match state.server().get_attribute(&id, &attribute).await? {
        Some(document) => Json(document).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// `PUT /api/resources/{id}/{attribute}`
pub async fn replace_attribute<C: DirectoryClient>(
    State(state): State<AppState<C>>,
    Path((id, attribute)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> IdmResult<StatusCode> {
    let value = scalar_body(&attribute, body)?;
    state
        .server()
        .replace_attribute(&id, &attribute, &value)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/resources/{id}/{attribute}`
pub async fn add_attribute_value<C: DirectoryClient>(
    State(state): State<AppState<C>>,
    Path((id, attribute)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> IdmResult<Response> {
    let value = scalar_body(&attribute, body)?;
    state
        .server()
        .add_attribute_value(&id, &attribute, &value)
        .await?;
    created_response(
        &state.server().config().attribute_location(&id, &attribute),
        None,
    )
}

/// `DELETE /api/resources/{id}/{attribute}`
pub async fn remove_attribute_value<C: DirectoryClient>(
    State(state): State<AppState<C>>,
    Path((id, attribute)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> IdmResult<StatusCode> {
    let value = scalar_body(&attribute, body)?;
    state
        .server()
        .remove_attribute_value(&id, &attribute, &value)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/etags/{token}`
pub async fn resume_search<C: DirectoryClient>(
    State(state): State<AppState<C>>,
    Path(token): Path<String>,
    Query(params): Query<PageParams>,
) -> IdmResult<Response> {
    let page_size = state.server().page_size(params.page_size.as_deref())?;
    let page = state.server().resume(&token, page_size).await?;
    page_response(page)
}
