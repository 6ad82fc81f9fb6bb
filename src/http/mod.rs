//! REST surface built on axum.
//!
//! # Routes
//!
//! - `GET    /api/resources` - search (`filter`, `select`, `sort`, `pageSize`, `doPagedSearch`)
//! - `HEAD   /api/resources` - count (`filter`), reported in `x-idm-count`
//! - `POST   /api/resources` - create
//! - `GET    /api/resources/{id}` - read (`select`)
//! - `PUT    /api/resources/{id}` - apply a change batch
//! - `DELETE /api/resources/{id}` - delete
//! - `GET    /api/resources/{id}/{attribute}` - read one attribute
//! - `PUT    /api/resources/{id}/{attribute}` - replace a single value
//! - `POST   /api/resources/{id}/{attribute}` - add a value
//! - `DELETE /api/resources/{id}/{attribute}` - remove a value
//! - `GET    /api/etags/{token}` - resume a paged search (`pageSize`)

pub mod error;
pub mod handlers;
pub mod state;

pub use state::AppState;

use crate::directory::DirectoryClient;
use crate::idm_server::{IdmServer, RESOURCES_PATH};
use axum::Router;
use axum::routing::get;
use std::sync::Arc;

/// Header carrying the continuation link of a partial page.
pub const X_IDM_NEXT_LINK: &str = "x-idm-next-link";

/// Header carrying the result of a count request.
pub const X_IDM_COUNT: &str = "x-idm-count";

/// Build the router for a gateway.
///
/// The token route follows the server's configured token path.
pub fn create_router<C>(server: Arc<IdmServer<C>>) -> Router
where
    C: DirectoryClient + 'static,
{
    let token_route = format!("{}/{{token}}", server.config().token_path);
    let state = AppState::new(server);

    Router::new()
        .route(
            RESOURCES_PATH,
            get(handlers::list_resources::<C>)
                .head(handlers::count_resources::<C>)
                .post(handlers::create_resource::<C>),
        )
        .route(
            &format!("{}/{{id}}", RESOURCES_PATH),
            get(handlers::get_resource::<C>)
                .put(handlers::apply_changes::<C>)
                .delete(handlers::delete_resource::<C>),
        )
        .route(
            &format!("{}/{{id}}/{{attribute}}", RESOURCES_PATH),
            get(handlers::get_attribute::<C>)
                .put(handlers::replace_attribute::<C>)
                .post(handlers::add_attribute_value::<C>)
                .delete(handlers::remove_attribute_value::<C>),
        )
        .route(&token_route, get(handlers::resume_search::<C>))
        .with_state(state)
}
