//! Shared application state for the REST surface.

use crate::directory::DirectoryClient;
use crate::idm_server::IdmServer;
use std::sync::Arc;

/// State handed to every request handler.
///
/// # Type Parameters
///
/// * `C` - The directory client behind the gateway
pub struct AppState<C> {
    server: Arc<IdmServer<C>>,
}

// Manual impl: `C` itself need not be `Clone`.
impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            server: Arc::clone(&self.server),
        }
    }
}

impl<C: DirectoryClient> AppState<C> {
    pub fn new(server: Arc<IdmServer<C>>) -> Self {
        Self { server }
    }

    pub fn server(&self) -> &IdmServer<C> {
        &self.server
    }
}
