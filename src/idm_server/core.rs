//! Core gateway structure and initialization.

use crate::directory::DirectoryClient;
use crate::error::{IdmResult, ValidationError};
use crate::idm_server::builder::IdmServerConfig;
use crate::paging::EtagSchema;
use crate::query::parse_page_size;

/// Gateway between REST callers and a directory.
///
/// The server validates requests, projects results, and turns directory
/// cursors into continuation tokens. It owns the token schema guard, so one
/// instance should be shared (behind an `Arc`) by every request handler.
///
/// # Type Parameters
///
/// * `C` - The directory client, see [`DirectoryClient`]
///
/// # Examples
///
/// ```rust
/// use idm_api::{IdmServer, directory::InMemoryDirectory};
/// use idm_api::query::SearchCriteria;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let server = IdmServer::new(InMemoryDirectory::new());
/// let page = server.search(SearchCriteria::new("/*").with_page_size(10), false).await?;
/// assert!(page.next_link.is_none());
/// # Ok(())
/// # }
/// ```
pub struct IdmServer<C> {
    pub(super) client: C,
    pub(super) etag_schema: EtagSchema,
    pub(super) config: IdmServerConfig,
}

impl<C: DirectoryClient> IdmServer<C> {
    /// Create a gateway with the default configuration.
    pub fn new(client: C) -> Self {
        Self::with_config(client, IdmServerConfig::default())
    }

    pub fn with_config(client: C, config: IdmServerConfig) -> Self {
        Self {
            client,
            etag_schema: EtagSchema::new(),
            config,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &IdmServerConfig {
        &self.config
    }

    /// Whether the continuation token schema has been provisioned by this
    /// instance.
    pub fn is_token_schema_ready(&self) -> bool {
        self.etag_schema.is_provisioned()
    }

    /// Resolve a raw `pageSize` parameter against the configured limits.
    pub fn page_size(&self, raw: Option<&str>) -> IdmResult<usize> {
        parse_page_size(raw, self.config.default_page_size, self.config.max_page_size)
            .map_err(Into::into)
    }

    pub(super) fn require_id(id: &str) -> Result<(), ValidationError> {
        if id.trim().is_empty() {
            return Err(ValidationError::custom("object identifier must not be empty"));
        }
        Ok(())
    }
}
