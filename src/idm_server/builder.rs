//! Builder pattern for configuring gateway instances.
//!
//! The configuration controls how continuation links are rendered and how
//! `pageSize` requests are resolved.

use crate::directory::DirectoryClient;
use crate::error::{IdmResult, ValidationError};
use crate::idm_server::IdmServer;
use crate::query::DEFAULT_PAGE_SIZE;

/// Path under which continuation tokens are resolved.
pub const DEFAULT_TOKEN_PATH: &str = "/api/etags";

/// Path under which directory objects are served.
pub const RESOURCES_PATH: &str = "/api/resources";

/// Upper bound applied to caller supplied page sizes.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 1000;

/// Configuration for link generation and paging limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdmServerConfig {
    /// Externally visible base URL, without a trailing slash.
    /// Example: "https://idm.example.com"
    pub base_url: String,

    /// Path prefix for continuation links. Defaults to `/api/etags`.
    pub token_path: String,

    /// Page size used when a request does not specify one.
    pub default_page_size: usize,

    /// Largest page size honoured; larger requests are clamped.
    pub max_page_size: usize,
}

impl Default for IdmServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8088".to_string(),
            token_path: DEFAULT_TOKEN_PATH.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl IdmServerConfig {
    /// Absolute link that resumes an enumeration from a stored token.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use idm_api::IdmServerConfig;
    ///
    /// let config = IdmServerConfig::default();
    /// assert_eq!(
    ///     config.next_link("abc"),
    ///     "http://localhost:8088/api/etags/abc"
    /// );
    /// ```
    pub fn next_link(&self, token: &str) -> String {
        format!("{}{}/{}", self.base_url, self.token_path, token)
    }

    /// Absolute location of a directory object.
    pub fn resource_location(&self, id: &str) -> String {
        format!("{}{}/{}", self.base_url, RESOURCES_PATH, id)
    }

    /// Absolute location of one attribute of a directory object.
    pub fn attribute_location(&self, id: &str, attribute: &str) -> String {
        format!("{}/{}", self.resource_location(id), attribute)
    }

    /// Check the configuration for values that would break paging.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::custom(format!(
                "base URL must start with http:// or https:// (got '{}')",
                self.base_url
            )));
        }
        if !self.token_path.starts_with('/') {
            return Err(ValidationError::custom(format!(
                "token path must start with '/' (got '{}')",
                self.token_path
            )));
        }
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(ValidationError::custom("page sizes must be positive"));
        }
        Ok(())
    }
}

/// Builder for [`IdmServer`] instances.
///
/// # Examples
///
/// ```rust
/// use idm_api::{IdmServerBuilder, directory::InMemoryDirectory};
///
/// let server = IdmServerBuilder::new(InMemoryDirectory::new())
///     .with_base_url("https://idm.example.com/")
///     .with_default_page_size(25)
///     .build()
///     .unwrap();
///
/// assert_eq!(server.config().base_url, "https://idm.example.com");
/// ```
pub struct IdmServerBuilder<C> {
    client: C,
    config: IdmServerConfig,
}

impl<C: DirectoryClient> IdmServerBuilder<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            config: IdmServerConfig::default(),
        }
    }

    /// Set the externally visible base URL; trailing slashes are dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_token_path(mut self, token_path: impl Into<String>) -> Self {
        self.config.token_path = token_path.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_default_page_size(mut self, page_size: usize) -> Self {
        self.config.default_page_size = page_size;
        self
    }

    pub fn with_max_page_size(mut self, page_size: usize) -> Self {
        self.config.max_page_size = page_size;
        self
    }

    /// Build the server after validating the configuration.
    pub fn build(self) -> IdmResult<IdmServer<C>> {
        self.config.validate()?;
        Ok(IdmServer::with_config(self.client, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;

    #[test]
    fn test_links() {
        let config = IdmServerConfig {
            base_url: "https://idm.example.com".to_string(),
            ..IdmServerConfig::default()
        };
        assert_eq!(
            config.next_link("42"),
            "https://idm.example.com/api/etags/42"
        );
        assert_eq!(
            config.attribute_location("42", "DisplayName"),
            "https://idm.example.com/api/resources/42/DisplayName"
        );
    }

    #[test]
    fn test_builder_rejects_bad_config() {
        assert!(
            IdmServerBuilder::new(InMemoryDirectory::new())
                .with_base_url("idm.example.com")
                .build()
                .is_err()
        );
        assert!(
            IdmServerBuilder::new(InMemoryDirectory::new())
                .with_max_page_size(0)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_builder_normalizes_paths() {
        let server = IdmServerBuilder::new(InMemoryDirectory::new())
            .with_token_path("/tokens/")
            .build()
            .unwrap();
        assert_eq!(server.config().next_link("t"), "http://localhost:8088/tokens/t");
    }
}
