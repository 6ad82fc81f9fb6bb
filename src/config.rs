//! Command line and environment configuration for the `idm-api` server.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `IDM_API_HOST` | 127.0.0.1 | Host to bind |
//! | `IDM_API_PORT` | 8088 | Port to listen on |
//! | `IDM_API_BASE_URL` | http://localhost:8088 | Base of `Location` and `x-idm-next-link` values |
//! | `IDM_API_DEFAULT_PAGE_SIZE` | 50 | Page size when `pageSize` is absent |
//! | `IDM_API_MAX_PAGE_SIZE` | 1000 | Largest page size honoured |
//! | `IDM_API_CURSOR_LIFETIME_SECS` | 3600 | Lifetime of in-memory directory cursors |
//! | `IDM_API_SEED_FILE` | | JSON array of objects loaded at startup |
//! | `IDM_API_LOG_LEVEL` | info | Default log filter |

use crate::idm_server::{DEFAULT_TOKEN_PATH, IdmServerConfig};
use clap::Parser;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "idm-api")]
#[command(about = "REST gateway over an identity directory")]
pub struct ServerConfig {
    /// Host address to bind to.
    #[arg(long, env = "IDM_API_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, env = "IDM_API_PORT", default_value = "8088")]
    pub port: u16,

    /// Externally visible base URL.
    #[arg(long, env = "IDM_API_BASE_URL", default_value = "http://localhost:8088")]
    pub base_url: String,

    /// Page size used when a request does not specify one.
    #[arg(long, env = "IDM_API_DEFAULT_PAGE_SIZE", default_value = "50")]
    pub default_page_size: usize,

    /// Larger requested page sizes are clamped to this value.
    #[arg(long, env = "IDM_API_MAX_PAGE_SIZE", default_value = "1000")]
    pub max_page_size: usize,

    /// How long paging cursors stay valid, in seconds.
    #[arg(long, env = "IDM_API_CURSOR_LIFETIME_SECS", default_value = "3600")]
    pub cursor_lifetime_secs: i64,

    /// JSON file with an array of objects to load into the directory.
    #[arg(long, env = "IDM_API_SEED_FILE")]
    pub seed_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "IDM_API_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8088,
            base_url: "http://localhost:8088".to_string(),
            default_page_size: 50,
            max_page_size: 1000,
            cursor_lifetime_secs: 3600,
            seed_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Gateway settings derived from this configuration.
    pub fn server_config(&self) -> IdmServerConfig {
        IdmServerConfig {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            token_path: DEFAULT_TOKEN_PATH.to_string(),
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        }
    }

    /// Validates the configuration and returns every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }
        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }
        if self.cursor_lifetime_secs <= 0 {
            errors.push("Cursor lifetime must be positive".to_string());
        }
        if let Err(error) = self.server_config().validate() {
            errors.push(error.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.socket_addr(), "127.0.0.1:8088");
        assert_eq!(config.server_config(), IdmServerConfig::default());
    }

    #[test]
    fn test_parse_arguments() {
        let config = ServerConfig::try_parse_from([
            "idm-api",
            "--port",
            "9000",
            "--base-url",
            "https://idm.example.com/",
            "--default-page-size",
            "25",
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.server_config().base_url, "https://idm.example.com");
        assert_eq!(config.server_config().default_page_size, 25);
    }

    #[test]
    fn test_validate_collects_errors() {
        let config = ServerConfig {
            default_page_size: 0,
            cursor_lifetime_secs: 0,
            base_url: "localhost".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().len(), 3);
    }
}
