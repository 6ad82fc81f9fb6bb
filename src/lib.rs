//! REST gateway over a cursor-based identity directory.
//!
//! Stateless REST requests (`filter`, `select`, `sort`, `pageSize`) are
//! translated into directory searches. Partial results are resumable: the
//! directory's paging cursor is stored as an `ETag` object whose `ObjectID`
//! becomes an opaque continuation token, so an independent later request can
//! pick up the same enumeration.
//!
//! # Core Components
//!
//! - [`IdmServer`] - Orchestrates searches, paging and entry operations
//! - [`DirectoryClient`](directory::DirectoryClient) - Trait for directory backends
//! - [`InMemoryDirectory`](directory::InMemoryDirectory) - Bundled in-memory backend
//! - [`http::create_router`] - axum router exposing the REST surface
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use idm_api::{IdmServer, directory::InMemoryDirectory, http::create_router};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let server = Arc::new(IdmServer::new(InMemoryDirectory::new()));
//! let app = create_router(server);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8088").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod directory;
pub mod error;
pub mod http;
pub mod idm_server;
pub mod paging;
pub mod query;
pub mod resource;

pub use config::ServerConfig;
pub use directory::{ClientError, DirectoryClient, InMemoryDirectory, PagedResults};
pub use error::{IdmError, IdmResult, ValidationError, ValidationResult};
pub use idm_server::{IdmServer, IdmServerBuilder, IdmServerConfig, SearchPage};
pub use paging::{EnumerationDirection, PagingContext};
pub use query::{SearchCriteria, Sorting, SortingAttribute};
pub use resource::{AttributeValue, Change, ChangeMode, Resource};
