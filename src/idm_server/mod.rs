//! Gateway orchestrator.
//!
//! # Module Organization
//!
//! * [`core`] - Core IdmServer struct and initialization
//! * [`builder`] - Configuration and builder
//! * [`operations`] - Entry reads, counts, creates and attribute changes
//! * [`paged_search`] - Searches, continuation tokens and resumption

pub mod builder;
pub mod core;
pub mod operations;
pub mod paged_search;

pub use builder::{
    DEFAULT_MAX_PAGE_SIZE, DEFAULT_TOKEN_PATH, IdmServerBuilder, IdmServerConfig, RESOURCES_PATH,
};
pub use core::IdmServer;
pub use paged_search::SearchPage;
