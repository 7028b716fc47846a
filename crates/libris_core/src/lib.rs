//! Core catalog logic for Libris.
//! This crate is the single source of truth for catalog invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{CatalogConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::author::{Author, AuthorForm, AuthorId, NewAuthor};
pub use model::book::{Book, BookForm, BookId, NewBook, RemovedBook};
pub use model::validation::ValidationError;
pub use repo::catalog_repo::{CatalogRepository, RepoError, RepoResult, SqliteCatalogRepository};
pub use service::catalog_service::{
    CatalogEntry, CatalogError, CatalogResult, CatalogService, SearchOutcome, SearchStatus,
    SortKey,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
