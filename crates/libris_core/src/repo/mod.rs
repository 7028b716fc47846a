//! Repository layer for the catalog tables.
//!
//! # Responsibility
//! - Define the catalog data access contract.
//! - Isolate SQLite query details from the service layer.
//!
//! # Invariants
//! - Writes validate drafts before persistence.
//! - A missing row is an `Option`/`bool` outcome, not an error.

pub mod catalog_repo;
