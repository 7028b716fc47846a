//! Catalog domain model.
//!
//! # Responsibility
//! - Define the author/book records mirrored by the `authors`/`books` tables.
//! - Own boundary parsing from raw form strings into create drafts.
//!
//! # Invariants
//! - Records are created, never updated in place.
//! - Every book belongs to exactly one author through `author_id`.

pub mod author;
pub mod book;
pub mod validation;
