//! Book domain model.
//!
//! # Responsibility
//! - Define the persisted book record and its create draft.
//! - Parse raw book form input into a validated draft.
//!
//! # Invariants
//! - `id` is assigned by storage and never reused.
//! - `isbn` is a non-empty digit string; check digits are not verified.
//! - `title` is never blank.
//! - `author_id` references an existing author at write time.

use crate::model::author::AuthorId;
use crate::model::validation::{is_digit_string, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Storage-assigned book identifier.
pub type BookId = i64;

/// Persisted book record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    /// Kept as text so leading zeros survive.
    pub isbn: String,
    pub title: String,
    pub publication_year: i32,
    pub author_id: AuthorId,
}

impl Display for Book {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Book: {}", self.title)
    }
}

/// What remains of a book after it has been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedBook {
    pub id: BookId,
    pub title: String,
}

/// Book fields accepted by `create_book`, before an id exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub publication_year: i32,
    pub author_id: AuthorId,
}

impl NewBook {
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        publication_year: i32,
        author_id: AuthorId,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            publication_year,
            author_id,
        }
    }

    /// Checks field invariants that do not need storage.
    ///
    /// Author resolution is checked by the repository.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_digit_string(&self.isbn) {
            return Err(ValidationError::NonNumericIsbn(self.isbn.clone()));
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(())
    }
}

/// Raw book form input as submitted by a presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub isbn: String,
    pub title: String,
    pub publication_year: String,
    pub author_id: String,
}

impl BookForm {
    /// Parses and validates form strings into a create draft.
    ///
    /// # Errors
    /// - `NonNumericIsbn` / `NonNumericYear` for non-digit input.
    /// - `EmptyTitle` when the trimmed title is empty.
    /// - `InvalidAuthorId` when the author reference is not a digit string.
    pub fn parse(&self) -> Result<NewBook, ValidationError> {
        let isbn = self.isbn.trim();
        if !is_digit_string(isbn) {
            return Err(ValidationError::NonNumericIsbn(isbn.to_string()));
        }

        let year_text = self.publication_year.trim();
        let publication_year = if is_digit_string(year_text) {
            year_text
                .parse::<i32>()
                .map_err(|_| ValidationError::NonNumericYear(year_text.to_string()))?
        } else {
            return Err(ValidationError::NonNumericYear(year_text.to_string()));
        };

        let author_text = self.author_id.trim();
        let author_id = if is_digit_string(author_text) {
            author_text
                .parse::<AuthorId>()
                .map_err(|_| ValidationError::InvalidAuthorId(author_text.to_string()))?
        } else {
            return Err(ValidationError::InvalidAuthorId(author_text.to_string()));
        };

        let draft = NewBook {
            isbn: isbn.to_string(),
            title: self.title.trim().to_string(),
            publication_year,
            author_id,
        };
        draft.validate()?;
        Ok(draft)
    }
}
