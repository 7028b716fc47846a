//! Author domain model.
//!
//! # Responsibility
//! - Define the persisted author record and its create draft.
//! - Parse raw author form input into a validated draft.
//!
//! # Invariants
//! - `id` is assigned by storage and never reused.
//! - `name` is never blank.
//! - `birth_date`/`date_of_death` ordering is not checked.

use crate::model::validation::{parse_optional_date, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Storage-assigned author identifier.
pub type AuthorId = i64;

/// Persisted author record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Display for Author {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Author: {}", self.name)
    }
}

/// Author fields accepted by `create_author`, before an id exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl NewAuthor {
    /// Creates a draft with no dates.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            birth_date: None,
            date_of_death: None,
        }
    }

    /// Checks field invariants before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyAuthorName);
        }
        Ok(())
    }
}

/// Raw author form input as submitted by a presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorForm {
    pub name: String,
    /// ISO date or blank.
    pub birth_date: String,
    /// ISO date or blank.
    pub date_of_death: String,
}

impl AuthorForm {
    /// Parses and validates form strings into a create draft.
    ///
    /// # Errors
    /// - `EmptyAuthorName` when the trimmed name is empty.
    /// - `InvalidDate` when a non-blank date is not `YYYY-MM-DD`.
    pub fn parse(&self) -> Result<NewAuthor, ValidationError> {
        let draft = NewAuthor {
            name: self.name.trim().to_string(),
            birth_date: parse_optional_date("birth_date", &self.birth_date)?,
            date_of_death: parse_optional_date("date_of_death", &self.date_of_death)?,
        };
        draft.validate()?;
        Ok(draft)
    }
}
