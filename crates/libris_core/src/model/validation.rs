//! Field validation shared by catalog records and form inputs.
//!
//! # Responsibility
//! - Define the single validation error surfaced on create paths.
//! - Provide boundary checks for digit-only fields and ISO dates.
//!
//! # Invariants
//! - Validation never touches storage, except `UnknownAuthor`, which the
//!   repository raises after its existence check.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid digits regex"));

pub(crate) const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Rejected field value on an author/book create path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Author name is empty or whitespace only.
    EmptyAuthorName,
    /// Book title is empty or whitespace only.
    EmptyTitle,
    NonNumericIsbn(String),
    NonNumericYear(String),
    /// Author reference is not a digit string (or overflows an id).
    InvalidAuthorId(String),
    /// Date field is not ISO `YYYY-MM-DD`.
    InvalidDate { field: &'static str, value: String },
    /// Author reference does not resolve to a stored author.
    UnknownAuthor(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAuthorName => write!(f, "author name must not be empty"),
            Self::EmptyTitle => write!(f, "book title must not be empty"),
            Self::NonNumericIsbn(value) => write!(f, "isbn must be numeric, got `{value}`"),
            Self::NonNumericYear(value) => {
                write!(f, "publication year must be numeric, got `{value}`")
            }
            Self::InvalidAuthorId(value) => write!(f, "invalid author id `{value}`"),
            Self::InvalidDate { field, value } => {
                write!(f, "{field} must be a YYYY-MM-DD date, got `{value}`")
            }
            Self::UnknownAuthor(id) => write!(f, "author {id} does not exist"),
        }
    }
}

impl Error for ValidationError {}

/// Returns whether `value` is a non-empty run of ASCII digits.
pub fn is_digit_string(value: &str) -> bool {
    DIGITS_RE.is_match(value)
}

/// Parses an optional ISO date from a form field.
///
/// Blank input means "no date".
pub fn parse_optional_date(
    field: &'static str,
    value: &str,
) -> Result<Option<NaiveDate>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate {
            field,
            value: trimmed.to_string(),
        })
}

/// Formats a date the way it is stored and accepted at the boundary.
pub fn format_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}
