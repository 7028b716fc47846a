//! Catalog use-case service.
//!
//! # Responsibility
//! - Turn presentation requests into repository calls.
//! - Shape results (sorted listings, search outcomes) for rendering.
//!
//! # Invariants
//! - Storage faults leave this layer wrapped as `CatalogError::Storage`.
//! - A search miss is `SearchStatus::NotFound`, never an error.
//! - Sorting by author name fails as a whole when any author is unresolved.

use crate::model::author::{Author, AuthorForm, AuthorId};
use crate::model::book::{Book, BookForm, BookId, RemovedBook};
use crate::model::validation::ValidationError;
use crate::repo::catalog_repo::{CatalogRepository, RepoError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Instant;

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum CatalogError {
    /// Rejected create input.
    Validation(ValidationError),
    /// Lookup by id missed.
    NotFound { entity: &'static str, id: i64 },
    /// A book references an author that does not exist.
    UnresolvedAuthor { book_id: BookId, author_id: AuthorId },
    InvalidSortKey(String),
    /// Persistence-layer failure.
    Storage(RepoError),
}

impl CatalogError {
    /// Returns whether the error is caused by caller input rather than storage.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound { .. } | Self::InvalidSortKey(_)
        )
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::UnresolvedAuthor { book_id, author_id } => write!(
                f,
                "book {book_id} references missing author {author_id}"
            ),
            Self::InvalidSortKey(key) => write!(
                f,
                "unsupported sort key `{key}`; expected title|author|year"
            ),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for CatalogError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Storage(other),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Ordering applied by [`CatalogService::get_sorted_books`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Title,
    AuthorName,
    PublicationYear,
}

impl SortKey {
    /// Parses an optional request parameter; missing or blank means `Title`.
    pub fn from_param(value: Option<&str>) -> CatalogResult<Self> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::Title),
            Some(text) => text.parse(),
        }
    }
}

impl FromStr for SortKey {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "author" | "author_name" => Ok(Self::AuthorName),
            "year" | "publication_year" => Ok(Self::PublicationYear),
            _ => Err(CatalogError::InvalidSortKey(value.to_string())),
        }
    }
}

/// A book paired with its author, when the reference resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub book: Book,
    pub author: Option<Author>,
}

impl CatalogEntry {
    /// Author display name, if resolved.
    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().map(|author| author.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Found,
    NotFound,
}

/// Title search result envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub query: String,
    pub status: SearchStatus,
    pub entries: Vec<CatalogEntry>,
}

impl SearchOutcome {
    pub fn is_not_found(&self) -> bool {
        self.status == SearchStatus::NotFound
    }
}

/// Catalog service facade over a repository handle.
pub struct CatalogService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    /// Creates a service over an explicitly constructed repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists every book with its author, in storage order.
    pub fn list_catalog(&self) -> CatalogResult<Vec<CatalogEntry>> {
        let started_at = Instant::now();
        let books = self.repo.list_books()?;
        let entries = self.attach_authors(books)?;
        info!(
            "event=catalog_list module=service status=ok count={} duration_ms={}",
            entries.len(),
            started_at.elapsed().as_millis()
        );
        Ok(entries)
    }

    /// Lists every book ordered ascending by `key`.
    ///
    /// Sorting is stable, so equal keys keep id order.
    ///
    /// # Errors
    /// - `UnresolvedAuthor` when `key` is `AuthorName` and a book's author
    ///   does not resolve.
    pub fn get_sorted_books(&self, key: SortKey) -> CatalogResult<Vec<CatalogEntry>> {
        let started_at = Instant::now();
        let books = self.repo.list_books()?;
        let mut entries = self.attach_authors(books)?;

        match key {
            SortKey::Title => entries.sort_by(|a, b| a.book.title.cmp(&b.book.title)),
            SortKey::PublicationYear => {
                entries.sort_by_key(|entry| entry.book.publication_year)
            }
            SortKey::AuthorName => {
                if let Some(dangling) = entries.iter().find(|entry| entry.author.is_none()) {
                    warn!(
                        "event=catalog_sort module=service status=error key=author_name error_code=unresolved_author book_id={} author_id={}",
                        dangling.book.id, dangling.book.author_id
                    );
                    return Err(CatalogError::UnresolvedAuthor {
                        book_id: dangling.book.id,
                        author_id: dangling.book.author_id,
                    });
                }
                entries.sort_by(|a, b| a.author_name().cmp(&b.author_name()));
            }
        }

        info!(
            "event=catalog_sort module=service status=ok key={key:?} count={} duration_ms={}",
            entries.len(),
            started_at.elapsed().as_millis()
        );
        Ok(entries)
    }

    /// Finds books whose title contains `query`.
    pub fn search_books(&self, query: &str) -> CatalogResult<SearchOutcome> {
        let books = self.repo.find_books_by_title_substring(query)?;
        let entries = self.attach_authors(books)?;
        let status = if entries.is_empty() {
            SearchStatus::NotFound
        } else {
            SearchStatus::Found
        };
        info!(
            "event=catalog_search module=service status=ok result={status:?} count={}",
            entries.len()
        );

        Ok(SearchOutcome {
            query: query.to_string(),
            status,
            entries,
        })
    }

    pub fn list_authors(&self) -> CatalogResult<Vec<Author>> {
        Ok(self.repo.list_authors()?)
    }

    pub fn get_author(&self, id: AuthorId) -> CatalogResult<Author> {
        self.repo
            .get_author(id)?
            .ok_or(CatalogError::NotFound {
                entity: "author",
                id,
            })
    }

    pub fn get_book(&self, id: BookId) -> CatalogResult<Book> {
        self.repo
            .get_book(id)?
            .ok_or(CatalogError::NotFound { entity: "book", id })
    }

    /// Validates raw author input and persists it.
    pub fn add_author(&self, form: &AuthorForm) -> CatalogResult<Author> {
        let draft = form.parse().inspect_err(|err| {
            warn!("event=author_create module=service status=rejected error={err}");
        })?;
        let author = self.repo.create_author(&draft)?;
        info!(
            "event=author_create module=service status=ok author_id={}",
            author.id
        );
        Ok(author)
    }

    /// Validates raw book input and persists it.
    ///
    /// # Errors
    /// - `Validation(UnknownAuthor)` when the author reference does not resolve.
    pub fn add_book(&self, form: &BookForm) -> CatalogResult<Book> {
        let result = form
            .parse()
            .map_err(CatalogError::from)
            .and_then(|draft| Ok(self.repo.create_book(&draft)?));

        match &result {
            Ok(book) => info!(
                "event=book_create module=service status=ok book_id={} author_id={}",
                book.id, book.author_id
            ),
            Err(err) => warn!("event=book_create module=service status=rejected error={err}"),
        }
        result
    }

    /// Removes one book, or returns `None` when it did not exist.
    ///
    /// Works for rows that fail to decode, since only id and title come back.
    pub fn remove_book(&self, id: BookId) -> CatalogResult<Option<RemovedBook>> {
        let removed = self.repo.take_book(id)?;
        let status = if removed.is_some() { "ok" } else { "missing" };
        info!("event=book_delete module=service status={status} book_id={id}");
        Ok(removed)
    }

    fn attach_authors(&self, books: Vec<Book>) -> CatalogResult<Vec<CatalogEntry>> {
        let authors: HashMap<AuthorId, Author> = self
            .repo
            .list_authors()?
            .into_iter()
            .map(|author| (author.id, author))
            .collect();

        Ok(books
            .into_iter()
            .map(|book| {
                let author = authors.get(&book.author_id).cloned();
                CatalogEntry { book, author }
            })
            .collect())
    }
}
