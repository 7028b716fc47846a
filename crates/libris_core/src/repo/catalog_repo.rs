//! Catalog repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide list/search/create/delete over `authors` and `books`.
//! - Keep SQL details inside the storage boundary.
//!
//! # Invariants
//! - Write paths call `validate()` on drafts before SQL mutations.
//! - `create_book` rejects author references that do not resolve.
//! - Read paths reject undecodable persisted rows instead of masking them.
//! - Every mutation commits on its own; no cross-call transaction exists.

use crate::db::DbError;
use crate::model::author::{Author, AuthorId, NewAuthor};
use crate::model::book::{Book, BookId, NewBook, RemovedBook};
use crate::model::validation::{format_date, is_digit_string, ValidationError, ISO_DATE_FORMAT};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const AUTHOR_SELECT_SQL: &str = "SELECT id, name, birth_date, date_of_death FROM authors";
const BOOK_SELECT_SQL: &str =
    "SELECT id, isbn, title, publication_year, author_id FROM books";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    /// A stored row could not be decoded into a domain record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for the author/book catalog.
pub trait CatalogRepository {
    fn list_books(&self) -> RepoResult<Vec<Book>>;
    /// Title substring match; an empty needle matches every book.
    fn find_books_by_title_substring(&self, needle: &str) -> RepoResult<Vec<Book>>;
    fn list_books_by_author(&self, author_id: AuthorId) -> RepoResult<Vec<Book>>;
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn list_authors(&self) -> RepoResult<Vec<Author>>;
    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>>;
    fn create_author(&self, author: &NewAuthor) -> RepoResult<Author>;
    fn create_book(&self, book: &NewBook) -> RepoResult<Book>;
    /// Returns `false` when no book had this id.
    fn delete_book(&self, id: BookId) -> RepoResult<bool>;
    /// Deletes one book and reports what was removed, in one statement.
    ///
    /// Only `id` and `title` are read back, so rows with undecodable
    /// fields can still be removed.
    fn take_book(&self, id: BookId) -> RepoResult<Option<RemovedBook>>;
    /// Returns `false` when no author had this id. Cascades to the author's books.
    fn delete_author(&self, id: AuthorId) -> RepoResult<bool>;
}

/// SQLite-backed catalog repository.
///
/// Borrows a connection produced by [`crate::db::open_db`], so foreign keys
/// and schema are already in place.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_books(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Book>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut books = Vec::new();

        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }

        Ok(books)
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn list_books(&self) -> RepoResult<Vec<Book>> {
        self.query_books(&format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn find_books_by_title_substring(&self, needle: &str) -> RepoResult<Vec<Book>> {
        let pattern = format!("%{}%", escape_like(needle));
        self.query_books(
            &format!("{BOOK_SELECT_SQL} WHERE title LIKE ?1 ESCAPE '\\' ORDER BY id ASC;"),
            [pattern],
        )
    }

    fn list_books_by_author(&self, author_id: AuthorId) -> RepoResult<Vec<Book>> {
        self.query_books(
            &format!("{BOOK_SELECT_SQL} WHERE author_id = ?1 ORDER BY id ASC;"),
            [author_id],
        )
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut books =
            self.query_books(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"), [id])?;
        Ok(books.pop())
    }

    fn list_authors(&self) -> RepoResult<Vec<Author>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AUTHOR_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut authors = Vec::new();

        while let Some(row) = rows.next()? {
            authors.push(parse_author_row(row)?);
        }

        Ok(authors)
    }

    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AUTHOR_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_author_row(row)?));
        }

        Ok(None)
    }

    fn create_author(&self, author: &NewAuthor) -> RepoResult<Author> {
        author.validate()?;

        self.conn.execute(
            "INSERT INTO authors (name, birth_date, date_of_death) VALUES (?1, ?2, ?3);",
            params![
                author.name.as_str(),
                author.birth_date.map(format_date),
                author.date_of_death.map(format_date),
            ],
        )?;

        Ok(Author {
            id: self.conn.last_insert_rowid(),
            name: author.name.clone(),
            birth_date: author.birth_date,
            date_of_death: author.date_of_death,
        })
    }

    fn create_book(&self, book: &NewBook) -> RepoResult<Book> {
        book.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let author_exists = tx
            .query_row(
                "SELECT 1 FROM authors WHERE id = ?1;",
                [book.author_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .is_some();
        if !author_exists {
            return Err(ValidationError::UnknownAuthor(book.author_id).into());
        }

        tx.execute(
            "INSERT INTO books (isbn, title, publication_year, author_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                book.isbn.as_str(),
                book.title.as_str(),
                book.publication_year,
                book.author_id,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Book {
            id,
            isbn: book.isbn.clone(),
            title: book.title.clone(),
            publication_year: book.publication_year,
            author_id: book.author_id,
        })
    }

    fn delete_book(&self, id: BookId) -> RepoResult<bool> {
        let changed = self.conn.execute("DELETE FROM books WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn take_book(&self, id: BookId) -> RepoResult<Option<RemovedBook>> {
        let removed = self
            .conn
            .query_row(
                "DELETE FROM books WHERE id = ?1 RETURNING id, title;",
                [id],
                |row| {
                    Ok(RemovedBook {
                        id: row.get("id")?,
                        title: row.get("title")?,
                    })
                },
            )
            .optional()?;
        Ok(removed)
    }

    fn delete_author(&self, id: AuthorId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM authors WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn parse_author_row(row: &Row<'_>) -> RepoResult<Author> {
    let id: AuthorId = row.get("id")?;
    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty name in authors.name for id {id}"
        )));
    }

    Ok(Author {
        id,
        name,
        birth_date: parse_stored_date(row, "birth_date")?,
        date_of_death: parse_stored_date(row, "date_of_death")?,
    })
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let id: BookId = row.get("id")?;
    let isbn: String = row.get("isbn")?;
    if !is_digit_string(&isbn) {
        return Err(RepoError::InvalidData(format!(
            "invalid isbn `{isbn}` in books.isbn for id {id}"
        )));
    }

    let stored_year: i64 = row.get("publication_year")?;
    let publication_year = i32::try_from(stored_year).map_err(|_| {
        RepoError::InvalidData(format!(
            "publication year {stored_year} out of range in books.publication_year for id {id}"
        ))
    })?;

    Ok(Book {
        id,
        isbn,
        title: row.get("title")?,
        publication_year,
        author_id: row.get("author_id")?,
    })
}

fn parse_stored_date(row: &Row<'_>, column: &str) -> RepoResult<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => NaiveDate::parse_from_str(&text, ISO_DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                RepoError::InvalidData(format!("invalid date `{text}` in authors.{column}"))
            }),
        None => Ok(None),
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_guards_wildcards() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
