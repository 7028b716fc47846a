use libris_core::db::open_db_in_memory;
use libris_core::{
    AuthorForm, BookForm, CatalogError, CatalogService, RemovedBook, RepoError, SearchStatus,
    SortKey, SqliteCatalogRepository, ValidationError,
};
use rusqlite::Connection;

fn author_form(name: &str) -> AuthorForm {
    AuthorForm {
        name: name.to_string(),
        ..AuthorForm::default()
    }
}

fn book_form(isbn: &str, title: &str, year: &str, author_id: i64) -> BookForm {
    BookForm {
        isbn: isbn.to_string(),
        title: title.to_string(),
        publication_year: year.to_string(),
        author_id: author_id.to_string(),
    }
}

fn seed(conn: &Connection) {
    let service = CatalogService::new(SqliteCatalogRepository::new(conn));
    let shelley = service.add_author(&author_form("Mary Shelley")).unwrap();
    let austen = service.add_author(&author_form("Jane Austen")).unwrap();
    let dickens = service.add_author(&author_form("Charles Dickens")).unwrap();
    service
        .add_book(&book_form("9780141439471", "Frankenstein", "1818", shelley.id))
        .unwrap();
    service
        .add_book(&book_form("9780141439518", "Pride and Prejudice", "1813", austen.id))
        .unwrap();
    service
        .add_book(&book_form("9780141439563", "Great Expectations", "1861", dickens.id))
        .unwrap();
    service
        .add_book(&book_form("9780141439587", "Emma", "1815", austen.id))
        .unwrap();
}

#[test]
fn sorted_by_title_is_non_decreasing() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let service = CatalogService::new(SqliteCatalogRepository::new(&conn));

    let titles: Vec<_> = service
        .get_sorted_books(SortKey::Title)
        .unwrap()
        .into_iter()
        .map(|entry| entry.book.title)
        .collect();

    assert_eq!(
        titles,
        vec![
            "Emma",
            "Frankenstein",
            "Great Expectations",
            "Pride and Prejudice"
        ]
    );
    assert!(titles.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn sorted_by_author_name_resolves_authors() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let service = CatalogService::new(SqliteCatalogRepository::new(&conn));

    let entries = service.get_sorted_books(SortKey::AuthorName).unwrap();
    let pairs: Vec<_> = entries
        .iter()
        .map(|entry| (entry.author_name().unwrap(), entry.book.title.as_str()))
        .collect();

    assert_eq!(
        pairs,
        vec![
            ("Charles Dickens", "Great Expectations"),
            ("Jane Austen", "Pride and Prejudice"),
            ("Jane Austen", "Emma"),
            ("Mary Shelley", "Frankenstein"),
        ]
    );
}

#[test]
fn sorted_by_year_is_ascending() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let service = CatalogService::new(SqliteCatalogRepository::new(&conn));

    let years: Vec<_> = service
        .get_sorted_books(SortKey::PublicationYear)
        .unwrap()
        .into_iter()
        .map(|entry| entry.book.publication_year)
        .collect();

    assert_eq!(years, vec![1813, 1815, 1818, 1861]);
}

#[test]
fn single_austen_book_resolves_author_name() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::new(&conn));
    let jane = service.add_author(&author_form("Jane Austen")).unwrap();
    let book = service
        .add_book(&book_form("9780141439518", "Pride and Prejudice", "1813", jane.id))
        .unwrap();

    let entries = service.get_sorted_books(SortKey::AuthorName).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].book, book);
    assert_eq!(entries[0].author_name(), Some("Jane Austen"));
}

#[test]
fn sorting_by_author_fails_on_dangling_reference_but_title_sort_succeeds() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    conn.execute_batch(
        "PRAGMA foreign_keys = OFF;
         INSERT INTO books (isbn, title, publication_year, author_id)
         VALUES ('1234', 'Lost Manuscript', 1900, 999);
         PRAGMA foreign_keys = ON;",
    )
    .unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::new(&conn));

    let err = service.get_sorted_books(SortKey::AuthorName).unwrap_err();
    assert!(matches!(
        err,
        CatalogError::UnresolvedAuthor { author_id: 999, .. }
    ));
    assert!(!err.is_user_error());

    let by_title = service.get_sorted_books(SortKey::Title).unwrap();
    let orphan = by_title
        .iter()
        .find(|entry| entry.book.title == "Lost Manuscript")
        .unwrap();
    assert!(orphan.author.is_none());
}

#[test]
fn sort_key_parsing_accepts_aliases_and_defaults_to_title() {
    assert_eq!(SortKey::from_param(None).unwrap(), SortKey::Title);
    assert_eq!(SortKey::from_param(Some("  ")).unwrap(), SortKey::Title);
    assert_eq!("author".parse::<SortKey>().unwrap(), SortKey::AuthorName);
    assert_eq!(
        "author_name".parse::<SortKey>().unwrap(),
        SortKey::AuthorName
    );
    assert_eq!("Year".parse::<SortKey>().unwrap(), SortKey::PublicationYear);

    let err = SortKey::from_param(Some("isbn")).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidSortKey(ref key) if key == "isbn"));
    assert!(err.is_user_error());
}

#[test]
fn search_reports_found_and_not_found() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let service = CatalogService::new(SqliteCatalogRepository::new(&conn));

    let all = service.search_books("").unwrap();
    assert_eq!(all.status, SearchStatus::Found);
    assert_eq!(all.entries.len(), 4);

    let hit = service.search_books("Expect").unwrap();
    assert_eq!(hit.status, SearchStatus::Found);
    assert_eq!(hit.entries.len(), 1);
    assert_eq!(hit.entries[0].author_name(), Some("Charles Dickens"));

    let miss = service.search_books("zzz-no-match").unwrap();
    assert!(miss.is_not_found());
    assert!(miss.entries.is_empty());
    assert_eq!(miss.query, "zzz-no-match");
}

#[test]
fn add_book_surfaces_validation_errors() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::new(&conn));
    let author = service.add_author(&author_form("Jane Austen")).unwrap();

    let bad_year = service
        .add_book(&book_form("9780141439518", "Emma", "eighteen", author.id))
        .unwrap_err();
    assert!(matches!(
        bad_year,
        CatalogError::Validation(ValidationError::NonNumericYear(_))
    ));
    assert!(bad_year.is_user_error());

    let unknown_author = service
        .add_book(&book_form("9780141439518", "Emma", "1815", author.id + 100))
        .unwrap_err();
    assert!(matches!(
        unknown_author,
        CatalogError::Validation(ValidationError::UnknownAuthor(_))
    ));

    assert!(service.list_catalog().unwrap().is_empty());
}

#[test]
fn add_author_rejects_blank_name() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::new(&conn));

    let err = service.add_author(&author_form("")).unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Validation(ValidationError::EmptyAuthorName)
    ));
    assert!(service.list_authors().unwrap().is_empty());
}

#[test]
fn remove_book_returns_record_then_none() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let service = CatalogService::new(SqliteCatalogRepository::new(&conn));
    let emma = service
        .search_books("Emma")
        .unwrap()
        .entries
        .remove(0)
        .book;

    let removed = service.remove_book(emma.id).unwrap();
    assert_eq!(
        removed,
        Some(RemovedBook {
            id: emma.id,
            title: "Emma".to_string(),
        })
    );
    assert_eq!(service.remove_book(emma.id).unwrap(), None);
    assert_eq!(service.list_catalog().unwrap().len(), 3);
}

#[test]
fn remove_book_clears_row_that_cannot_be_decoded() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    conn.execute(
        "INSERT INTO books (isbn, title, publication_year, author_id)
         VALUES ('ISBN-X', 'Smudged Copy', 1900, 1);",
        [],
    )
    .unwrap();
    let broken_id = conn.last_insert_rowid();
    let service = CatalogService::new(SqliteCatalogRepository::new(&conn));

    let err = service.list_catalog().unwrap_err();
    assert!(matches!(err, CatalogError::Storage(RepoError::InvalidData(_))));

    let removed = service.remove_book(broken_id).unwrap().unwrap();
    assert_eq!(removed.title, "Smudged Copy");
    assert_eq!(service.list_catalog().unwrap().len(), 4);
}

#[test]
fn lookups_report_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::new(&conn));

    let err = service.get_book(7).unwrap_err();
    assert!(matches!(
        err,
        CatalogError::NotFound {
            entity: "book",
            id: 7
        }
    ));

    let err = service.get_author(3).unwrap_err();
    assert_eq!(err.to_string(), "author not found: 3");
}

#[test]
fn list_catalog_pairs_books_with_authors() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let service = CatalogService::new(SqliteCatalogRepository::new(&conn));

    let entries = service.list_catalog().unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|entry| entry
        .author
        .as_ref()
        .is_some_and(|author| author.id == entry.book.author_id)));
}

#[test]
fn catalog_entry_serializes_with_nested_author() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteCatalogRepository::new(&conn));
    let author = service
        .add_author(&AuthorForm {
            name: "Jane Austen".to_string(),
            birth_date: "1775-12-16".to_string(),
            date_of_death: String::new(),
        })
        .unwrap();
    service
        .add_book(&book_form("9780141439518", "Pride and Prejudice", "1813", author.id))
        .unwrap();

    let entries = service.list_catalog().unwrap();
    let json = serde_json::to_value(&entries[0]).unwrap();

    assert_eq!(json["book"]["isbn"], "9780141439518");
    assert_eq!(json["book"]["publication_year"], 1813);
    assert_eq!(json["author"]["name"], "Jane Austen");
    assert_eq!(json["author"]["birth_date"], "1775-12-16");
    assert!(json["author"]["date_of_death"].is_null());
}
