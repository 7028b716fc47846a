use libris_core::db::{latest_version, open_db, open_db_in_memory, schema_version, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "authors");
    assert_table_exists(&conn, "books");
}

#[test]
fn open_db_enables_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.sqlite");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute("INSERT INTO authors (name) VALUES ('Jane Austen');", [])
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second).unwrap(), latest_version());
    let authors: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM authors;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(authors, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failed_schema_step_is_reported_and_rolled_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clashing.sqlite");

    // A view named `books` survives CREATE TABLE IF NOT EXISTS but cannot be indexed.
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE VIEW books AS SELECT 1 AS author_id, 'x' AS title;")
        .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(
        matches!(err, DbError::MigrationFailed { version: 1, .. }),
        "unexpected error: {err}"
    );

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), 0);
    let authors_tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'authors';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(authors_tables, 0);
}

#[test]
fn books_author_id_references_authors_with_cascade() {
    let conn = open_db_in_memory().unwrap();
    let (table, on_delete): (String, String) = conn
        .query_row(
            "SELECT \"table\", on_delete FROM pragma_foreign_key_list('books');",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(table, "authors");
    assert_eq!(on_delete, "CASCADE");
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
