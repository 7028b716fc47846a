//! Command-line presentation layer for the Libris catalog.
//!
//! # Responsibility
//! - Parse arguments and `LIBRIS_*` variables into catalog requests.
//! - Open the store once and inject it into the service.
//! - Render entries, or translate validation/not-found outcomes into messages.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use libris_core::db::open_db;
use libris_core::{
    init_logging, AuthorForm, BookForm, BookId, CatalogConfig, CatalogEntry, CatalogError,
    CatalogRepository, CatalogService, SortKey, SqliteCatalogRepository,
};
use log::info;
use serde::Serialize;
use std::io::{self, Write};
use std::process::ExitCode;

const EXIT_USER_ERROR: u8 = 2;

/// Library catalog: list, search, sort and add books and authors.
#[derive(Parser)]
#[command(name = "libris")]
#[command(version)]
struct Cli {
    /// SQLite catalog file
    #[arg(long, env = "LIBRIS_DB_PATH")]
    db: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "LIBRIS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long, env = "LIBRIS_LOG_DIR")]
    log_dir: Option<String>,

    /// Print results as JSON
    #[arg(long, short = 'J')]
    json: bool,

    #[command(subcommand)]
    command: CatalogCommand,
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// List every book
    Books,
    /// Find books whose title contains the query
    Search {
        #[arg(default_value = "")]
        query: String,
    },
    /// List books ordered by title, author or year
    Sorted {
        #[arg(long, default_value = "title")]
        by: String,
    },
    /// List every author
    Authors,
    /// Add an author
    AddAuthor {
        #[arg(long)]
        name: String,
        /// YYYY-MM-DD
        #[arg(long, default_value = "")]
        birth_date: String,
        /// YYYY-MM-DD
        #[arg(long, default_value = "")]
        date_of_death: String,
    },
    /// Add a book for an existing author
    AddBook {
        #[arg(long)]
        isbn: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        year: String,
        /// Author id
        #[arg(long)]
        author: String,
    },
    /// Remove a book by id
    DeleteBook { id: BookId },
}

/// JSON shape of a `delete-book` result, hit or miss.
#[derive(Serialize)]
struct Removal {
    deleted: bool,
    id: BookId,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = resolve_config(&cli)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).context("failed to start logging")?;
    }
    info!(
        "event=cli_start module=cli status=ok version={}",
        libris_core::core_version()
    );

    config.ensure_data_dir()?;
    let conn = open_db(config.db_path())
        .with_context(|| format!("failed to open catalog `{}`", config.db_path().display()))?;
    let service = CatalogService::new(SqliteCatalogRepository::new(&conn));
    let mut output = Output {
        json: cli.json,
        out: io::stdout().lock(),
    };

    match execute(&service, &mut output, cli.command) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            let user_message = err
                .downcast_ref::<CatalogError>()
                .filter(|catalog_err| catalog_err.is_user_error())
                .map(ToString::to_string);
            match user_message {
                Some(message) => {
                    eprintln!("{message}");
                    Ok(ExitCode::from(EXIT_USER_ERROR))
                }
                None => Err(err),
            }
        }
    }
}

/// Builds the process config from parsed flags; blank values keep the default.
fn resolve_config(cli: &Cli) -> Result<CatalogConfig> {
    let mut config = CatalogConfig::default();
    if let Some(db) = non_blank(&cli.db) {
        config = config.with_db_path(db);
    }
    if let Some(level) = non_blank(&cli.log_level) {
        config = config.with_log_level(level);
    }
    if let Some(dir) = non_blank(&cli.log_dir) {
        config = config.with_log_dir(dir)?;
    }
    Ok(config)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|text| !text.is_empty())
}

fn execute<R: CatalogRepository, W: Write>(
    service: &CatalogService<R>,
    output: &mut Output<W>,
    command: CatalogCommand,
) -> Result<()> {
    match command {
        CatalogCommand::Books => output.entries(&service.list_catalog()?),
        CatalogCommand::Search { query } => {
            let outcome = service.search_books(&query)?;
            if output.json {
                output.render(&outcome, |_| Ok(()))
            } else if outcome.is_not_found() {
                output.render(&outcome, |out| writeln!(out, "Book not found"))
            } else {
                output.entries(&outcome.entries)
            }
        }
        CatalogCommand::Sorted { by } => {
            let key = SortKey::from_param(Some(by.as_str()))?;
            output.entries(&service.get_sorted_books(key)?)
        }
        CatalogCommand::Authors => {
            let authors = service.list_authors()?;
            output.render(&authors, |out| {
                for author in &authors {
                    let born = author.birth_date.map(|d| d.to_string()).unwrap_or_default();
                    let died = author.date_of_death.map(|d| d.to_string()).unwrap_or_default();
                    writeln!(out, "{}\t{}\t{born}\t{died}", author.id, author.name)?;
                }
                Ok(())
            })
        }
        CatalogCommand::AddAuthor {
            name,
            birth_date,
            date_of_death,
        } => {
            let author = service.add_author(&AuthorForm {
                name,
                birth_date,
                date_of_death,
            })?;
            output.render(&author, |out| {
                writeln!(out, "Author {} added successfully to database.", author.name)
            })
        }
        CatalogCommand::AddBook {
            isbn,
            title,
            year,
            author,
        } => {
            let book = service.add_book(&BookForm {
                isbn,
                title,
                publication_year: year,
                author_id: author,
            })?;
            output.render(&book, |out| {
                writeln!(out, "Book '{}' was successfully added to library.", book.title)
            })
        }
        CatalogCommand::DeleteBook { id } => {
            let removed = service.remove_book(id)?;
            let removal = Removal {
                deleted: removed.is_some(),
                id,
                title: removed.map(|book| book.title),
            };
            output.render(&removal, |out| match &removal.title {
                Some(title) => writeln!(out, "The book '{title}' has been removed successfully!"),
                None => writeln!(out, "Book not found in database"),
            })
        }
    }
}

/// Result sink: JSON documents with `--json`, tab-separated lines otherwise.
struct Output<W: Write> {
    json: bool,
    out: W,
}

impl<W: Write> Output<W> {
    fn render<T: Serialize>(
        &mut self,
        value: &T,
        text: impl FnOnce(&mut W) -> io::Result<()>,
    ) -> Result<()> {
        if self.json {
            serde_json::to_writer_pretty(&mut self.out, value).context("failed to encode JSON")?;
            writeln!(self.out)?;
        } else {
            text(&mut self.out)?;
        }
        Ok(())
    }

    fn entries(&mut self, entries: &[CatalogEntry]) -> Result<()> {
        self.render(&entries, |out| {
            for entry in entries {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}",
                    entry.book.id,
                    entry.book.title,
                    entry.author_name().unwrap_or("-"),
                    entry.book.publication_year,
                    entry.book.isbn
                )?;
            }
            Ok(())
        })
    }
}
