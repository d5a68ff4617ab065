//! Library commands - review and edit the decisions kept in the local store

use crate::{BookmatchError, Book, db::Database, output};
use std::io::Write;

type Result<T> = std::result::Result<T, BookmatchError>;

/// List saved books, sorted by title
///
/// # Errors
/// Returns an error if the database cannot be read or output fails.
pub fn saved<W: Write>(db: &Database, out: &mut W, quiet: bool) -> Result<()> {
    let books = db.list_saved()?;
    print_books(&books, "saved", out, quiet)
}

/// List rejected books, sorted by title
///
/// # Errors
/// Returns an error if the database cannot be read or output fails.
pub fn rejected<W: Write>(db: &Database, out: &mut W, quiet: bool) -> Result<()> {
    let books = db.list_rejected()?;
    print_books(&books, "rejected", out, quiet)
}

/// Print the account summary: saved books and collections
///
/// # Errors
/// Returns an error if output fails.
pub fn count<W: Write>(db: &Database, out: &mut W, quiet: bool) -> Result<()> {
    let summary = output::account_summary(db.count_saved(), db.count_collections(), quiet);
    writeln!(out, "{summary}")?;
    Ok(())
}

/// Forget the decision on one book
///
/// # Errors
/// Returns `BookmatchError::InvalidInput` if the id is blank or unknown.
pub fn remove<W: Write>(db: &Database, id: &str, out: &mut W, quiet: bool) -> Result<()> {
    let id = id.trim();
    if id.is_empty() {
        return Err(BookmatchError::InvalidInput("Book id cannot be empty".into()));
    }

    let title = db.get(id)?.map(|book| book.title);
    if !db.remove(id)? {
        return Err(BookmatchError::InvalidInput(format!("No decision recorded for '{id}'")));
    }
    db.flush()?;

    if !quiet {
        writeln!(out, "Forgot {}", title.as_deref().unwrap_or(id))?;
    }
    Ok(())
}

/// Forget every decision; does nothing unless `confirmed`
///
/// # Errors
/// Returns an error if the database cannot be cleared or output fails.
pub fn reset<W: Write>(db: &Database, confirmed: bool, out: &mut W, quiet: bool) -> Result<()> {
    if !confirmed {
        if !quiet {
            writeln!(out, "Reset cancelled.")?;
        }
        return Ok(());
    }

    let removed = db.count();
    db.clear()?;
    db.flush()?;
    if !quiet {
        writeln!(out, "Forgot {removed} decision(s).")?;
    }
    Ok(())
}

fn print_books<W: Write>(books: &[Book], label: &str, out: &mut W, quiet: bool) -> Result<()> {
    if books.is_empty() {
        if !quiet {
            writeln!(out, "No {label} books.")?;
        }
        return Ok(());
    }

    if !quiet {
        writeln!(out, "{} {label} book(s):", books.len())?;
    }
    for book in books {
        writeln!(out, "{}", output::book_line(book, quiet))?;
    }
    Ok(())
}
