//! Collection commands - group saved books under a name

use crate::{BookmatchError, db::Database, output};
use std::io::Write;

type Result<T> = std::result::Result<T, BookmatchError>;

/// Create an empty collection
///
/// # Errors
/// Returns `BookmatchError::InvalidInput` if the name is blank or taken.
pub fn create<W: Write>(db: &Database, name: &str, out: &mut W, quiet: bool) -> Result<()> {
    if !db.create_collection(name)? {
        return Err(BookmatchError::InvalidInput(format!(
            "Collection '{}' already exists",
            name.trim()
        )));
    }
    db.flush()?;

    if !quiet {
        writeln!(out, "Created collection {}", name.trim())?;
    }
    Ok(())
}

/// Add a saved book to a collection
///
/// # Errors
/// Returns an error if the collection is unknown or the book is not saved.
pub fn add<W: Write>(db: &Database, name: &str, id: &str, out: &mut W, quiet: bool) -> Result<()> {
    let id = id.trim();
    let added = db.add_to_collection(name, id)?;
    db.flush()?;

    if !quiet {
        if added {
            writeln!(out, "Added {id} to {}", name.trim())?;
        } else {
            writeln!(out, "{id} is already in {}", name.trim())?;
        }
    }
    Ok(())
}

/// List all collections, or the books of one collection
///
/// # Errors
/// Returns an error if the collection is unknown or the database cannot be read.
pub fn list<W: Write>(db: &Database, name: Option<&str>, out: &mut W, quiet: bool) -> Result<()> {
    if let Some(name) = name {
        let books = db.collection_books(name)?;
        if books.is_empty() {
            if !quiet {
                writeln!(out, "Collection {} is empty.", name.trim())?;
            }
            return Ok(());
        }
        if !quiet {
            writeln!(out, "{} book(s) in {}:", books.len(), name.trim())?;
        }
        for book in &books {
            writeln!(out, "{}", output::book_line(book, quiet))?;
        }
        return Ok(());
    }

    let collections = db.list_collections()?;
    if collections.is_empty() {
        if !quiet {
            writeln!(out, "No collections.")?;
        }
        return Ok(());
    }
    for collection in &collections {
        writeln!(out, "{}", output::collection_line(collection, quiet))?;
    }
    Ok(())
}

/// Print how many collections exist
///
/// # Errors
/// Returns an error if output fails.
pub fn count<W: Write>(db: &Database, out: &mut W, quiet: bool) -> Result<()> {
    let count = db.count_collections();
    if quiet {
        writeln!(out, "{count}")?;
    } else {
        writeln!(out, "{count} collection(s)")?;
    }
    Ok(())
}
