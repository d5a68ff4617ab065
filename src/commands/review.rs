//! Review command - edit the saved list interactively
//!
//! Positions are the 1-based numbers printed by `ls`:
//!
//! ```text
//! ls                   list saved books
//! rm <n>               remove book n from the saved list
//! add <n> <collection> add book n to a collection
//! u / undo             revert the last edit while the undo window is open
//! ? / help             show this list
//! q / quit             leave
//! ```

use crate::{
    BookmatchError,
    browse::{BrowseError, SavedEdit, SavedList},
    db::{Database, DbError},
    output,
};
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

type Result<T> = std::result::Result<T, BookmatchError>;

const HELP: &str = "ls list | rm <n> remove | add <n> <collection> | u undo | q quit";

/// A line of user input in the review loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCommand {
    List,
    /// Zero-based position to remove
    Remove(usize),
    /// Zero-based position and collection name
    Add(usize, String),
    Undo,
    Help,
    Quit,
}

fn parse_position(word: &str) -> Result<usize> {
    match word.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(BookmatchError::InvalidInput(format!(
            "'{word}' is not a book number"
        ))),
    }
}

impl ReviewCommand {
    /// Parse one input line; `None` for a blank line
    ///
    /// # Errors
    ///
    /// Returns `BookmatchError::InvalidInput` for unknown commands or bad numbers.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let command = match word.to_lowercase().as_str() {
            "ls" | "list" => Self::List,
            "u" | "undo" => Self::Undo,
            "?" | "h" | "help" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            "rm" | "remove" => Self::Remove(parse_position(rest)?),
            "add" => {
                let (position, name) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let name = name.trim();
                if name.is_empty() {
                    return Err(BookmatchError::InvalidInput(
                        "Usage: add <n> <collection>".into(),
                    ));
                }
                Self::Add(parse_position(position)?, name.to_string())
            }
            other => {
                return Err(BookmatchError::InvalidInput(format!(
                    "Unknown command '{other}' ({HELP})"
                )));
            }
        };
        Ok(Some(command))
    }
}

/// Execute the review command on stdin/stdout
///
/// # Errors
/// Returns an error if the saved list cannot be loaded or terminal I/O fails.
pub fn execute(db: &Database, undo_timeout: Duration, quiet: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run(db, undo_timeout, stdin.lock(), &mut stdout, quiet)
}

/// Run the review loop over arbitrary input and output
///
/// Edits that only fail on user input (bad position, unknown collection,
/// nothing to undo) are reported and the loop carries on.
///
/// # Errors
/// Returns an error if reading input, writing output or the store fails.
pub fn run<R: BufRead, W: Write>(
    db: &Database,
    undo_timeout: Duration,
    input: R,
    out: &mut W,
    quiet: bool,
) -> Result<()> {
    let mut list = SavedList::load(db, undo_timeout)?;
    print_list(&list, out, quiet)?;

    for line in input.lines() {
        let command = match ReviewCommand::parse(&line?) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };

        let now = Instant::now();
        match command {
            ReviewCommand::List => print_list(&list, out, quiet)?,
            ReviewCommand::Remove(position) => match list.remove(position, now) {
                Ok(book) => {
                    let message = output::saved_edit_message(book, &SavedEdit::Removed);
                    writeln!(out, "{message}")?;
                    print_undo_hint(undo_timeout, out)?;
                }
                Err(e) => report(e, out)?,
            },
            ReviewCommand::Add(position, name) => match list.add_to_collection(position, &name, now) {
                Ok(true) => {
                    if let Some(window) = list.open_window(now) {
                        writeln!(out, "{}", output::saved_edit_message(&window.book, &window.action))?;
                    }
                    print_undo_hint(undo_timeout, out)?;
                }
                Ok(false) => writeln!(out, "Already in {}", name.trim())?,
                Err(e) => report(e, out)?,
            },
            ReviewCommand::Undo => match list.undo(now) {
                Ok(window) => writeln!(out, "{} {}", "Undid".yellow(), window.book.title)?,
                Err(e) => report(e, out)?,
            },
            ReviewCommand::Help => writeln!(out, "{HELP}")?,
            ReviewCommand::Quit => break,
        }
        out.flush()?;
    }

    db.flush()?;
    Ok(())
}

/// Print recoverable edit errors; anything else ends the loop
fn report<W: Write>(error: BrowseError, out: &mut W) -> Result<()> {
    match error {
        BrowseError::NoSuchPosition(position) => writeln!(out, "No book number {}", position + 1)?,
        BrowseError::NothingToUndo => writeln!(out, "{error}")?,
        BrowseError::Database(
            e @ (DbError::CollectionNotFound(_) | DbError::InvalidInput(_) | DbError::BookNotFound(_)),
        ) => writeln!(out, "{e}")?,
        other => return Err(other.into()),
    }
    Ok(())
}

fn print_undo_hint<W: Write>(undo_timeout: Duration, out: &mut W) -> Result<()> {
    let hint = format!("  (u to undo within {:.1}s)", undo_timeout.as_secs_f32());
    writeln!(out, "{}", hint.dimmed())?;
    Ok(())
}

fn print_list<W: Write>(list: &SavedList<'_>, out: &mut W, quiet: bool) -> Result<()> {
    if list.is_empty() {
        if !quiet {
            writeln!(out, "No saved books.")?;
        }
        return Ok(());
    }
    for (i, book) in list.books().iter().enumerate() {
        writeln!(out, "{:>3}. {}", i + 1, output::book_line(book, quiet).trim_start())?;
    }
    Ok(())
}
