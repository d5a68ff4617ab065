//! Explore command - interactive card-stack browsing
//!
//! Reads one command per line and drives a `BrowseSession`:
//!
//! ```text
//! l / like      save the current book
//! s / skip      move on without deciding
//! d / delete    reject the current book
//! u / undo      revert the last decision while the undo window is open
//! g <genre>     switch genre
//! r / retry     retry a failed catalog fetch
//! ? / help      show this list
//! q / quit      leave
//! ```

use colored::Colorize;
use crate::{
    BookmatchError,
    browse::{BrowseError, BrowseSession, Decision, SessionEvent},
    output,
};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::Receiver;
use std::time::Duration;
use tracing::warn;

type Result<T> = std::result::Result<T, BookmatchError>;

/// How long to wait for a page when the stack is empty
const FETCH_WAIT: Duration = Duration::from_secs(20);
/// How long pending store writes get before the session is closed
const FLUSH_WAIT: Duration = Duration::from_secs(5);

const HELP: &str = "l like | s skip | d delete | u undo | g <genre> | r retry | q quit";

/// A line of user input in the explore loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExploreCommand {
    Decide(Decision),
    Undo,
    Genre(String),
    Retry,
    Help,
    Quit,
}

impl ExploreCommand {
    /// Parse one input line; `None` for a blank line
    ///
    /// # Errors
    ///
    /// Returns `BookmatchError::InvalidInput` for unknown commands.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let command = match word.to_lowercase().as_str() {
            "u" | "undo" => Self::Undo,
            "r" | "retry" => Self::Retry,
            "?" | "h" | "help" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            "g" | "genre" => {
                let genre = rest.trim();
                if genre.is_empty() {
                    return Err(BookmatchError::InvalidInput("Usage: g <genre>".into()));
                }
                Self::Genre(genre.to_string())
            }
            other => match other.parse::<Decision>() {
                Ok(decision) => Self::Decide(decision),
                Err(_) => {
                    return Err(BookmatchError::InvalidInput(format!(
                        "Unknown command '{other}' ({HELP})"
                    )));
                }
            },
        };
        Ok(Some(command))
    }
}

/// Execute the explore command on stdin/stdout
///
/// # Errors
/// Returns an error if terminal I/O fails or the session is torn down underneath.
pub fn execute(session: &mut BrowseSession, genre: Option<&str>, quiet: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run(session, genre, stdin.lock(), &mut stdout, quiet)
}

/// Run the explore loop over arbitrary input and output
///
/// Pending store writes are given a moment to finish before the session is
/// closed on exit.
///
/// # Errors
/// Returns an error if reading input or writing output fails.
pub fn run<R: BufRead, W: Write>(
    session: &mut BrowseSession,
    genre: Option<&str>,
    input: R,
    out: &mut W,
    quiet: bool,
) -> Result<()> {
    let events = session.subscribe();
    match genre {
        Some(genre) => session.set_genre(genre),
        None if !quiet => writeln!(out, "Pick a genre with: g <genre>")?,
        None => {}
    }

    let mut lines = input.lines();
    loop {
        wait_for_books(session);
        print_events(&events, out, quiet)?;
        show_current(session, out)?;
        out.flush()?;

        let Some(line) = lines.next() else { break };
        let command = match ExploreCommand::parse(&line?) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };

        match command {
            ExploreCommand::Decide(decision) => decide(session, decision, out, quiet)?,
            ExploreCommand::Undo => match session.undo() {
                Ok(_) => {}
                Err(BrowseError::NothingToUndo) => writeln!(out, "Nothing to undo")?,
                Err(e) => return Err(e.into()),
            },
            ExploreCommand::Genre(genre) => session.set_genre(&genre),
            ExploreCommand::Retry => {
                if !session.retry() {
                    writeln!(out, "Nothing to retry")?;
                }
            }
            ExploreCommand::Help => writeln!(out, "{HELP}")?,
            ExploreCommand::Quit => break,
        }
    }

    finish(session, &events, out, quiet, FLUSH_WAIT)
}

/// Give pending writes up to `wait`, report what is left and close the session
fn finish<W: Write>(
    session: &mut BrowseSession,
    events: &Receiver<SessionEvent>,
    out: &mut W,
    quiet: bool,
    wait: Duration,
) -> Result<()> {
    let flushed = session.settle(wait);
    print_events(events, out, quiet)?;
    if !flushed {
        warn!("leaving explore with background jobs still running");
        writeln!(
            out,
            "{} some decisions were still being saved and may be lost",
            "Warning:".yellow().bold()
        )?;
    }
    session.close();
    Ok(())
}

fn decide<W: Write>(session: &mut BrowseSession, decision: Decision, out: &mut W, quiet: bool) -> Result<()> {
    let Some(book) = session.current().cloned() else {
        writeln!(out, "Nothing to decide on")?;
        return Ok(());
    };
    let applied = session.decide(&book, decision)?;
    if !quiet {
        writeln!(out, "{}", output::decision_message(&applied.book, decision))?;
    }
    Ok(())
}

fn wait_for_books(session: &mut BrowseSession) {
    session.pump();
    if session.current().is_none() && session.is_fetching() {
        session.settle(FETCH_WAIT);
    }
}

fn print_events<W: Write>(events: &Receiver<SessionEvent>, out: &mut W, quiet: bool) -> Result<()> {
    for event in events.try_iter() {
        let chatty = matches!(
            event,
            SessionEvent::UndoAvailable { .. } | SessionEvent::UndoApplied { .. }
        );
        if quiet && chatty {
            continue;
        }
        if let Some(message) = output::event_message(&event) {
            writeln!(out, "{message}")?;
        }
    }
    Ok(())
}

fn show_current<W: Write>(session: &BrowseSession, out: &mut W) -> Result<()> {
    let queue = session.queue();
    match (session.current(), session.genre()) {
        (Some(book), _) => writeln!(out, "\n{}", output::book_card(book, queue.cursor(), queue.len()))?,
        (None, None) => {}
        (None, Some(genre)) if session.fetch_failed() => {
            writeln!(out, "No books loaded for '{genre}'")?;
        }
        (None, Some(genre)) => writeln!(out, "No more books for '{genre}'. Try another genre with: g <genre>")?,
    }
    write!(out, "> ")?;
    Ok(())
}
