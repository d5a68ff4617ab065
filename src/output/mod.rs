//! Output formatting for CLI display
//!
//! This module provides utilities for formatting books, decisions and
//! session events for the terminal. In quiet mode only identifiers and bare
//! numbers are printed so the output can be piped.

use crate::browse::{Decision, SavedEdit, SessionEvent};
use crate::db::Collection;
use crate::{Book, SavedState};
use colored::Colorize;

/// Format a book as one line of a listing
#[must_use]
pub fn book_line(book: &Book, quiet: bool) -> String {
    if quiet {
        return book.id.clone();
    }
    match book.author_line() {
        Some(authors) => format!("  {} by {} [{}]", book.title.bold(), authors, book.id.dimmed()),
        None => format!("  {} [{}]", book.title.bold(), book.id.dimmed()),
    }
}

/// Colored label for a saved state
#[must_use]
pub fn state_label(state: SavedState) -> String {
    match state {
        SavedState::Unseen => "new".cyan().to_string(),
        SavedState::Saved => "saved".green().to_string(),
        SavedState::Rejected => "rejected".red().to_string(),
    }
}

/// Format the current book of an explore session
///
/// `position` is zero-based; `len` is the queue length.
#[must_use]
pub fn book_card(book: &Book, position: usize, len: usize) -> String {
    let mut card = format!(
        "{} {}\n    {}",
        format!("[{}/{}]", position + 1, len).dimmed(),
        book.title.bold(),
        book.author_line().unwrap_or_else(|| "Unknown author".to_string()),
    );
    if let Some(cover) = &book.cover {
        card.push_str(&format!("\n    {}", cover.dimmed()));
    }
    if book.saved.is_decided() {
        card.push_str(&format!("\n    ({})", state_label(book.saved)));
    }
    card
}

/// Confirmation shown after a decision
#[must_use]
pub fn decision_message(book: &Book, decision: Decision) -> String {
    match decision {
        Decision::Like => format!("{} {}", "Saved".green(), book.title),
        Decision::Delete => format!("{} {}", "Rejected".red(), book.title),
        Decision::Skip => format!("{} {}", "Skipped".dimmed(), book.title),
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Account summary: saved books and collections
///
/// Quiet mode prints the two counts separated by a tab.
#[must_use]
pub fn account_summary(saved: usize, collections: usize, quiet: bool) -> String {
    if quiet {
        format!("{saved}\t{collections}")
    } else {
        format!("{}, {}", plural(saved, "saved book"), plural(collections, "collection"))
    }
}

/// Format a collection as one line of a listing
#[must_use]
pub fn collection_line(collection: &Collection, quiet: bool) -> String {
    if quiet {
        collection.name.clone()
    } else {
        format!("  {} ({})", collection.name.bold(), plural(collection.len(), "book"))
    }
}

/// Confirmation shown after a saved-list edit
#[must_use]
pub fn saved_edit_message(book: &Book, edit: &SavedEdit) -> String {
    match edit {
        SavedEdit::Removed => format!("{} {}", "Removed".red(), book.title),
        SavedEdit::AddedTo(name) => format!("{} {} to {}", "Added".green(), book.title, name.bold()),
    }
}

/// Render a session event worth telling the user about
///
/// Queue and decision bookkeeping events are handled by the caller and
/// produce `None` here.
#[must_use]
pub fn event_message(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::UndoAvailable { expires_in, .. } => Some(
            format!("  (u to undo within {:.1}s)", expires_in.as_secs_f32())
                .dimmed()
                .to_string(),
        ),
        SessionEvent::UndoApplied { decision, .. } => {
            Some(format!("{} {decision}", "Undid".yellow()))
        }
        SessionEvent::FetchFailed { genre, message } => Some(format!(
            "{} could not load books for '{genre}': {message} (r to retry)",
            "Error:".red().bold()
        )),
        SessionEvent::StoreFailed { book_id, message } => Some(format!(
            "{} could not save decision for {book_id}: {message}",
            "Warning:".yellow().bold()
        )),
        SessionEvent::QueueChanged { .. } | SessionEvent::DecisionApplied { .. } => None,
    }
}
