//! Decision recorder
//!
//! Applies a user decision to the current book of a [`BrowseQueue`], works out
//! the store mutation it implies and keeps a single [`UndoWindow`] for it.
//! Opening a new window forfeits the previous one.
//!
//! | Decision | Queue effect      | Store mutation              |
//! |----------|-------------------|-----------------------------|
//! | Skip     | advance           | none                        |
//! | Like     | advance           | upsert with `Saved`         |
//! | Delete   | remove current    | upsert with `Rejected`      |
//!
//! The recorder never touches the store itself; the session runs the returned
//! mutations on its worker.

use super::error::{BrowseError, Result};
use super::queue::BrowseQueue;
use super::undo::UndoWindow;
use crate::db::{DbError, LocalStore};
use crate::{Book, SavedState};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// What the user did with the current book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Skip,
    Like,
    Delete,
}

impl Decision {
    /// Store mutation applying this decision to `book`
    #[must_use]
    pub fn mutation(self, book: &Book) -> Option<StoreMutation> {
        match self {
            Self::Skip => None,
            Self::Like => Some(StoreMutation::Upsert(book.with_state(SavedState::Saved))),
            Self::Delete => Some(StoreMutation::Upsert(book.with_state(SavedState::Rejected))),
        }
    }

    /// Store mutation bringing `previous` back after this decision was applied
    #[must_use]
    pub fn revert_mutation(self, previous: &Book) -> Option<StoreMutation> {
        match self {
            Self::Skip => None,
            Self::Like | Self::Delete if previous.saved.is_decided() => {
                Some(StoreMutation::Upsert(previous.clone()))
            }
            Self::Like | Self::Delete => Some(StoreMutation::Remove(previous.id.clone())),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Skip => "skip",
            Self::Like => "like",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

impl FromStr for Decision {
    type Err = BrowseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "s" | "skip" => Ok(Self::Skip),
            "l" | "like" | "save" => Ok(Self::Like),
            "d" | "delete" | "reject" => Ok(Self::Delete),
            other => Err(BrowseError::InvalidDecision(other.to_string())),
        }
    }
}

/// A write the local store has to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreMutation {
    Upsert(Book),
    Remove(String),
}

impl StoreMutation {
    #[must_use]
    pub fn book_id(&self) -> &str {
        match self {
            Self::Upsert(book) => &book.id,
            Self::Remove(id) => id,
        }
    }

    /// # Errors
    ///
    /// Returns the store's error if the write fails.
    pub fn apply(&self, store: &dyn LocalStore) -> std::result::Result<(), DbError> {
        match self {
            Self::Upsert(book) => store.upsert(book),
            Self::Remove(id) => store.remove(id).map(|_| ()),
        }
    }
}

/// Result of a decision the recorder accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedDecision {
    pub book: Book,
    pub decision: Decision,
    pub position: usize,
    pub mutation: Option<StoreMutation>,
    pub undo_deadline: Instant,
}

/// Result of a successful undo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevertedDecision {
    pub book: Book,
    pub decision: Decision,
    pub position: usize,
    pub mutation: Option<StoreMutation>,
}

/// Applies decisions to a queue and keeps the undo window
#[derive(Debug)]
pub struct DecisionRecorder {
    window: Option<UndoWindow>,
    undo_timeout: Duration,
}

impl DecisionRecorder {
    #[must_use]
    pub const fn new(undo_timeout: Duration) -> Self {
        Self {
            window: None,
            undo_timeout,
        }
    }

    /// Apply `decision` to `book`, which must be the queue's current book
    ///
    /// # Errors
    ///
    /// Returns `BrowseError::StaleDecision` if `book` is not current (or the
    /// queue is exhausted). Nothing changes in that case.
    pub fn record(
        &mut self,
        queue: &mut BrowseQueue,
        book: &Book,
        decision: Decision,
        now: Instant,
    ) -> Result<AppliedDecision> {
        let snapshot = match queue.current() {
            Some(current) if current.id == book.id => current.clone(),
            current => {
                return Err(BrowseError::StaleDecision {
                    expected: current.map(|c| c.id.clone()),
                    got: book.id.clone(),
                });
            }
        };
        let position = queue.cursor();

        match decision {
            Decision::Skip | Decision::Like => {
                queue.advance();
            }
            Decision::Delete => {
                queue.remove_current();
            }
        }

        let undo_deadline = now + self.undo_timeout;
        self.window = Some(UndoWindow::new(position, snapshot.clone(), decision, undo_deadline));

        Ok(AppliedDecision {
            mutation: decision.mutation(&snapshot),
            book: snapshot,
            decision,
            position,
            undo_deadline,
        })
    }

    /// Revert the last decision if its window is still open at `now`
    ///
    /// The window is consumed either way.
    ///
    /// # Errors
    ///
    /// Returns `BrowseError::NothingToUndo` if there is no window or it expired.
    pub fn undo(&mut self, queue: &mut BrowseQueue, now: Instant) -> Result<RevertedDecision> {
        let window = self
            .window
            .take()
            .filter(|window| window.is_open(now))
            .ok_or(BrowseError::NothingToUndo)?;

        queue.restore(window.position, window.book.clone());

        Ok(RevertedDecision {
            mutation: window.action.revert_mutation(&window.book),
            book: window.book,
            decision: window.action,
            position: window.position,
        })
    }

    /// The undo window if it is still open at `now`
    #[must_use]
    pub fn open_window(&self, now: Instant) -> Option<&UndoWindow> {
        self.window.as_ref().filter(|window| window.is_open(now))
    }

    /// Make the pending decision final
    pub fn close(&mut self) -> Option<UndoWindow> {
        self.window.take()
    }
}
