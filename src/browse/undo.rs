//! Bounded-time reversibility for the most recent edit
//!
//! The explore stack keeps a window per `Decision`; the saved list keeps one
//! per `SavedEdit`.

use super::decision::Decision;
use crate::Book;
use std::time::{Duration, Instant};

/// The last edit, restorable until its deadline passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoWindow<A = Decision> {
    /// Position the book held in its list when it was edited
    pub position: usize,
    /// The book as it was before the edit
    pub book: Book,
    pub action: A,
    pub deadline: Instant,
}

impl<A> UndoWindow<A> {
    #[must_use]
    pub const fn new(position: usize, book: Book, action: A, deadline: Instant) -> Self {
        Self {
            position,
            book,
            action,
            deadline,
        }
    }

    /// Whether undo is still allowed at `now`
    #[must_use]
    pub fn is_open(&self, now: Instant) -> bool {
        now < self.deadline
    }

    /// Time left before the edit becomes final
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }
}
