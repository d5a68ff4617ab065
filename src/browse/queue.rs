//! Browse queue: the ordered candidates of one genre and the cursor over them
//!
//! ```text
//!  books:   [A] [B] [C] [D]
//!                ^
//!             cursor = 1      current() = B, remaining() = 3
//! ```
//!
//! The cursor always lies in `[0, len]`; `cursor == len` means the queue is
//! exhausted. Appending never moves the cursor, removing the current book
//! slides the next one under it.

use crate::Book;
use std::collections::HashSet;

/// Observable state of a queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// No book was appended since creation or the last clear
    Empty,
    /// A current book is available
    Populated,
    /// Every book has been decided on or skipped past
    Exhausted,
}

/// Ordered candidate books plus the cursor marking the current one
#[derive(Debug, Clone, Default)]
pub struct BrowseQueue {
    books: Vec<Book>,
    cursor: usize,
    /// Every id appended since the last clear, including books removed since
    seen: HashSet<String>,
}

impl BrowseQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append books to the tail, skipping ids already seen in this queue
    ///
    /// Returns the number of books actually added.
    pub fn append(&mut self, batch: impl IntoIterator<Item = Book>) -> usize {
        let before = self.books.len();
        for book in batch {
            if self.seen.insert(book.id.clone()) {
                self.books.push(book);
            }
        }
        self.books.len() - before
    }

    /// The book under the cursor, `None` when exhausted
    #[must_use]
    pub fn current(&self) -> Option<&Book> {
        self.books.get(self.cursor)
    }

    /// Move past the current book; returns `false` when already exhausted
    pub fn advance(&mut self) -> bool {
        if self.cursor < self.books.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Remove the current book, leaving the cursor where it is
    pub fn remove_current(&mut self) -> Option<Book> {
        if self.cursor < self.books.len() {
            Some(self.books.remove(self.cursor))
        } else {
            None
        }
    }

    /// Put `book` back at `position` and make it current again
    ///
    /// If the book is still in place (it was advanced past, not removed) only
    /// the cursor moves; otherwise it is reinserted. `position` is clamped to
    /// the queue length.
    pub fn restore(&mut self, position: usize, book: Book) {
        let position = position.min(self.books.len());
        let in_place = self
            .books
            .get(position)
            .is_some_and(|existing| existing.id == book.id);

        if !in_place {
            self.seen.insert(book.id.clone());
            self.books.insert(position, book);
        }
        self.cursor = position;
    }

    /// Drop all books and forget every id seen
    pub fn clear(&mut self) {
        self.books.clear();
        self.seen.clear();
        self.cursor = 0;
    }

    #[must_use]
    pub fn state(&self) -> QueueState {
        if self.seen.is_empty() {
            QueueState::Empty
        } else if self.cursor >= self.books.len() {
            QueueState::Exhausted
        } else {
            QueueState::Populated
        }
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Books from the cursor to the tail, the current one included
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.books.len() - self.cursor
    }

    /// The stack a presentation layer should show, current book first
    #[must_use]
    pub fn upcoming(&self) -> &[Book] {
        &self.books[self.cursor..]
    }

    #[must_use]
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.books.iter().any(|book| book.id == id)
    }
}
