//! The saved list as an editable, undoable view
//!
//! `SavedList` loads the saved books once and applies edits to both the list
//! and the store right away. The latest edit stays revertible through an
//! [`UndoWindow`] until its deadline; a new edit forfeits the previous window.
//!
//! | Edit              | Store effect                 | Undo                              |
//! |-------------------|------------------------------|-----------------------------------|
//! | remove            | book record deleted          | record rewritten, same position   |
//! | add to collection | id appended to collection    | id taken out of the collection    |

use super::error::{BrowseError, Result};
use super::undo::UndoWindow;
use crate::Book;
use crate::db::Database;
use std::time::{Duration, Instant};
use tracing::debug;

/// An edit made to the saved list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedEdit {
    /// The book was dropped from the saved list and its decision forgotten
    Removed,
    /// The book was added to the named collection
    AddedTo(String),
}

/// Saved books in title order, with undo for the latest edit
pub struct SavedList<'a> {
    db: &'a Database,
    books: Vec<Book>,
    window: Option<UndoWindow<SavedEdit>>,
    undo_timeout: Duration,
}

impl<'a> SavedList<'a> {
    /// Load the saved books from `db`
    ///
    /// # Errors
    ///
    /// Returns `BrowseError::Database` if the saved books cannot be read.
    pub fn load(db: &'a Database, undo_timeout: Duration) -> Result<Self> {
        Ok(Self {
            db,
            books: db.list_saved()?,
            window: None,
            undo_timeout,
        })
    }

    #[must_use]
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// The open undo window at `now`, if any
    #[must_use]
    pub fn open_window(&self, now: Instant) -> Option<&UndoWindow<SavedEdit>> {
        self.window.as_ref().filter(|window| window.is_open(now))
    }

    fn book_at(&self, position: usize) -> Result<&Book> {
        self.books
            .get(position)
            .ok_or(BrowseError::NoSuchPosition(position))
    }

    /// Drop the book at `position` from the list and forget its decision
    ///
    /// # Errors
    ///
    /// Returns `NoSuchPosition` for a position past the end, or a database
    /// error if the record cannot be removed. The list is unchanged on error.
    pub fn remove(&mut self, position: usize, now: Instant) -> Result<&Book> {
        let id = self.book_at(position)?.id.clone();
        self.db.remove(&id)?;

        let book = self.books.remove(position);
        debug!(id = %book.id, position, "removed from saved list");
        let window = self.window.insert(UndoWindow::new(
            position,
            book,
            SavedEdit::Removed,
            now + self.undo_timeout,
        ));
        Ok(&window.book)
    }

    /// Add the book at `position` to collection `name`
    ///
    /// Returns `false` if the book was already a member; no undo window is
    /// opened then and the previous one is kept.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchPosition` for a position past the end, or a database
    /// error for an unknown collection.
    pub fn add_to_collection(&mut self, position: usize, name: &str, now: Instant) -> Result<bool> {
        let book = self.book_at(position)?.clone();
        if !self.db.add_to_collection(name, &book.id)? {
            return Ok(false);
        }

        let name = name.trim().to_string();
        debug!(id = %book.id, collection = %name, "added to collection");
        self.window = Some(UndoWindow::new(
            position,
            book,
            SavedEdit::AddedTo(name),
            now + self.undo_timeout,
        ));
        Ok(true)
    }

    /// Revert the latest edit if its window is still open at `now`
    ///
    /// A removed book goes back to the position it held, clamped to the
    /// current length.
    ///
    /// # Errors
    ///
    /// Returns `NothingToUndo` without an open window, or a database error if
    /// the revert cannot be written; the window is consumed either way.
    pub fn undo(&mut self, now: Instant) -> Result<UndoWindow<SavedEdit>> {
        let window = self
            .window
            .take()
            .filter(|window| window.is_open(now))
            .ok_or(BrowseError::NothingToUndo)?;

        match &window.action {
            SavedEdit::Removed => {
                self.db.upsert(&window.book)?;
                let position = window.position.min(self.books.len());
                self.books.insert(position, window.book.clone());
            }
            SavedEdit::AddedTo(name) => {
                self.db.remove_from_collection(name, &window.book.id)?;
            }
        }
        debug!(id = %window.book.id, edit = ?window.action, "saved-list edit undone");
        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SavedState;
    use crate::testing::{TestDb, book};

    const TIMEOUT: Duration = Duration::from_secs(3);

    fn saved_db(ids: &[&str]) -> TestDb {
        let test_db = TestDb::new();
        for id in ids {
            test_db.db().upsert(&book(id).with_state(SavedState::Saved)).unwrap();
        }
        test_db
    }

    fn ids(list: &SavedList<'_>) -> Vec<String> {
        list.books().iter().map(|b| b.id.clone()).collect()
    }

    #[test]
    fn test_remove_then_undo_restores_position_and_record() {
        let test_db = saved_db(&["a", "b", "c"]);
        let db = test_db.db();
        let mut list = SavedList::load(db, TIMEOUT).unwrap();
        let now = Instant::now();

        assert_eq!(list.remove(1, now).unwrap().id, "b");
        assert_eq!(ids(&list), vec!["a", "c"]);
        assert!(db.get("b").unwrap().is_none());

        let reverted = list.undo(now + Duration::from_secs(1)).unwrap();
        assert_eq!(reverted.action, SavedEdit::Removed);
        assert_eq!(ids(&list), vec!["a", "b", "c"]);
        assert_eq!(db.get("b").unwrap().unwrap().saved, SavedState::Saved);
        assert_eq!(db.count_saved(), 3);
    }

    #[test]
    fn test_undo_after_deadline_keeps_removal() {
        let test_db = saved_db(&["a", "b"]);
        let mut list = SavedList::load(test_db.db(), TIMEOUT).unwrap();
        let now = Instant::now();

        list.remove(0, now).unwrap();
        assert!(list.open_window(now + TIMEOUT).is_none());
        assert!(matches!(list.undo(now + TIMEOUT), Err(BrowseError::NothingToUndo)));
        assert_eq!(ids(&list), vec!["b"]);
        assert_eq!(test_db.db().count_saved(), 1);
    }

    #[test]
    fn test_second_edit_forfeits_first_window() {
        let test_db = saved_db(&["a", "b", "c"]);
        let mut list = SavedList::load(test_db.db(), TIMEOUT).unwrap();
        let now = Instant::now();

        list.remove(0, now).unwrap();
        list.remove(0, now).unwrap();
        list.undo(now).unwrap();

        assert_eq!(ids(&list), vec!["b", "c"]);
        assert!(matches!(list.undo(now), Err(BrowseError::NothingToUndo)));
    }

    #[test]
    fn test_undo_clamps_position_to_list_end() {
        let test_db = saved_db(&["a", "b"]);
        let mut list = SavedList::load(test_db.db(), TIMEOUT).unwrap();
        let now = Instant::now();

        list.remove(1, now).unwrap();
        let kept = list.window.take().unwrap();
        list.remove(0, now).unwrap();
        list.window = Some(kept);
        list.undo(now).unwrap();

        assert_eq!(ids(&list), vec!["b"]);
    }

    #[test]
    fn test_remove_past_end_changes_nothing() {
        let test_db = saved_db(&["a"]);
        let mut list = SavedList::load(test_db.db(), TIMEOUT).unwrap();

        assert!(matches!(list.remove(3, Instant::now()), Err(BrowseError::NoSuchPosition(3))));
        assert_eq!(list.len(), 1);
        assert_eq!(test_db.db().count_saved(), 1);
    }

    #[test]
    fn test_add_to_collection_and_undo() {
        let test_db = saved_db(&["a"]);
        let db = test_db.db();
        db.create_collection("faves").unwrap();
        let mut list = SavedList::load(db, TIMEOUT).unwrap();
        let now = Instant::now();

        assert!(list.add_to_collection(0, "faves", now).unwrap());
        assert!(!list.add_to_collection(0, "faves", now).unwrap());
        assert_eq!(db.get_collection("faves").unwrap().unwrap().book_ids, vec!["a"]);

        let reverted = list.undo(now).unwrap();
        assert_eq!(reverted.action, SavedEdit::AddedTo("faves".into()));
        assert!(db.get_collection("faves").unwrap().unwrap().is_empty());
        assert_eq!(ids(&list), vec!["a"]);
    }

    #[test]
    fn test_add_to_unknown_collection_opens_no_window() {
        let test_db = saved_db(&["a"]);
        let mut list = SavedList::load(test_db.db(), TIMEOUT).unwrap();
        let now = Instant::now();

        let result = list.add_to_collection(0, "nope", now);
        assert!(matches!(result, Err(BrowseError::Database(_))));
        assert!(list.open_window(now).is_none());
    }
}
