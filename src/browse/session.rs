//! Browse session management
//!
//! A `BrowseSession` owns everything the explore screen needs: the queue of
//! candidates for the active genre, the decision recorder with its undo
//! window, and the background worker talking to the catalog and the store.
//!
//! # Workflow
//!
//! ```text
//! set_genre(g) ── epoch += 1, queue cleared, fetch page 1 ──┐
//!                                                           ↓
//! ┌─→ pump() ── apply completions (stale epochs dropped) ── append_books()
//! │       ↓                                                  │
//! │   current() → presentation                               ↓
//! │       ↓                                        remaining <= threshold?
//! │   decide(book, d) / undo()                        └─ fetch next page
//! └───────┘
//! ```
//!
//! Every mutation happens on the owner's thread through `&mut self`. Fetches
//! and store writes only report back through `pump()`/`settle()`, and only
//! while the session is alive.

use super::decision::{AppliedDecision, Decision, DecisionRecorder, RevertedDecision, StoreMutation};
use super::error::{BrowseError, Result};
use super::events::{EventBus, SessionEvent};
use super::queue::{BrowseQueue, QueueState};
use super::undo::UndoWindow;
use super::worker::{Completion, FetchRequest, Worker};
use crate::Book;
use crate::catalog::{CatalogSource, PageToken, normalize_genre};
use crate::config::BrowseConfig;
use crate::db::LocalStore;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Tunables of a browse session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Fetch the next page once this many books (or fewer) are left
    pub prefetch_threshold: usize,
    /// How long a decision stays undoable
    pub undo_timeout: Duration,
    /// Threads used for catalog fetches
    pub fetch_threads: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            prefetch_threshold: 5,
            undo_timeout: Duration::from_millis(3_000),
            fetch_threads: 2,
        }
    }
}

impl From<&BrowseConfig> for SessionSettings {
    fn from(config: &BrowseConfig) -> Self {
        Self {
            prefetch_threshold: config.prefetch_threshold,
            undo_timeout: Duration::from_millis(config.undo_timeout_ms),
            fetch_threads: config.fetch_threads,
        }
    }
}

/// Browse session - owns the queue, the undo window and the background worker
pub struct BrowseSession {
    catalog: Arc<dyn CatalogSource>,
    store: Arc<dyn LocalStore>,
    settings: SessionSettings,
    genre: Option<String>,
    /// Incremented by every genre change; fetches carry the epoch they were issued in
    epoch: u64,
    queue: BrowseQueue,
    recorder: DecisionRecorder,
    next_page: Option<PageToken>,
    fetch_in_flight: bool,
    /// Page whose fetch failed, kept for `retry()`
    failed_page: Option<PageToken>,
    worker: Worker,
    events: EventBus,
    /// Ids liked or rejected in this session, whether or not their write has landed
    decided: HashSet<String>,
}

impl BrowseSession {
    /// Create a session with no genre selected
    ///
    /// # Errors
    ///
    /// Returns `BrowseError::WorkerPool` if the worker threads cannot be started.
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        store: Arc<dyn LocalStore>,
        settings: SessionSettings,
    ) -> Result<Self> {
        let worker = Worker::new(settings.fetch_threads)?;
        Ok(Self {
            catalog,
            store,
            recorder: DecisionRecorder::new(settings.undo_timeout),
            settings,
            genre: None,
            epoch: 0,
            queue: BrowseQueue::new(),
            next_page: None,
            fetch_in_flight: false,
            failed_page: None,
            worker,
            events: EventBus::new(),
            decided: HashSet::new(),
        })
    }

    /// Switch to `genre`: clear the queue and fetch its first page
    ///
    /// Results of fetches issued for the previous genre are ignored from now
    /// on, and any pending undo becomes final. A blank genre only clears.
    pub fn set_genre(&mut self, genre: &str) {
        if !self.worker.is_alive() {
            debug!(genre, "ignoring genre change on closed session");
            return;
        }

        let genre = normalize_genre(genre);
        self.epoch += 1;
        self.queue.clear();
        self.recorder.close();
        self.next_page = None;
        self.fetch_in_flight = false;
        self.failed_page = None;

        if genre.is_empty() {
            self.genre = None;
        } else {
            info!(genre = %genre, epoch = self.epoch, "genre changed");
            self.genre = Some(genre);
        }

        self.emit_queue_changed();
        if self.genre.is_some() {
            self.request_page(PageToken::FIRST);
        }
    }

    /// Append books to the queue, skipping ones already seen this session
    ///
    /// Returns how many were added. The cursor does not move.
    pub fn append_books(&mut self, batch: Vec<Book>) -> usize {
        let added = self.queue.append(batch);
        if added > 0 {
            self.emit_queue_changed();
        }
        self.maybe_prefetch();
        added
    }

    /// The book on top of the stack, `None` when the queue is exhausted
    #[must_use]
    pub fn current(&self) -> Option<&Book> {
        self.queue.current()
    }

    /// Move past the current book without deciding on it
    pub fn advance(&mut self) {
        if self.queue.advance() {
            self.emit_queue_changed();
            self.maybe_prefetch();
        }
    }

    /// Drop the current book from the queue without deciding on it
    pub fn remove_current(&mut self) -> Option<Book> {
        let removed = self.queue.remove_current();
        if removed.is_some() {
            self.emit_queue_changed();
            self.maybe_prefetch();
        }
        removed
    }

    /// Apply `decision` to `book`, which must be the current book
    ///
    /// The queue changes immediately; the store write runs in the background
    /// and its failure is reported as `SessionEvent::StoreFailed`.
    ///
    /// # Errors
    ///
    /// Returns `BrowseError::StaleDecision` if `book` is not the current book
    /// and `BrowseError::SessionClosed` after `close()`.
    pub fn decide(&mut self, book: &Book, decision: Decision) -> Result<AppliedDecision> {
        self.ensure_alive()?;
        let now = Instant::now();
        let applied = self.recorder.record(&mut self.queue, book, decision, now)?;
        debug!(book_id = %applied.book.id, %decision, position = applied.position, "decision applied");

        if let Some(mutation) = applied.mutation.clone() {
            self.decided.insert(applied.book.id.clone());
            self.submit_write(mutation);
        }

        self.emit_queue_changed();
        self.events.emit(&SessionEvent::DecisionApplied {
            book_id: applied.book.id.clone(),
            decision,
        });
        self.events.emit(&SessionEvent::UndoAvailable {
            book_id: applied.book.id.clone(),
            decision,
            expires_in: applied.undo_deadline.saturating_duration_since(now),
        });
        self.maybe_prefetch();
        Ok(applied)
    }

    /// Revert the last decision if its undo window is still open
    ///
    /// # Errors
    ///
    /// Returns `BrowseError::NothingToUndo` when there is no open window and
    /// `BrowseError::SessionClosed` after `close()`.
    pub fn undo(&mut self) -> Result<RevertedDecision> {
        self.undo_at(Instant::now())
    }

    /// `undo()` evaluated at an explicit instant
    ///
    /// # Errors
    ///
    /// Same as [`BrowseSession::undo`].
    pub fn undo_at(&mut self, now: Instant) -> Result<RevertedDecision> {
        self.ensure_alive()?;
        let reverted = self.recorder.undo(&mut self.queue, now)?;
        debug!(book_id = %reverted.book.id, decision = %reverted.decision, "decision reverted");

        if let Some(mutation) = reverted.mutation.clone() {
            if !reverted.book.saved.is_decided() {
                self.decided.remove(&reverted.book.id);
            }
            self.submit_write(mutation);
        }

        self.emit_queue_changed();
        self.events.emit(&SessionEvent::UndoApplied {
            book_id: reverted.book.id.clone(),
            decision: reverted.decision,
        });
        Ok(reverted)
    }

    /// Re-issue the fetch that failed last, if any
    ///
    /// Returns `true` when a fetch was started.
    pub fn retry(&mut self) -> bool {
        if !self.worker.is_alive() || self.fetch_in_flight {
            return false;
        }
        match self.failed_page.take() {
            Some(page) => {
                self.request_page(page);
                true
            }
            None => false,
        }
    }

    /// Apply every finished background job without blocking
    ///
    /// Returns the number of completions received.
    pub fn pump(&mut self) -> usize {
        let mut received = 0;
        while let Some(completion) = self.worker.try_next() {
            self.apply(completion);
            received += 1;
        }
        received
    }

    /// Block until no background job is in flight or `timeout` elapses
    ///
    /// Follow-up fetches triggered while settling are waited for too.
    /// Returns `true` if the session is idle.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.worker.in_flight() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.worker.next_timeout(remaining) {
                Some(completion) => self.apply(completion),
                None => break,
            }
        }
        self.is_idle()
    }

    /// Subscribe to session events
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Tear the session down; later async results are discarded
    ///
    /// Store writes already issued still reach the store.
    pub fn close(&mut self) {
        if self.worker.is_alive() {
            debug!(epoch = self.epoch, "closing browse session");
            self.worker.shut_down();
            self.recorder.close();
        }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.worker.is_alive()
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.worker.in_flight() == 0
    }

    #[must_use]
    pub const fn is_fetching(&self) -> bool {
        self.fetch_in_flight
    }

    /// Whether the last fetch failed and `retry()` would do something
    #[must_use]
    pub const fn fetch_failed(&self) -> bool {
        self.failed_page.is_some()
    }

    /// Whether the catalog may still have more books for the genre
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.next_page.is_some() || self.fetch_in_flight
    }

    #[must_use]
    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub const fn queue(&self) -> &BrowseQueue {
        &self.queue
    }

    #[must_use]
    pub fn state(&self) -> QueueState {
        self.queue.state()
    }

    /// The undo window if it is still open
    #[must_use]
    pub fn undo_window(&self) -> Option<&UndoWindow> {
        self.recorder.open_window(Instant::now())
    }

    #[must_use]
    pub const fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.worker.is_alive() {
            Ok(())
        } else {
            Err(BrowseError::SessionClosed)
        }
    }

    fn request_page(&mut self, page: PageToken) {
        let Some(genre) = self.genre.clone() else {
            return;
        };
        debug!(genre = %genre, page = page.number(), epoch = self.epoch, "requesting catalog page");
        self.fetch_in_flight = true;
        self.failed_page = None;
        self.worker.fetch(
            Arc::clone(&self.catalog),
            Arc::clone(&self.store),
            FetchRequest {
                epoch: self.epoch,
                genre,
                page,
            },
        );
    }

    fn maybe_prefetch(&mut self) {
        if self.fetch_in_flight || self.failed_page.is_some() {
            return;
        }
        if self.queue.remaining() > self.settings.prefetch_threshold {
            return;
        }
        if let Some(page) = self.next_page {
            self.request_page(page);
        }
    }

    fn submit_write(&mut self, mutation: StoreMutation) {
        self.worker.store(Arc::clone(&self.store), mutation);
    }

    fn apply(&mut self, completion: Completion) {
        if !self.worker.is_alive() {
            debug!("discarding completion for closed session");
            return;
        }

        match completion {
            Completion::Fetched {
                epoch,
                genre,
                page,
                result,
            } => {
                if epoch != self.epoch {
                    debug!(genre = %genre, epoch, current = self.epoch, "discarding stale fetch result");
                    return;
                }
                self.fetch_in_flight = false;

                match result {
                    Ok(catalog_page) => {
                        debug!(
                            genre = %genre,
                            page = page.number(),
                            books = catalog_page.books.len(),
                            "catalog page received"
                        );
                        self.next_page = catalog_page.next_page;
                        let fresh: Vec<Book> = catalog_page
                            .books
                            .into_iter()
                            .filter(|book| !self.decided.contains(&book.id))
                            .collect();
                        self.append_books(fresh);
                    }
                    Err(e) => {
                        warn!(genre = %genre, page = page.number(), error = %e, "catalog fetch failed");
                        self.failed_page = Some(page);
                        self.events.emit(&SessionEvent::FetchFailed {
                            genre,
                            message: e.to_string(),
                        });
                    }
                }
            }
            Completion::Stored { mutation, result } => {
                if let Err(e) = result {
                    warn!(book_id = %mutation.book_id(), error = %e, "store write failed");
                    self.events.emit(&SessionEvent::StoreFailed {
                        book_id: mutation.book_id().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    fn emit_queue_changed(&mut self) {
        let event = SessionEvent::QueueChanged {
            len: self.queue.len(),
            cursor: self.queue.cursor(),
            state: self.queue.state(),
        };
        self.events.emit(&event);
    }
}

impl Drop for BrowseSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SavedState;
    use crate::catalog::StaticCatalog;
    use crate::testing::{
        FailingCatalog, FailingStore, RecordingCatalog, SlowStore, TestDb, book, books, numbered_books,
    };

    const WAIT: Duration = Duration::from_secs(5);

    fn settings() -> SessionSettings {
        SessionSettings {
            prefetch_threshold: 0,
            undo_timeout: Duration::from_secs(30),
            fetch_threads: 2,
        }
    }

    fn session_with(catalog: StaticCatalog, test_db: &TestDb) -> BrowseSession {
        BrowseSession::new(Arc::new(catalog), test_db.store(), settings()).unwrap()
    }

    fn queue_ids(session: &BrowseSession) -> Vec<String> {
        session.queue().books().iter().map(|b| b.id.clone()).collect()
    }

    fn abc_session(test_db: &TestDb) -> BrowseSession {
        let catalog = StaticCatalog::new(10).with_genre("fantasy", books(&["A", "B", "C"]));
        let mut session = session_with(catalog, test_db);
        session.set_genre("fantasy");
        assert!(session.settle(WAIT));
        session
    }

    #[test]
    fn test_new_session_is_empty() {
        let test_db = TestDb::new();
        let session = session_with(StaticCatalog::new(10), &test_db);

        assert_eq!(session.state(), QueueState::Empty);
        assert!(session.current().is_none());
        assert!(session.genre().is_none());
        assert!(session.is_idle());
    }

    #[test]
    fn test_set_genre_loads_first_page() {
        let test_db = TestDb::new();
        let session = abc_session(&test_db);

        assert_eq!(session.genre(), Some("fantasy"));
        assert_eq!(session.state(), QueueState::Populated);
        assert_eq!(queue_ids(&session), vec!["A", "B", "C"]);
        assert_eq!(session.current().unwrap().id, "A");
    }

    #[test]
    fn test_like_scenario() {
        let test_db = TestDb::new();
        let mut session = abc_session(&test_db);

        let a = session.current().cloned().unwrap();
        session.decide(&a, Decision::Like).unwrap();

        assert_eq!(session.queue().cursor(), 1);
        assert_eq!(session.current().unwrap().id, "B");
        let window = session.undo_window().unwrap();
        assert_eq!(window.position, 0);
        assert_eq!(window.book.id, "A");

        assert!(session.settle(WAIT));
        let stored = test_db.db().get("A").unwrap().unwrap();
        assert_eq!(stored.saved, SavedState::Saved);
    }

    #[test]
    fn test_delete_scenario() {
        let test_db = TestDb::new();
        let mut session = abc_session(&test_db);
        session.advance();

        session.decide(&book("B"), Decision::Delete).unwrap();

        assert_eq!(queue_ids(&session), vec!["A", "C"]);
        assert_eq!(session.queue().cursor(), 1);
        assert_eq!(session.current().unwrap().id, "C");

        assert!(session.settle(WAIT));
        assert_eq!(test_db.db().get("B").unwrap().unwrap().saved, SavedState::Rejected);
    }

    #[test]
    fn test_delete_then_undo_round_trip() {
        let test_db = TestDb::new();
        let mut session = abc_session(&test_db);
        session.advance();
        let queue_before = queue_ids(&session);
        let cursor_before = session.queue().cursor();

        session.decide(&book("B"), Decision::Delete).unwrap();
        session.undo().unwrap();

        assert_eq!(queue_ids(&session), queue_before);
        assert_eq!(session.queue().cursor(), cursor_before);
        assert_eq!(session.current().unwrap().id, "B");

        assert!(session.settle(WAIT));
        assert_eq!(test_db.db().count(), 0);
        assert_eq!(test_db.db().count_saved(), 0);
    }

    #[test]
    fn test_like_then_undo_clears_saved_flag() {
        let test_db = TestDb::new();
        let mut session = abc_session(&test_db);

        session.decide(&book("A"), Decision::Like).unwrap();
        session.undo().unwrap();

        assert!(session.settle(WAIT));
        assert_eq!(test_db.db().count_saved(), 0);
        assert!(!test_db.db().contains("A").unwrap());
        assert_eq!(session.current().unwrap().id, "A");
    }

    #[test]
    fn test_undo_expires() {
        let test_db = TestDb::new();
        let mut session = abc_session(&test_db);

        session.decide(&book("A"), Decision::Skip).unwrap();
        let later = Instant::now() + session.settings().undo_timeout;

        assert!(matches!(session.undo_at(later), Err(BrowseError::NothingToUndo)));
        assert!(matches!(session.undo(), Err(BrowseError::NothingToUndo)));
        assert_eq!(session.current().unwrap().id, "B");
    }

    #[test]
    fn test_undo_with_zero_timeout_fails() {
        let test_db = TestDb::new();
        let catalog = StaticCatalog::new(10).with_genre("fantasy", books(&["A", "B"]));
        let mut session = BrowseSession::new(
            Arc::new(catalog),
            test_db.store(),
            SessionSettings {
                undo_timeout: Duration::ZERO,
                ..settings()
            },
        )
        .unwrap();
        session.set_genre("fantasy");
        assert!(session.settle(WAIT));

        session.decide(&book("A"), Decision::Like).unwrap();
        assert!(session.undo_window().is_none());
        assert!(matches!(session.undo(), Err(BrowseError::NothingToUndo)));
    }

    #[test]
    fn test_skip_never_touches_store() {
        let test_db = TestDb::new();
        let mut session = abc_session(&test_db);
        let before = test_db.db().count_saved();

        for id in ["A", "B", "C"] {
            session.decide(&book(id), Decision::Skip).unwrap();
        }
        assert!(session.settle(WAIT));

        assert_eq!(test_db.db().count_saved(), before);
        assert_eq!(test_db.db().count(), 0);
        assert_eq!(session.state(), QueueState::Exhausted);
    }

    #[test]
    fn test_stale_decision_is_rejected() {
        let test_db = TestDb::new();
        let mut session = abc_session(&test_db);

        session.decide(&book("A"), Decision::Like).unwrap();
        let result = session.decide(&book("A"), Decision::Like);

        assert!(matches!(result, Err(BrowseError::StaleDecision { .. })));
        assert_eq!(session.current().unwrap().id, "B");
    }

    #[test]
    fn test_stale_genre_result_is_discarded() {
        let test_db = TestDb::new();
        let catalog = StaticCatalog::new(10)
            .with_genre("fantasy", books(&["F1", "F2"]))
            .with_genre("horror", books(&["H1"]));
        let mut session = session_with(catalog, &test_db);

        session.set_genre("fantasy");
        // Nothing is applied until the owner pumps, so the fantasy page is
        // guaranteed to arrive after the switch.
        session.set_genre("horror");
        assert!(session.settle(WAIT));

        assert_eq!(session.genre(), Some("horror"));
        assert_eq!(queue_ids(&session), vec!["H1"]);
    }

    #[test]
    fn test_set_genre_clears_queue_and_undo() {
        let test_db = TestDb::new();
        let mut session = abc_session(&test_db);
        session.decide(&book("A"), Decision::Like).unwrap();

        let epoch = session.epoch();
        session.set_genre("unknown");
        assert_eq!(session.epoch(), epoch + 1);
        assert_eq!(session.queue().len(), 0);
        assert_eq!(session.queue().cursor(), 0);
        assert!(session.undo_window().is_none());
        assert!(matches!(session.undo(), Err(BrowseError::NothingToUndo)));
    }

    #[test]
    fn test_blank_genre_does_not_fetch() {
        let test_db = TestDb::new();
        let mut session = session_with(StaticCatalog::new(10), &test_db);

        session.set_genre("   ");
        assert!(session.genre().is_none());
        assert!(!session.is_fetching());
        assert!(session.is_idle());
    }

    #[test]
    fn test_append_books_deduplicates() {
        let test_db = TestDb::new();
        let mut session = abc_session(&test_db);

        assert_eq!(session.append_books(books(&["C", "D"])), 1);
        assert_eq!(session.queue().len(), 4);
    }

    #[test]
    fn test_late_page_revives_exhausted_queue() {
        let test_db = TestDb::new();
        let mut session = abc_session(&test_db);
        for id in ["A", "B", "C"] {
            session.decide(&book(id), Decision::Skip).unwrap();
        }
        assert_eq!(session.state(), QueueState::Exhausted);

        session.append_books(books(&["D"]));
        assert_eq!(session.state(), QueueState::Populated);
        assert_eq!(session.queue().cursor(), 3);
        assert_eq!(session.current().unwrap().id, "D");
    }

    #[test]
    fn test_prefetch_near_tail() {
        let test_db = TestDb::new();
        let catalog = StaticCatalog::new(3).with_genre("fantasy", numbered_books("f", 7));
        let mut session = BrowseSession::new(
            Arc::new(catalog),
            test_db.store(),
            SessionSettings {
                prefetch_threshold: 1,
                ..settings()
            },
        )
        .unwrap();

        session.set_genre("fantasy");
        assert!(session.settle(WAIT));
        assert_eq!(session.queue().len(), 3);

        session.advance();
        assert!(!session.is_fetching());
        session.advance();
        assert!(session.is_fetching());
        assert!(session.settle(WAIT));
        assert_eq!(session.queue().len(), 6);
        assert_eq!(session.queue().cursor(), 2);
    }

    #[test]
    fn test_prefetch_stops_at_catalog_end() {
        let test_db = TestDb::new();
        let catalog = RecordingCatalog::new(StaticCatalog::new(2).with_genre("x", numbered_books("x", 3)));
        let calls = catalog.calls();
        let mut session = BrowseSession::new(
            Arc::new(catalog),
            test_db.store(),
            SessionSettings {
                prefetch_threshold: 5,
                ..settings()
            },
        )
        .unwrap();

        session.set_genre("x");
        assert!(session.settle(WAIT));

        assert_eq!(session.queue().len(), 3);
        assert!(!session.has_more());
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_decided_books_are_not_offered() {
        let test_db = TestDb::new();
        test_db.db().upsert(&book("B").with_state(SavedState::Saved)).unwrap();
        let session = abc_session(&test_db);

        assert_eq!(queue_ids(&session), vec!["A", "C"]);
    }

    #[test]
    fn test_fetch_failure_keeps_state_and_reports() {
        let test_db = TestDb::new();
        let mut session =
            BrowseSession::new(Arc::new(FailingCatalog), test_db.store(), settings()).unwrap();
        let events = session.subscribe();

        session.set_genre("fantasy");
        assert!(session.settle(WAIT));

        assert_eq!(session.state(), QueueState::Empty);
        assert!(session.fetch_failed());
        let failed = events
            .try_iter()
            .find(|event| matches!(event, SessionEvent::FetchFailed { .. }));
        assert!(matches!(failed, Some(SessionEvent::FetchFailed { genre, .. }) if genre == "fantasy"));
    }

    #[test]
    fn test_retry_after_failure() {
        let test_db = TestDb::new();
        let mut session =
            BrowseSession::new(Arc::new(FailingCatalog), test_db.store(), settings()).unwrap();
        assert!(!session.retry());

        session.set_genre("fantasy");
        assert!(session.settle(WAIT));
        assert!(session.retry());
        assert!(session.is_fetching());
        assert!(session.settle(WAIT));
        assert!(session.fetch_failed());
    }

    #[test]
    fn test_store_failure_does_not_roll_back() {
        let catalog = StaticCatalog::new(10).with_genre("fantasy", books(&["A", "B"]));
        let mut session =
            BrowseSession::new(Arc::new(catalog), Arc::new(FailingStore), settings()).unwrap();
        let events = session.subscribe();
        session.set_genre("fantasy");
        assert!(session.settle(WAIT));

        session.decide(&book("A"), Decision::Like).unwrap();
        assert!(session.settle(WAIT));

        assert_eq!(session.current().unwrap().id, "B");
        let failed = events
            .try_iter()
            .find(|event| matches!(event, SessionEvent::StoreFailed { .. }));
        assert!(matches!(failed, Some(SessionEvent::StoreFailed { book_id, .. }) if book_id == "A"));
    }

    #[test]
    fn test_decision_events() {
        let test_db = TestDb::new();
        let mut session = abc_session(&test_db);
        let events = session.subscribe();

        session.decide(&book("A"), Decision::Like).unwrap();
        session.undo().unwrap();

        let received: Vec<SessionEvent> = events.try_iter().collect();
        assert!(received.contains(&SessionEvent::DecisionApplied {
            book_id: "A".into(),
            decision: Decision::Like,
        }));
        assert!(received.iter().any(|event| matches!(
            event,
            SessionEvent::UndoAvailable { book_id, .. } if book_id == "A"
        )));
        assert!(received.contains(&SessionEvent::UndoApplied {
            book_id: "A".into(),
            decision: Decision::Like,
        }));
    }

    #[test]
    fn test_closed_session_discards_results() {
        let test_db = TestDb::new();
        let catalog = StaticCatalog::new(10).with_genre("fantasy", books(&["A"]));
        let mut session = session_with(catalog, &test_db);

        session.set_genre("fantasy");
        session.close();
        session.settle(WAIT);

        assert!(!session.is_alive());
        assert_eq!(session.queue().len(), 0);
        assert!(matches!(
            session.decide(&book("A"), Decision::Like),
            Err(BrowseError::SessionClosed)
        ));
    }

    #[test]
    fn test_writes_finish_after_close() {
        let test_db = TestDb::new();
        let mut session = abc_session(&test_db);

        session.decide(&book("A"), Decision::Like).unwrap();
        session.close();
        session.settle(WAIT);

        assert_eq!(test_db.db().count_saved(), 1);
    }

    fn slow_session(test_db: &TestDb) -> BrowseSession {
        let store = Arc::new(SlowStore::new(test_db.store(), Duration::from_millis(300)));
        let catalog = StaticCatalog::new(10).with_genre("fantasy", books(&["A", "B"]));
        let mut session = BrowseSession::new(Arc::new(catalog), store, settings()).unwrap();
        session.set_genre("fantasy");
        assert!(session.settle(WAIT));
        session
    }

    #[test]
    fn test_book_with_pending_write_is_not_offered_again() {
        let test_db = TestDb::new();
        let mut session = slow_session(&test_db);

        session.decide(&book("A"), Decision::Like).unwrap();
        session.set_genre("fantasy");
        assert!(session.settle(WAIT));

        assert_eq!(queue_ids(&session), vec!["B"]);
        assert_eq!(test_db.db().get("A").unwrap().unwrap().saved, SavedState::Saved);
    }

    #[test]
    fn test_undone_book_is_offered_again() {
        let test_db = TestDb::new();
        let mut session = slow_session(&test_db);

        session.decide(&book("A"), Decision::Delete).unwrap();
        session.undo().unwrap();
        assert!(session.settle(WAIT));
        session.set_genre("fantasy");
        assert!(session.settle(WAIT));

        assert_eq!(queue_ids(&session), vec!["A", "B"]);
        assert!(test_db.db().get("A").unwrap().is_none());
    }
}
