//! Background execution for catalog fetches and store writes
//!
//! Jobs run on rayon pools and report back over a channel; the owning session
//! applies completions on its own thread when it pumps. Fetches share a small
//! pool. Store writes go through a single-threaded pool with FIFO spawning so
//! a write and its undo reach the store in the order they were issued.

use super::decision::StoreMutation;
use super::error::Result;
use crate::Book;
use crate::catalog::{CatalogPage, CatalogSource, FetchError, PageToken};
use crate::db::{DbError, LocalStore};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;
use tracing::warn;

/// Outcome of one background job
#[derive(Debug)]
pub enum Completion {
    Fetched {
        epoch: u64,
        genre: String,
        page: PageToken,
        result: std::result::Result<CatalogPage, FetchError>,
    },
    Stored {
        mutation: StoreMutation,
        result: std::result::Result<(), DbError>,
    },
}

/// A page request tagged with the genre epoch it belongs to
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub epoch: u64,
    pub genre: String,
    pub page: PageToken,
}

pub struct Worker {
    fetch_pool: ThreadPool,
    store_pool: ThreadPool,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    in_flight: usize,
    alive: Arc<AtomicBool>,
}

impl Worker {
    /// # Errors
    ///
    /// Returns `BrowseError::WorkerPool` if a thread pool cannot be built.
    pub fn new(fetch_threads: usize) -> Result<Self> {
        let fetch_pool = ThreadPoolBuilder::new()
            .num_threads(fetch_threads.max(1))
            .thread_name(|i| format!("bookmatch-fetch-{i}"))
            .build()?;
        let store_pool = ThreadPoolBuilder::new()
            .num_threads(1)
            .thread_name(|_| "bookmatch-store".to_string())
            .build()?;
        let (sender, receiver) = mpsc::channel();

        Ok(Self {
            fetch_pool,
            store_pool,
            sender,
            receiver,
            in_flight: 0,
            alive: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Fetch a page and drop the books the store already has a decision for
    pub fn fetch(
        &mut self,
        catalog: Arc<dyn CatalogSource>,
        store: Arc<dyn LocalStore>,
        request: FetchRequest,
    ) {
        let sender = self.sender.clone();
        let alive = Arc::clone(&self.alive);
        self.in_flight += 1;

        self.fetch_pool.spawn(move || {
            let result = if alive.load(Ordering::Acquire) {
                catalog
                    .fetch_books(&request.genre, Some(request.page))
                    .map(|page| without_decided(page, store.as_ref()))
            } else {
                Err(FetchError::Unavailable("session closed".into()))
            };
            // Release the handles before reporting so a settled session holds the only ones.
            drop(catalog);
            drop(store);

            // The session may be gone already; nobody is left to tell.
            let _ = sender.send(Completion::Fetched {
                epoch: request.epoch,
                genre: request.genre,
                page: request.page,
                result,
            });
        });
    }

    /// Run a store write; writes always run, even after the session closed
    pub fn store(&mut self, store: Arc<dyn LocalStore>, mutation: StoreMutation) {
        let sender = self.sender.clone();
        self.in_flight += 1;

        self.store_pool.spawn_fifo(move || {
            let result = mutation.apply(store.as_ref());
            drop(store);
            let _ = sender.send(Completion::Stored { mutation, result });
        });
    }

    /// Next finished job, if any, without blocking
    pub fn try_next(&mut self) -> Option<Completion> {
        let completion = self.receiver.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(completion)
    }

    /// Next finished job, waiting at most `timeout`
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<Completion> {
        match self.receiver.recv_timeout(timeout) {
            Ok(completion) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(completion)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Jobs submitted whose completion has not been received yet
    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Mark the owner as torn down; pending fetches are skipped
    pub fn shut_down(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

fn without_decided(mut page: CatalogPage, store: &dyn LocalStore) -> CatalogPage {
    page.books.retain(|book: &Book| match store.get(&book.id) {
        Ok(Some(stored)) => !stored.saved.is_decided(),
        Ok(None) => true,
        Err(e) => {
            warn!(book_id = %book.id, error = %e, "could not check stored decision");
            true
        }
    });
    page
}
