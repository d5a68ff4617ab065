//! Session events
//!
//! Sessions publish what happened to every subscriber over `mpsc` channels,
//! so a presentation layer on any thread can follow along without touching
//! the queue. Subscribers that hang up are dropped on the next emit.

use super::decision::Decision;
use super::queue::QueueState;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

/// Something observable happened in a browse session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Queue contents or cursor changed
    QueueChanged {
        len: usize,
        cursor: usize,
        state: QueueState,
    },
    /// A decision was applied to the queue (its store write may still be pending)
    DecisionApplied { book_id: String, decision: Decision },
    /// The decision can be undone for `expires_in`
    UndoAvailable {
        book_id: String,
        decision: Decision,
        expires_in: Duration,
    },
    /// A decision was reverted
    UndoApplied { book_id: String, decision: Decision },
    /// The catalog could not deliver a page for the active genre
    FetchFailed { genre: String, message: String },
    /// A store write failed; the queue keeps its state
    StoreFailed { book_id: String, message: String },
}

/// Fan-out of session events to subscribers
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<SessionEvent>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, event: &SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
