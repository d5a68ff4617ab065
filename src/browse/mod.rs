//! Browse module - the card-stack core of bookmatch
//!
//! This module holds the browsing state machine and the decision logic. It is
//! UI-agnostic: a presentation layer reads the queue, subscribes to events and
//! feeds decisions back, but never mutates the queue itself.
//!
//! # Architecture
//!
//! - `queue`: Ordered candidates and the cursor over them
//! - `decision`: Decisions, their store mutations and the recorder
//! - `undo`: The single, time-limited undo window
//! - `saved`: The saved list with undoable removal and collection edits
//! - `session`: Owner of queue, recorder and background worker
//! - `events`: Observer contract for presentation layers
//! - `worker`: rayon pools running fetches and store writes

pub mod decision;
pub mod error;
pub mod events;
pub mod queue;
pub mod saved;
pub mod session;
pub mod undo;
mod worker;

pub use decision::{AppliedDecision, Decision, DecisionRecorder, RevertedDecision, StoreMutation};
pub use error::{BrowseError, Result};
pub use events::{EventBus, SessionEvent};
pub use queue::{BrowseQueue, QueueState};
pub use saved::{SavedEdit, SavedList};
pub use session::{BrowseSession, SessionSettings};
pub use undo::UndoWindow;
