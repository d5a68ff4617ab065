//! Command implementations
//!
//! Each command is a function that takes parsed CLI args and executes the
//! operation against the database or a browse session.

pub mod collections;
pub mod explore;
pub mod library;
pub mod review;

pub use explore::execute as explore;
pub use library::{count, rejected, remove, reset, saved};
pub use review::execute as review;
