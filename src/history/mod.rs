//! In-memory history of prior container states.
//!
//! The log is seeded once with the container's default value and gains one
//! entry per mutating call, holding the value as it was *before* that call.
//! It lives as long as the container and is never persisted.

mod log;

pub use log::{HistoryEntry, HistoryLog};
