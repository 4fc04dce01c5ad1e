//! # Array State
//!
//! A reactive array container for view state: convenience mutations over a
//! `Vec<T>` held in a state cell, with an optional history of prior states
//! for debugging.
//!
//! ## Core Concepts
//!
//! - **State cells**: Every mutation publishes a freshly allocated value, so
//!   `Arc::ptr_eq` detects change
//! - **Operations**: push, update, remove, filter, clear
//! - **History**: Append-only log of pre-call snapshots tagged by operation
//! - **Subscriptions**: Bounded change feeds for re-rendering
//!
//! ## Example
//!
//! ```ignore
//! use array_state::{create, Options};
//!
//! let todos = create(vec!["write docs"], Options::with_history());
//!
//! todos.push("ship");
//! todos.update(0, "write more docs")?;
//! todos.remove(&"ship");
//! todos.filter(|item, _, _| !item.is_empty());
//!
//! println!("{:?}", todos.current());
//! println!("{}", todos.history().unwrap().to_json_pretty()?);
//! ```

pub mod cell;
pub mod container;
pub mod error;
pub mod history;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use cell::{Signal, StateCell};
pub use container::{create, ArrayState};
pub use error::{ArrayStateError, Result};
pub use history::{HistoryEntry, HistoryLog};
pub use subscriptions::{
    CellEvent, DropReason, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
    SubscriptionManager,
};
pub use types::*;
