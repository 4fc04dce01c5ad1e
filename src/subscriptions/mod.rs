//! Subscription system for change notification.
//!
//! Every publish on a [`Signal`](crate::cell::Signal) is broadcast to its
//! subscribers, which is how a hosting view learns it needs to re-render.
//!
//! Subscriptions support:
//! - An optional initial snapshot of the current value
//! - Bounded buffers with slow-subscriber dropping
//!
//! # Example
//!
//! ```ignore
//! let signal = Signal::new(vec![1, 2, 3]);
//! let handle = signal.subscribe(SubscriptionConfig::default())?;
//!
//! signal.update(|v| v.iter().map(|x| x * 2).collect());
//!
//! loop {
//!     match handle.recv() {
//!         Ok(CellEvent::Snapshot { value, .. }) => println!("Initial: {:?}", value),
//!         Ok(CellEvent::Changed { value, version }) => println!("{}: {:?}", version, value),
//!         Ok(CellEvent::Dropped { .. }) | Err(_) => break,
//!     }
//! }
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{CellEvent, DropReason, SubscriptionConfig, SubscriptionHandle, SubscriptionId};
