//! Subscription types for change notification.

use crate::types::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for a subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Max buffered events before dropping subscriber.
    /// Default: 1000
    pub buffer_size: usize,

    /// Deliver the current value as a `Snapshot` event on subscribe.
    /// Default: true
    pub emit_initial: bool,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1000,
            emit_initial: true,
        }
    }
}

impl SubscriptionConfig {
    /// Live changes only, no initial snapshot.
    pub fn live() -> Self {
        Self {
            emit_initial: false,
            ..Default::default()
        }
    }
}

/// Events emitted by subscriptions.
pub enum CellEvent<T> {
    /// Value at the time of subscribing.
    Snapshot { value: Arc<T>, version: Version },

    /// A new value was published.
    Changed { value: Arc<T>, version: Version },

    /// Subscription was dropped.
    Dropped { reason: DropReason },
}

impl<T> CellEvent<T> {
    /// Version carried by the event, if any.
    pub fn version(&self) -> Option<Version> {
        match self {
            CellEvent::Snapshot { version, .. } | CellEvent::Changed { version, .. } => {
                Some(*version)
            }
            CellEvent::Dropped { .. } => None,
        }
    }
}

// Manual impls: `Arc<T>` is cloneable for every `T`.
impl<T> Clone for CellEvent<T> {
    fn clone(&self) -> Self {
        match self {
            CellEvent::Snapshot { value, version } => CellEvent::Snapshot {
                value: Arc::clone(value),
                version: *version,
            },
            CellEvent::Changed { value, version } => CellEvent::Changed {
                value: Arc::clone(value),
                version: *version,
            },
            CellEvent::Dropped { reason } => CellEvent::Dropped {
                reason: reason.clone(),
            },
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for CellEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellEvent::Snapshot { value, version } => f
                .debug_struct("Snapshot")
                .field("value", value)
                .field("version", version)
                .finish(),
            CellEvent::Changed { value, version } => f
                .debug_struct("Changed")
                .field("value", value)
                .field("version", version)
                .finish(),
            CellEvent::Dropped { reason } => {
                f.debug_struct("Dropped").field("reason", reason).finish()
            }
        }
    }
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Receiver was dropped.
    Disconnected,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to manage a subscription.
pub struct SubscriptionHandle<T> {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<CellEvent<T>>,
}

impl<T> SubscriptionHandle<T> {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<CellEvent<T>, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<CellEvent<T>, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<CellEvent<T>, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
