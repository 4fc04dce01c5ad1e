//! Subscription manager for broadcasting cell changes.

use crate::error::{ArrayStateError, Result};
use crate::types::Version;
use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

use super::types::{CellEvent, DropReason, SubscriptionConfig, SubscriptionHandle, SubscriptionId};

/// Internal subscription state.
struct Subscription<T> {
    sender: Sender<CellEvent<T>>,
}

impl<T> Subscription<T> {
    /// Try to send an event. On failure, returns why the subscriber must be dropped.
    fn try_send(&self, event: CellEvent<T>) -> std::result::Result<(), DropReason> {
        match self.sender.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(DropReason::BufferOverflow),
            Err(TrySendError::Disconnected(_)) => Err(DropReason::Disconnected),
        }
    }
}

/// Manages subscriptions and broadcasts events.
pub struct SubscriptionManager<T> {
    /// Active subscriptions by ID.
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription<T>>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
}

impl<T> SubscriptionManager<T> {
    /// Create a new subscription manager.
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a new subscription.
    ///
    /// `initial` is delivered first when the config asks for it. Fails with
    /// `SubscriptionDropped` if the buffer cannot hold it.
    pub fn subscribe(
        &self,
        config: SubscriptionConfig,
        initial: impl FnOnce() -> (Arc<T>, Version),
    ) -> Result<SubscriptionHandle<T>> {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(config.buffer_size);
        let subscription = Subscription { sender };

        if config.emit_initial {
            let (value, version) = initial();
            if subscription
                .try_send(CellEvent::Snapshot { value, version })
                .is_err()
            {
                return Err(ArrayStateError::SubscriptionDropped);
            }
        }

        self.subscriptions.write().insert(id, subscription);

        Ok(SubscriptionHandle { id, receiver })
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subs = self.subscriptions.write();
        if let Some(sub) = subs.remove(&id) {
            // Best effort
            let _ = sub.try_send(CellEvent::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    /// Get subscription count.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Broadcast a newly published value to every subscriber.
    pub fn broadcast_changed(&self, value: &Arc<T>, version: Version) {
        let mut to_remove = Vec::new();

        {
            let subs = self.subscriptions.read();
            for (id, sub) in subs.iter() {
                let event = CellEvent::Changed {
                    value: Arc::clone(value),
                    version,
                };
                if let Err(reason) = sub.try_send(event) {
                    to_remove.push((*id, reason));
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscriptions.write();
            for (id, reason) in to_remove {
                if let Some(sub) = subs.remove(&id) {
                    warn!(subscription = id.0, ?reason, "dropping subscriber");
                    // Might fail, that's ok
                    let _ = sub.try_send(CellEvent::Dropped { reason });
                }
            }
        }
    }
}

impl<T> Default for SubscriptionManager<T> {
    fn default() -> Self {
        Self::new()
    }
}
