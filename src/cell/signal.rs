//! Built-in state cell with change subscriptions.

use crate::error::Result;
use crate::subscriptions::{SubscriptionConfig, SubscriptionHandle, SubscriptionId, SubscriptionManager};
use crate::types::Version;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

use super::StateCell;

/// A state cell that notifies subscribers on every publish.
pub struct Signal<T> {
    value: RwLock<Arc<T>>,
    version: AtomicU64,
    subscriptions: SubscriptionManager<T>,
}

impl<T> Signal<T> {
    /// Create a signal holding `initial` at version 0.
    pub fn new(initial: T) -> Self {
        Self {
            value: RwLock::new(Arc::new(initial)),
            version: AtomicU64::new(0),
            subscriptions: SubscriptionManager::new(),
        }
    }

    /// Subscribe to changes.
    pub fn subscribe(&self, config: SubscriptionConfig) -> Result<SubscriptionHandle<T>> {
        // Held across registration so no publish falls between the
        // snapshot and the subscriber joining the broadcast set.
        let value = self.value.read();
        self.subscriptions
            .subscribe(config, || (Arc::clone(&value), self.version()))
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.unsubscribe(id);
    }

    /// Get subscription count.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.subscription_count()
    }
}

impl<T> StateCell<T> for Signal<T> {
    fn get(&self) -> Arc<T> {
        Arc::clone(&self.value.read())
    }

    fn version(&self) -> Version {
        Version(self.version.load(Ordering::SeqCst))
    }

    fn try_update<E, F>(&self, f: F) -> std::result::Result<Version, E>
    where
        F: FnOnce(&Arc<T>) -> std::result::Result<T, E>,
    {
        let (published, version) = {
            let mut current = self.value.write();
            let next = Arc::new(f(&*current)?);
            *current = Arc::clone(&next);
            let version = Version(self.version.fetch_add(1, Ordering::SeqCst) + 1);
            (next, version)
        };

        trace!(%version, "signal published");
        // Notify outside the lock so receivers may read the cell
        self.subscriptions.broadcast_changed(&published, version);

        Ok(version)
    }
}

impl<T: Default> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
