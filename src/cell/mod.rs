//! Reactive state cells.
//!
//! A state cell holds one value and republishes it as a fresh `Arc` on every
//! change. Readers compare published values with `Arc::ptr_eq` to detect
//! change; a published value is never mutated afterwards.

mod signal;

pub use signal::Signal;

use crate::types::Version;
use std::convert::Infallible;
use std::sync::Arc;

/// The get/set primitive a container publishes through.
///
/// Hosts with their own reactive runtime implement this over their signal
/// type; [`Signal`] is the built-in implementation.
pub trait StateCell<T> {
    /// Current published value.
    fn get(&self) -> Arc<T>;

    /// Number of publishes so far.
    fn version(&self) -> Version;

    /// Compute the next value from the previous one and publish it.
    ///
    /// On `Err` nothing is published and the version is unchanged. `f` must
    /// not call back into the same cell.
    fn try_update<E, F>(&self, f: F) -> Result<Version, E>
    where
        F: FnOnce(&Arc<T>) -> Result<T, E>;

    /// Infallible form of [`try_update`](StateCell::try_update).
    fn update<F>(&self, f: F) -> Version
    where
        F: FnOnce(&T) -> T,
    {
        match self.try_update::<Infallible, _>(|prev| Ok(f(&**prev))) {
            Ok(version) => version,
            Err(never) => match never {},
        }
    }

    /// Publish `value`, discarding the previous one.
    fn set(&self, value: T) -> Version {
        self.update(|_| value)
    }
}
