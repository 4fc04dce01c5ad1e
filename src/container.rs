//! The array state container.

use crate::cell::{Signal, StateCell};
use crate::error::{ArrayStateError, Result};
use crate::history::HistoryLog;
use crate::subscriptions::{SubscriptionConfig, SubscriptionHandle, SubscriptionId};
use crate::types::{Operation, Options, Version};
use parking_lot::Mutex;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, warn};

/// Create a container over a fresh [`Signal`] holding `default`.
pub fn create<T>(default: Vec<T>, options: Options) -> ArrayState<T> {
    ArrayState::new(default, options)
}

/// A reactive `Vec<T>` with convenience mutations.
///
/// Every mutation copies the current sequence, transforms the copy and
/// publishes it through the cell, so each published value is a distinct
/// allocation. With `array_history` enabled, the value each call started
/// from is appended to the history log along with the call's tag.
pub struct ArrayState<T, C = Signal<Vec<T>>> {
    cell: C,
    options: Options,
    history: Option<Mutex<HistoryLog<T>>>,
    /// Keeps a publish and its history entry together.
    write_lock: Mutex<()>,
}

impl<T> ArrayState<T> {
    /// Create a container over a fresh [`Signal`] holding `default`.
    pub fn new(default: Vec<T>, options: Options) -> Self {
        Self::with_cell(Signal::new(default), options)
    }

    /// Subscribe to published values.
    pub fn subscribe(&self, config: SubscriptionConfig) -> Result<SubscriptionHandle<Vec<T>>> {
        self.cell.subscribe(config)
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.cell.unsubscribe(id);
    }

    /// Get subscription count.
    pub fn subscription_count(&self) -> usize {
        self.cell.subscription_count()
    }
}

impl<T, C: StateCell<Vec<T>>> ArrayState<T, C> {
    /// Create a container over a host-provided cell. The cell's current
    /// value is the default and seeds the history log.
    pub fn with_cell(cell: C, options: Options) -> Self {
        let history = options
            .array_history
            .then(|| Mutex::new(HistoryLog::new(cell.get(), cell.version())));

        Self {
            cell,
            options,
            history,
            write_lock: Mutex::new(()),
        }
    }

    /// The current published sequence.
    pub fn current(&self) -> Arc<Vec<T>> {
        self.cell.get()
    }

    pub fn len(&self) -> usize {
        self.cell.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell.get().is_empty()
    }

    pub fn version(&self) -> Version {
        self.cell.version()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The underlying state cell.
    pub fn cell(&self) -> &C {
        &self.cell
    }

    /// A copy of the history log, or `None` when history is disabled.
    pub fn history(&self) -> Option<HistoryLog<T>> {
        self.with_history(|log| log.clone())
    }

    /// Run `f` on the history log without copying it. `None` when history
    /// is disabled. The log stays locked while `f` runs, so `f` must not
    /// mutate this container or read its history.
    pub fn with_history<R>(&self, f: impl FnOnce(&HistoryLog<T>) -> R) -> Option<R> {
        self.history.as_ref().map(|log| f(&log.lock()))
    }

    /// Number of history entries (0 when history is disabled).
    pub fn history_len(&self) -> usize {
        self.with_history(|log| log.len()).unwrap_or(0)
    }

    /// Publish the sequence computed by `f` from the current one.
    fn apply<E, F>(&self, operation: Operation, f: F) -> std::result::Result<(), E>
    where
        F: FnOnce(&[T]) -> std::result::Result<Vec<T>, E>,
    {
        let _guard = self.write_lock.lock();

        // No cell lock is held while `f` runs, so it may read this container.
        let prior = self.cell.get();
        let prior_version = self.cell.version();
        let next = f(prior.as_slice())?;
        let len = next.len();

        let version = self
            .cell
            .try_update::<Infallible, _>(|_| Ok(next))
            .unwrap_or_else(|never| match never {});

        if let Some(history) = &self.history {
            history.lock().record(prior, operation, prior_version);
        }

        debug!(%operation, %version, len, "array published");
        Ok(())
    }

    fn publish<F>(&self, operation: Operation, f: F)
    where
        F: FnOnce(&[T]) -> Vec<T>,
    {
        match self.apply::<Infallible, _>(operation, |current| Ok(f(current))) {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// Publish an empty sequence.
    pub fn clear(&self) {
        self.publish(Operation::Clear, |_| Vec::new());
    }
}

impl<T: Clone, C: StateCell<Vec<T>>> ArrayState<T, C> {
    /// Append `elem`.
    pub fn push(&self, elem: T) {
        self.publish(Operation::Push, |current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend_from_slice(current);
            next.push(elem);
            next
        });
    }

    /// Replace the element at `index`.
    ///
    /// An index outside the sequence is rejected: nothing is published and
    /// nothing is recorded.
    pub fn update(&self, index: usize, new_value: T) -> Result<()> {
        self.apply(Operation::Update, |current| {
            if index >= current.len() {
                warn!(index, len = current.len(), "update index out of bounds");
                return Err(ArrayStateError::IndexOutOfBounds {
                    index,
                    len: current.len(),
                });
            }

            let mut next = current.to_vec();
            next[index] = new_value;
            Ok(next)
        })
    }

    /// Keep the elements for which `predicate(value, index, array)` holds.
    ///
    /// The predicate runs once per element in order. If it panics, nothing
    /// is published.
    pub fn filter<P>(&self, mut predicate: P)
    where
        P: FnMut(&T, usize, &[T]) -> bool,
    {
        self.publish(Operation::Filter, |current| {
            current
                .iter()
                .enumerate()
                .filter(|(i, value)| predicate(*value, *i, current))
                .map(|(_, value)| value.clone())
                .collect()
        });
    }

    /// Fallible [`filter`](Self::filter). The first `Err` aborts the call
    /// before anything is published.
    pub fn try_filter<E, P>(&self, mut predicate: P) -> std::result::Result<(), E>
    where
        P: FnMut(&T, usize, &[T]) -> std::result::Result<bool, E>,
    {
        self.apply(Operation::Filter, |current| {
            let mut next = Vec::with_capacity(current.len());
            for (i, value) in current.iter().enumerate() {
                if predicate(value, i, current)? {
                    next.push(value.clone());
                }
            }
            Ok(next)
        })
    }
}

impl<T: Clone + PartialEq, C: StateCell<Vec<T>>> ArrayState<T, C> {
    /// Remove the first element equal to `elem`. Returns whether one was found.
    ///
    /// A missing element still publishes an equal copy and is still recorded.
    pub fn remove(&self, elem: &T) -> bool {
        let mut found = false;
        self.publish(Operation::Remove, |current| {
            let mut next = current.to_vec();
            if let Some(index) = current.iter().position(|value| value == elem) {
                next.remove(index);
                found = true;
            }
            next
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    /// A host-style cell that counts publishes. Its versions step by 10.
    struct CountingCell {
        value: Mutex<Arc<Vec<i32>>>,
        publishes: Mutex<u64>,
    }

    impl CountingCell {
        fn new(initial: Vec<i32>) -> Self {
            Self {
                value: Mutex::new(Arc::new(initial)),
                publishes: Mutex::new(0),
            }
        }
    }

    impl StateCell<Vec<i32>> for CountingCell {
        fn get(&self) -> Arc<Vec<i32>> {
            Arc::clone(&self.value.lock())
        }

        fn version(&self) -> Version {
            Version(*self.publishes.lock() * 10)
        }

        fn try_update<E, F>(&self, f: F) -> std::result::Result<Version, E>
        where
            F: FnOnce(&Arc<Vec<i32>>) -> std::result::Result<Vec<i32>, E>,
        {
            let mut value = self.value.lock();
            let next = Arc::new(f(&*value)?);
            *value = next;
            let mut publishes = self.publishes.lock();
            *publishes += 1;
            Ok(Version(*publishes * 10))
        }
    }

    #[test]
    fn test_scenario() {
        let array = create(vec![1, 2, 3], Options::default());

        array.push(4);
        assert_eq!(*array.current(), vec![1, 2, 3, 4]);

        array.update(1, 9).unwrap();
        assert_eq!(*array.current(), vec![1, 9, 3, 4]);

        assert!(array.remove(&9));
        assert_eq!(*array.current(), vec![1, 3, 4]);

        array.filter(|x, _, _| *x > 1);
        assert_eq!(*array.current(), vec![3, 4]);

        array.clear();
        assert!(array.is_empty());
        assert_eq!(array.version(), Version(5));
    }

    #[test]
    fn test_push_leaves_previous_value_untouched() {
        let array = create(vec!["a"], Options::default());
        let before = array.current();

        array.push("b");

        assert_eq!(*before, vec!["a"]);
        assert_eq!(*array.current(), vec!["a", "b"]);
    }

    #[test]
    fn test_history_disabled() {
        let array = create(vec![1], Options::default());
        array.push(2);

        assert!(array.history().is_none());
        assert_eq!(array.history_len(), 0);
    }

    #[test]
    fn test_history_records_prior_state_and_tag() {
        let array = create(vec![1, 2, 3], Options::with_history());

        array.push(4);
        array.update(0, 0).unwrap();
        array.remove(&42);
        array.filter(|_, i, _| i % 2 == 0);
        array.clear();

        let history = array.history().unwrap();
        assert_eq!(
            history.operations(),
            vec![
                None,
                Some(Operation::Push),
                Some(Operation::Update),
                Some(Operation::Remove),
                Some(Operation::Filter),
                Some(Operation::Clear),
            ]
        );

        let snapshots: Vec<Vec<i32>> = history.iter().map(|e| e.snapshot.to_vec()).collect();
        assert_eq!(
            snapshots,
            vec![
                vec![1, 2, 3],
                vec![1, 2, 3],
                vec![1, 2, 3, 4],
                vec![0, 2, 3, 4],
                vec![0, 2, 3, 4],
                vec![0, 3],
            ]
        );
        assert_eq!(history.last().unwrap().version, Version(4));
    }

    #[test]
    fn test_update_out_of_bounds_is_rejected() {
        let array = create(vec![1, 2], Options::with_history());

        let result = array.update(2, 5);

        assert!(matches!(
            result,
            Err(ArrayStateError::IndexOutOfBounds { index: 2, len: 2 })
        ));
        assert_eq!(*array.current(), vec![1, 2]);
        assert_eq!(array.version(), Version(0));
        assert_eq!(array.history_len(), 1);
    }

    #[test]
    fn test_remove_absent_still_publishes() {
        let array = create(vec![1, 2], Options::with_history());
        let before = array.current();

        assert!(!array.remove(&3));

        let after = array.current();
        assert_eq!(*after, *before);
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(array.history_len(), 2);
    }

    #[test]
    fn test_remove_only_first_occurrence() {
        let array = create(vec![1, 2, 1, 2], Options::default());
        array.remove(&2);
        assert_eq!(*array.current(), vec![1, 1, 2]);
    }

    #[test]
    fn test_filter_sees_index_and_array() {
        let array = create(vec![10, 20, 30], Options::default());
        let mut seen = Vec::new();

        array.filter(|value, index, whole| {
            seen.push((*value, index, whole.len()));
            index != 1
        });

        assert_eq!(seen, vec![(10, 0, 3), (20, 1, 3), (30, 2, 3)]);
        assert_eq!(*array.current(), vec![10, 30]);
    }

    #[test]
    fn test_try_filter_error_aborts() {
        let array = create(vec![1, 2, 3], Options::with_history());

        let result = array.try_filter(|x, _, _| if *x == 2 { Err("bad") } else { Ok(true) });

        assert_eq!(result, Err("bad"));
        assert_eq!(*array.current(), vec![1, 2, 3]);
        assert_eq!(array.version(), Version(0));
        assert_eq!(array.history_len(), 1);
    }

    #[test]
    fn test_filter_panic_publishes_nothing() {
        let array = create(vec![1, 2, 3], Options::with_history());

        let result = catch_unwind(AssertUnwindSafe(|| {
            array.filter(|x, _, _| {
                if *x == 3 {
                    panic!("predicate failed");
                }
                true
            })
        }));

        assert!(result.is_err());
        assert_eq!(*array.current(), vec![1, 2, 3]);
        assert_eq!(array.history_len(), 1);

        // Still usable afterwards
        array.push(4);
        assert_eq!(*array.current(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let array = create(vec![1, 2], Options::default());
        array.clear();
        array.clear();
        assert!(array.is_empty());
    }

    #[test]
    fn test_host_cell() {
        let array = ArrayState::with_cell(CountingCell::new(vec![5]), Options::with_history());

        array.push(6);
        array.update(0, 7).unwrap();

        assert_eq!(*array.current(), vec![7, 6]);
        assert_eq!(*array.cell().publishes.lock(), 2);
        let history = array.history().unwrap();
        assert_eq!(*history.first().unwrap().snapshot, vec![5]);
        assert_eq!(*history.last().unwrap().snapshot, vec![5, 6]);

        let versions: Vec<Version> = history.iter().map(|e| e.version).collect();
        assert_eq!(versions, vec![Version(0), Version(0), Version(10)]);
        assert_eq!(array.version(), Version(20));
    }

    #[test]
    fn test_predicate_may_read_container() {
        let array = create(vec![1, 2, 3, 4], Options::with_history());

        array.filter(|x, _, _| (*x as usize) < array.len());
        assert_eq!(*array.current(), vec![1, 2, 3]);

        let result = array.try_filter(|x, _, _| {
            let current = array.current();
            Ok::<_, ()>(!current.is_empty() && *x != 2)
        });
        assert_eq!(result, Ok(()));
        assert_eq!(*array.current(), vec![1, 3]);
        assert_eq!(array.history_len(), 3);
    }

    #[test]
    fn test_with_history_borrows_log() {
        let array = create(vec!['a'], Options::with_history());
        array.push('b');

        let ops = array.with_history(|log| log.operations());
        assert_eq!(ops, Some(vec![None, Some(Operation::Push)]));

        let plain = create(vec!['a'], Options::default());
        assert_eq!(plain.with_history(|log| log.len()), None);
    }

    #[test]
    fn test_subscribers_see_operations() {
        let array = create(vec![1], Options::default());
        let handle = array.subscribe(SubscriptionConfig::live()).unwrap();

        array.push(2);
        array.clear();

        let values: Vec<Vec<i32>> = handle
            .receiver
            .try_iter()
            .filter_map(|event| match event {
                crate::subscriptions::CellEvent::Changed { value, .. } => Some(value.to_vec()),
                _ => None,
            })
            .collect();
        assert_eq!(values, vec![vec![1, 2], vec![]]);

        array.unsubscribe(handle.id);
        assert_eq!(array.subscription_count(), 0);
    }
}
