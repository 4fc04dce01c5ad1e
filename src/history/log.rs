//! Append-only history log.

use crate::error::Result;
use crate::types::{Operation, Timestamp, Version};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// One recorded state.
pub struct HistoryEntry<T> {
    /// The sequence as it was when recorded. Shared with the cell, never mutated.
    pub snapshot: Arc<Vec<T>>,

    /// The call made on `snapshot`. `None` for the seed entry.
    pub operation: Option<Operation>,

    /// Cell version of `snapshot`.
    pub version: Version,

    /// When the entry was recorded.
    pub timestamp: Timestamp,
}

impl<T> Clone for HistoryEntry<T> {
    fn clone(&self) -> Self {
        Self {
            snapshot: Arc::clone(&self.snapshot),
            operation: self.operation,
            version: self.version,
            timestamp: self.timestamp,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for HistoryEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryEntry")
            .field("snapshot", &self.snapshot)
            .field("operation", &self.operation)
            .field("version", &self.version)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// Borrowed form used for JSON dumps.
#[derive(Serialize)]
struct EntryView<'a, T> {
    snapshot: &'a [T],
    operation: Option<Operation>,
    version: Version,
    timestamp: Timestamp,
}

impl<'a, T> From<&'a HistoryEntry<T>> for EntryView<'a, T> {
    fn from(entry: &'a HistoryEntry<T>) -> Self {
        Self {
            snapshot: entry.snapshot.as_slice(),
            operation: entry.operation,
            version: entry.version,
            timestamp: entry.timestamp,
        }
    }
}

/// Append-only log of prior states. Always holds at least the seed entry.
pub struct HistoryLog<T> {
    entries: Vec<HistoryEntry<T>>,
}

impl<T> HistoryLog<T> {
    /// Start a log whose first entry is `seed`, with no operation.
    pub fn new(seed: Arc<Vec<T>>, version: Version) -> Self {
        Self {
            entries: vec![HistoryEntry {
                snapshot: seed,
                operation: None,
                version,
                timestamp: Timestamp::now(),
            }],
        }
    }

    /// Append the pre-call `snapshot` of an `operation`.
    pub fn record(
        &mut self,
        snapshot: Arc<Vec<T>>,
        operation: Operation,
        version: Version,
    ) -> &HistoryEntry<T> {
        trace!(%operation, %version, len = snapshot.len(), "history entry");
        let index = self.entries.len();
        self.entries.push(HistoryEntry {
            snapshot,
            operation: Some(operation),
            version,
            timestamp: Timestamp::now(),
        });
        &self.entries[index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: the seed entry is always present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry<T>] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry<T>> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry<T>> {
        self.entries.get(index)
    }

    /// The seed entry.
    pub fn first(&self) -> Option<&HistoryEntry<T>> {
        self.entries.first()
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<&HistoryEntry<T>> {
        self.entries.last()
    }

    /// Operation tags in recording order.
    pub fn operations(&self) -> Vec<Option<Operation>> {
        self.entries.iter().map(|e| e.operation).collect()
    }
}

impl<T: Serialize> HistoryLog<T> {
    /// Dump the log as a JSON array for debugging.
    pub fn to_json(&self) -> Result<String> {
        let views: Vec<EntryView<'_, T>> = self.entries.iter().map(EntryView::from).collect();
        Ok(serde_json::to_string(&views)?)
    }

    /// Like [`to_json`](Self::to_json), indented.
    pub fn to_json_pretty(&self) -> Result<String> {
        let views: Vec<EntryView<'_, T>> = self.entries.iter().map(EntryView::from).collect();
        Ok(serde_json::to_string_pretty(&views)?)
    }
}

impl<T> Clone for HistoryLog<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for HistoryLog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a HistoryLog<T> {
    type Item = &'a HistoryEntry<T>;
    type IntoIter = std::slice::Iter<'a, HistoryEntry<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
