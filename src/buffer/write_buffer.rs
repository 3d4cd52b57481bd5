//! WriteBuffer implementation
//!
//! Append-only Vec of entries; last write for a key wins.

use std::collections::BTreeMap;

use crate::entry::Entry;

/// Ordered sequence of entries awaiting a flush
#[derive(Debug, Default)]
pub struct WriteBuffer {
    entries: Vec<Entry>,
}

impl WriteBuffer {
    /// Create a new empty WriteBuffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry at the tail
    ///
    /// Duplicate keys are expected: later entries shadow earlier ones.
    pub fn append(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Newest buffered entry for `key`, tombstones included
    pub fn find_latest(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().rev().find(|entry| entry.key == key)
    }

    /// Number of buffered entries (duplicates counted)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One entry per key, last write wins whether or not it is a tombstone
    ///
    /// The buffer itself is left untouched.
    pub fn deduped(&self) -> BTreeMap<String, Entry> {
        let mut latest = BTreeMap::new();
        for entry in &self.entries {
            latest.insert(entry.key.clone(), entry.clone());
        }
        latest
    }

    /// Collapse to one entry per key and empty the buffer
    pub fn drain_deduped(&mut self) -> BTreeMap<String, Entry> {
        let latest = self.deduped();
        self.entries.clear();
        latest
    }

    /// Drop every buffered entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
