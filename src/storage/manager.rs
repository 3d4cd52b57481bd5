//! Segment Store
//!
//! Manages the segment files under one directory.
//!
//! ## Responsibilities
//! - Discover segments on every call (another instance may have flushed)
//! - Allocate the next sequence number
//! - Write deduplicated buffers as new segments
//! - Search a single segment for a key

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::entry::Entry;
use crate::error::{KvError, Result};

use super::segment::{parse_sequence, LinearScan, SegmentHandle, SegmentSearch, SegmentWriter};

/// Manages the segment files of one storage root
///
/// ## Caching:
/// None. Listing re-reads the directory and lookups re-open the file, so
/// segments written by another engine instance become visible immediately.
pub struct SegmentStore<S: SegmentSearch = LinearScan> {
    /// Directory where segments are stored
    dir: PathBuf,

    /// fsync new segments before publishing them
    sync: bool,

    /// Lookup strategy for a single segment
    search: S,
}

impl SegmentStore<LinearScan> {
    /// Describe a store rooted at `dir` without touching the filesystem
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_search(dir, LinearScan)
    }

    /// Create the directory if needed and return the store
    pub fn open(dir: &Path) -> Result<Self> {
        let store = Self::new(dir);
        store.ensure_dir()?;
        Ok(store)
    }
}

impl<S: SegmentSearch> SegmentStore<S> {
    /// Describe a store that looks keys up with a custom strategy
    pub fn with_search(dir: impl Into<PathBuf>, search: S) -> Self {
        Self {
            dir: dir.into(),
            sync: true,
            search,
        }
    }

    /// Enable or disable fsync of new segments
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Create the segment directory (idempotent)
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// One more than the highest existing sequence, or 1 for an empty store
    ///
    /// Fails rather than wrapping when the highest sequence is `u64::MAX`: a
    /// wrapped number would sort below every existing segment.
    pub fn next_sequence_number(&self) -> Result<u64> {
        match self.list_segments_newest_first()?.first() {
            Some(handle) => handle.sequence.checked_add(1).ok_or_else(|| {
                KvError::Storage(format!(
                    "segment sequence exhausted after {}",
                    handle.file_name()
                ))
            }),
            None => Ok(1),
        }
    }

    /// All segment files, highest sequence first
    ///
    /// A missing directory is an empty store. Files that do not match the
    /// segment naming pattern are ignored.
    pub fn list_segments_newest_first(&self) -> Result<Vec<SegmentHandle>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut handles = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            if !path.is_file() {
                continue;
            }

            let sequence = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(parse_sequence);

            if let Some(sequence) = sequence {
                handles.push(SegmentHandle { sequence, path });
            }
        }

        // Sort newest first (highest sequence first)
        handles.sort();
        handles.reverse();

        Ok(handles)
    }

    /// Write a deduplicated set of entries as the next segment
    pub fn write_segment(&self, entries: &BTreeMap<String, Entry>) -> Result<SegmentHandle> {
        let sequence = self.next_sequence_number()?;

        let mut writer = SegmentWriter::new(&self.dir, sequence).sync(self.sync);
        for entry in entries.values() {
            writer.add(entry)?;
        }

        writer.finish()
    }

    /// The record for `key` in one segment, if present
    pub fn read_entry(&self, handle: &SegmentHandle, key: &str) -> Option<Entry> {
        self.search.find(handle, key)
    }

    /// Resolve `key` across all segments, newest first
    ///
    /// Returns the first record found, which may be a tombstone.
    pub fn find_newest(&self, key: &str) -> Result<Option<Entry>> {
        for handle in self.list_segments_newest_first()? {
            if let Some(entry) = self.read_entry(&handle, key) {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    /// Number of segment files currently on disk
    pub fn segment_count(&self) -> Result<usize> {
        Ok(self.list_segments_newest_first()?.len())
    }

    /// Directory holding the segments
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
