//! Engine Module
//!
//! The storage engine that coordinates the write buffer and segment store.
//!
//! ## Responsibilities
//! - Track the Uninitialized/Ready lifecycle
//! - Route writes into the buffer and flush it at the configured length
//! - Resolve reads newest first: buffer, then segments by descending sequence
//! - Keep the buffer intact when a flush fails

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::buffer::WriteBuffer;
use crate::config::Config;
use crate::entry::Entry;
use crate::error::{KvError, Result};
use crate::storage::SegmentStore;

/// Lifecycle of an engine instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Storage root not prepared; only `init` and `clear` are allowed
    Uninitialized,
    /// Storage root exists; all operations allowed
    Ready,
}

/// Mutable engine state, guarded as one unit
struct Inner {
    state: EngineState,
    buffer: WriteBuffer,
}

/// The main storage engine
///
/// ## Concurrency Model: single writer
///
/// Every operation takes `inner` for its whole duration, so threads of one
/// process see each operation (including `check_and_set`) as atomic.
/// Nothing coordinates separate processes or separate engines on the same
/// root: they race on flush sequence numbers and on check-and-set.
pub struct StorageEngine {
    /// Engine configuration
    config: Config,

    /// Segment files under `{storage_root}/segments`
    store: SegmentStore,

    /// Lifecycle state and pending writes
    inner: Mutex<Inner>,
}

impl StorageEngine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const SEGMENT_DIR: &'static str = "segments";

    /// Create an engine in the Uninitialized state
    ///
    /// No filesystem access happens until `init`.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let store = SegmentStore::new(config.storage_root.join(Self::SEGMENT_DIR))
            .with_sync(config.sync_segments);

        Ok(Self {
            config,
            store,
            inner: Mutex::new(Inner {
                state: EngineState::Uninitialized,
                buffer: WriteBuffer::new(),
            }),
        })
    }

    /// Create and initialize an engine
    pub fn open(config: Config) -> Result<Self> {
        let engine = Self::new(config)?;
        engine.init()?;
        Ok(engine)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified storage root
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().storage_root(path).build())
    }

    /// Ensure the storage root exists and move to Ready
    ///
    /// Idempotent. Existing segments are left untouched.
    pub fn init(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        self.store.ensure_dir()?;

        if inner.state == EngineState::Uninitialized {
            info!(root = %self.config.storage_root.display(), "storage engine ready");
            inner.state = EngineState::Ready;
        }
        Ok(())
    }

    /// Store `value` under `key`
    ///
    /// Flushes when the buffer reaches `max_buffer_length`; a failed flush is
    /// returned and the write stays buffered.
    pub fn set(&self, key: impl Into<String>, value: Value) -> Result<()> {
        let mut inner = self.inner.lock();
        Self::require_ready(&inner, "set")?;
        self.append(&mut inner, Entry::put(key, value))
    }

    /// Current value for `key`, `None` when absent or deleted
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let inner = self.inner.lock();
        Self::require_ready(&inner, "get")?;
        self.resolve(&inner, key)
    }

    /// Whether `key` holds a value other than `null`
    pub fn exists(&self, key: &str) -> Result<bool> {
        let inner = self.inner.lock();
        Self::require_ready(&inner, "exists")?;
        Ok(Self::is_present(self.resolve(&inner, key)?.as_ref()))
    }

    /// Delete `key`, returning false if it did not exist
    pub fn delete(&self, key: &str) -> Result<bool> {
        let mut inner = self.inner.lock();
        Self::require_ready(&inner, "delete")?;

        if !Self::is_present(self.resolve(&inner, key)?.as_ref()) {
            return Ok(false);
        }

        self.append(&mut inner, Entry::tombstone(key))?;
        Ok(true)
    }

    /// Replace the value of `key` with `new_value` if it currently equals
    /// `expected`
    ///
    /// `None` and `Some(Value::Null)` compare equal. Atomic only among threads
    /// sharing this engine: another process writing the same root can still
    /// interleave between the read and the write.
    pub fn check_and_set(
        &self,
        key: &str,
        expected: Option<&Value>,
        new_value: Value,
    ) -> Result<bool> {
        let mut inner = self.inner.lock();
        Self::require_ready(&inner, "check_and_set")?;

        let current = self.resolve(&inner, key)?;
        if !Self::loosely_equal(current.as_ref(), expected) {
            return Ok(false);
        }

        self.append(&mut inner, Entry::put(key, new_value))?;
        Ok(true)
    }

    /// Write the buffer to a new segment
    ///
    /// No-op when the buffer is empty.
    pub fn flush(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        Self::require_ready(&inner, "flush")?;
        self.flush_internal(&mut inner)
    }

    /// Delete the storage root and all buffered writes
    ///
    /// Leaves the engine Uninitialized; call `init` before using it again.
    pub fn clear(&self) -> Result<()> {
        let mut inner = self.inner.lock();

        match fs::remove_dir_all(&self.config.storage_root) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        inner.buffer.clear();
        inner.state = EngineState::Uninitialized;
        info!(root = %self.config.storage_root.display(), "storage root cleared");
        Ok(())
    }

    /// Close the engine gracefully
    ///
    /// Flushes any pending writes when Ready.
    pub fn close(self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state == EngineState::Ready {
            self.flush_internal(&mut inner)?;
        }
        Ok(())
    }

    // =========================================================================
    // Typed Helpers
    // =========================================================================

    /// Store any serializable value
    pub fn set_as<T: Serialize + ?Sized>(&self, key: impl Into<String>, value: &T) -> Result<()> {
        let value =
            serde_json::to_value(value).map_err(|e| KvError::Serialization(e.to_string()))?;
        self.set(key, value)
    }

    /// Read a value back into the caller's type
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| KvError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn require_ready(inner: &Inner, operation: &str) -> Result<()> {
        match inner.state {
            EngineState::Ready => Ok(()),
            EngineState::Uninitialized => Err(KvError::IllegalState(format!(
                "{} called before init (or after clear)",
                operation
            ))),
        }
    }

    /// Newest-first resolution: buffer, then segments
    fn resolve(&self, inner: &Inner, key: &str) -> Result<Option<Value>> {
        if let Some(entry) = inner.buffer.find_latest(key) {
            return Ok(entry.live_value().cloned());
        }

        Ok(self
            .store
            .find_newest(key)?
            .and_then(Entry::into_live_value))
    }

    fn append(&self, inner: &mut Inner, entry: Entry) -> Result<()> {
        inner.buffer.append(entry);

        if inner.buffer.len() >= self.config.max_buffer_length {
            self.flush_internal(inner)?;
        }
        Ok(())
    }

    fn flush_internal(&self, inner: &mut Inner) -> Result<()> {
        if inner.buffer.is_empty() {
            return Ok(());
        }

        // The buffer is only cleared once the segment is on disk.
        let buffered = inner.buffer.len();
        let entries = inner.buffer.deduped();

        match self.store.write_segment(&entries) {
            Ok(handle) => {
                inner.buffer.clear();
                debug!(
                    segment = %handle.file_name(),
                    buffered,
                    written = entries.len(),
                    "buffer flushed"
                );
                Ok(())
            }
            Err(e) => {
                error!(error = %e, buffered, "flush failed, keeping buffered entries");
                Err(e)
            }
        }
    }

    fn is_present(value: Option<&Value>) -> bool {
        !matches!(value, None | Some(Value::Null))
    }

    fn loosely_equal(current: Option<&Value>, expected: Option<&Value>) -> bool {
        match (current, expected) {
            (None | Some(Value::Null), None | Some(Value::Null)) => true,
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the storage root path
    pub fn storage_root(&self) -> &Path {
        &self.config.storage_root
    }

    /// Get the segment directory path
    pub fn segments_dir(&self) -> &Path {
        self.store.dir()
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.inner.lock().state
    }

    pub fn is_ready(&self) -> bool {
        self.state() == EngineState::Ready
    }

    /// Number of buffered (unflushed) entries
    pub fn buffer_len(&self) -> usize {
        self.inner.lock().buffer.len()
    }

    /// Number of segment files on disk
    pub fn segment_count(&self) -> Result<usize> {
        self.store.segment_count()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
