//! Segment Writer
//!
//! Collects entries and publishes them as a new segment file.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::entry::Entry;
use crate::error::Result;
use crate::KvError;

use super::{SegmentHandle, TEMP_SUFFIX};

/// Builds one segment and makes it visible atomically
///
/// Lines are sorted by their serialized text, not by key. The file only
/// appears under its final name once it is fully written:
/// 1. Write all lines to `<name>.tmp`
/// 2. fsync the temp file (when `sync` is on)
/// 3. Rename to the final name
/// 4. fsync the directory (when `sync` is on)
///
/// Once the rename succeeds the segment is visible to readers, so a failed
/// directory fsync is logged and the segment is still reported as written.
pub struct SegmentWriter {
    /// Final segment handle
    handle: SegmentHandle,
    /// Encoded records, one per entry
    lines: Vec<String>,
    /// fsync file and directory before returning
    sync: bool,
}

impl SegmentWriter {
    /// Start a segment with the given sequence number inside `dir`
    pub fn new(dir: &Path, sequence: u64) -> Self {
        Self {
            handle: SegmentHandle::new(dir, sequence),
            lines: Vec::new(),
            sync: true,
        }
    }

    /// Enable or disable fsync on finish
    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Add one entry; callers are responsible for key uniqueness
    pub fn add(&mut self, entry: &Entry) -> Result<()> {
        self.lines.push(entry.encode()?);
        Ok(())
    }

    /// Number of entries added so far
    pub fn entry_count(&self) -> usize {
        self.lines.len()
    }

    /// Sort, write and publish the segment
    pub fn finish(mut self) -> Result<SegmentHandle> {
        if self.lines.is_empty() {
            return Err(KvError::Storage(
                "Cannot write an empty segment".to_string(),
            ));
        }

        self.lines.sort();

        let tmp_path = self.temp_path();
        if let Err(e) = self.write_temp(&tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        if let Err(e) = fs::rename(&tmp_path, &self.handle.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        let dir_synced = match (self.sync, self.handle.path.parent()) {
            (true, Some(dir)) => sync_dir(dir),
            _ => Ok(()),
        };

        debug!(
            segment = %self.handle.file_name(),
            entries = self.lines.len(),
            "segment written"
        );

        Ok(published(self.handle, dir_synced))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn temp_path(&self) -> PathBuf {
        let mut name = self.handle.file_name();
        name.push_str(TEMP_SUFFIX);
        match self.handle.path.parent() {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    fn write_temp(&self, path: &Path) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut writer = BufWriter::new(file);
        for line in &self.lines {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        let file = writer
            .into_inner()
            .map_err(|e| KvError::Io(e.into_error()))?;
        if self.sync {
            file.sync_all()?;
        }

        Ok(())
    }
}

/// The renamed segment is live whatever the directory fsync reported
fn published(handle: SegmentHandle, dir_synced: Result<()>) -> SegmentHandle {
    if let Err(e) = dir_synced {
        warn!(
            segment = %handle.file_name(),
            error = %e,
            "segment published but directory fsync failed"
        );
    }
    handle
}

/// Persist directory entries (new file names) on unix
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    fs::File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}
