//! Segment Reader
//!
//! Point lookups over segment files. Lookups sit behind `SegmentSearch` so an
//! index-backed strategy can replace the linear scan without touching the
//! engine's read path.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use crate::entry::Entry;
use crate::error::Result;

use super::SegmentHandle;

/// Strategy for finding a key inside one segment
pub trait SegmentSearch: Send + Sync {
    /// The segment's record for `key`, if any
    ///
    /// Never fails: an unreadable segment is reported as not containing the key.
    fn find(&self, handle: &SegmentHandle, key: &str) -> Option<Entry>;
}

/// Opens the file and scans every line until the key turns up
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearScan;

impl SegmentSearch for LinearScan {
    fn find(&self, handle: &SegmentHandle, key: &str) -> Option<Entry> {
        let file = match File::open(&handle.path) {
            Ok(file) => file,
            Err(e) => {
                warn!(segment = %handle.path.display(), error = %e, "segment unreadable, skipping");
                return None;
            }
        };

        let mut found = None;
        scan_lines(BufReader::new(file), &handle.path, |entry| {
            if entry.key == key {
                found = Some(entry);
                false
            } else {
                true
            }
        });
        found
    }
}

/// Every well-formed entry in a segment, in file order
///
/// Malformed lines are skipped; a file that cannot be opened is an error.
pub fn read_entries(path: &Path) -> Result<Vec<Entry>> {
    let file = File::open(path)?;
    let mut entries = Vec::new();
    scan_lines(BufReader::new(file), path, |entry| {
        entries.push(entry);
        true
    });
    Ok(entries)
}

/// Decode lines one at a time, handing each entry to `visit` until it
/// returns false. A read error ends the scan.
fn scan_lines<R, F>(reader: R, path: &Path, mut visit: F)
where
    R: BufRead,
    F: FnMut(Entry) -> bool,
{
    for (index, line) in reader.split(b'\n').enumerate() {
        let line_no = index + 1;
        let bytes = match line {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(segment = %path.display(), line = line_no, error = %e, "segment read failed");
                return;
            }
        };

        let text = match std::str::from_utf8(&bytes) {
            Ok(text) => text.trim_end_matches('\r'),
            Err(e) => {
                warn!(segment = %path.display(), line = line_no, error = %e, "skipping non-UTF-8 line");
                continue;
            }
        };
        if text.trim().is_empty() {
            continue;
        }

        match Entry::decode(text) {
            Ok(entry) => {
                if !visit(entry) {
                    return;
                }
            }
            Err(e) => {
                warn!(segment = %path.display(), line = line_no, error = %e, "skipping malformed line");
            }
        }
    }
}
