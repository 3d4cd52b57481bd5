//! Segment Module
//!
//! Naming, writing and searching of individual segment files.

mod reader;
mod writer;

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

pub use reader::{read_entries, LinearScan, SegmentSearch};
pub use writer::SegmentWriter;

// =============================================================================
// Naming
// =============================================================================

/// File name prefix shared by every segment
pub const SEGMENT_PREFIX: &str = "sorted_string_table_";

/// File name suffix shared by every segment
pub const SEGMENT_SUFFIX: &str = ".json";

/// Zero-padding width of the sequence number in file names
pub(crate) const SEQUENCE_WIDTH: usize = 4;

/// Suffix appended to a segment name while it is being written
pub(crate) const TEMP_SUFFIX: &str = ".tmp";

/// "sorted_string_table_0042.json" for sequence 42
pub(crate) fn segment_file_name(sequence: u64) -> String {
    format!(
        "{}{:0width$}{}",
        SEGMENT_PREFIX,
        sequence,
        SEGMENT_SUFFIX,
        width = SEQUENCE_WIDTH
    )
}

/// "sorted_string_table_0042.json" → Some(42)
pub(crate) fn parse_sequence(file_name: &str) -> Option<u64> {
    let digits = file_name
        .strip_prefix(SEGMENT_PREFIX)?
        .strip_suffix(SEGMENT_SUFFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

// =============================================================================
// Segment Handle
// =============================================================================

/// Reference to a segment file on disk
///
/// Handles are cheap descriptors; nothing about the file's content is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentHandle {
    /// Sequence number embedded in the file name
    pub sequence: u64,
    /// Full path to the segment file
    pub path: PathBuf,
}

impl SegmentHandle {
    pub(crate) fn new(dir: &Path, sequence: u64) -> Self {
        Self {
            sequence,
            path: dir.join(segment_file_name(sequence)),
        }
    }

    /// File name without the directory
    pub fn file_name(&self) -> String {
        segment_file_name(self.sequence)
    }
}

impl PartialOrd for SegmentHandle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SegmentHandle {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sequence
            .cmp(&other.sequence)
            .then_with(|| self.path.cmp(&other.path))
    }
}
