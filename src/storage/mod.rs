//! Storage Module
//!
//! Persistent storage layer built from immutable segment files.
//!
//! ## Responsibilities
//! - Name and sequence segment files
//! - Discover segments on every read (no caching)
//! - Write flushed buffers atomically (temp file + rename)
//! - Point lookups by linear scan, behind the `SegmentSearch` seam
//!
//! ## Layout
//! ```text
//! {storage_root}/segments/
//!     sorted_string_table_0001.json
//!     sorted_string_table_0002.json   <- newer, authoritative
//!     ...
//! ```
//!
//! ## Segment File
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ {"key":"a","val":1,"isDeleted":false}\n                   │
//! │ {"key":"b","val":null,"isDeleted":true}\n                 │
//! │ ... one record per key, lines sorted by their full text   │
//! └───────────────────────────────────────────────────────────┘
//! ```

mod manager;
mod segment;

pub use manager::SegmentStore;
pub use segment::{
    read_entries, LinearScan, SegmentHandle, SegmentSearch, SegmentWriter, SEGMENT_PREFIX,
    SEGMENT_SUFFIX,
};
