//! Write Buffer Module
//!
//! In-memory staging area for writes that have not reached a segment yet.
//!
//! ## Responsibilities
//! - Append every set/delete in arrival order
//! - Answer reads with the newest buffered record for a key
//! - Collapse to one record per key when flushed
//!
//! ## Data Structure Choice
//! A plain `Vec<Entry>`:
//! - Appends are O(1) and keep arrival order
//! - Lookups scan from the tail, so the newest write is found first
//! - The buffer is bounded by `max_buffer_length`, which keeps scans short

mod write_buffer;

pub use write_buffer::WriteBuffer;
