//! # SegKV
//!
//! A minimal log-structured key-value store with:
//! - A bounded in-memory write buffer
//! - Immutable, sequence-numbered segment files
//! - Tombstone-based deletion
//! - Newest-first read resolution across buffer and segments
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      StorageEngine                           │
//! │         (set / get / delete / check_and_set / flush)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐   flush   ┌──────────────┐
//!   │ WriteBuffer │──────────▶│ SegmentStore │
//!   │  (Vec, LWW) │           │ (JSON lines) │
//!   └─────────────┘           └──────┬───────┘
//!                                    │
//!                                    ▼
//!                    {root}/segments/sorted_string_table_NNNN.json
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use segkv::{Config, StorageEngine};
//! use serde_json::json;
//!
//! # fn main() -> segkv::Result<()> {
//! let engine = StorageEngine::open(Config::builder().storage_root("./data").build())?;
//! engine.set("evan", json!("rocks"))?;
//! assert_eq!(engine.get("evan")?, Some(json!("rocks")));
//! engine.flush()?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod entry;
pub mod buffer;
pub mod storage;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::Config;
pub use entry::Entry;
pub use engine::{EngineState, StorageEngine};

/// Stored value type
pub use serde_json::Value;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SegKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
