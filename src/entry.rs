//! Entry definitions
//!
//! The atomic record shared by the write buffer and segment files.
//!
//! ## Line Format
//! ```text
//! {"key":"<string>","val":<json or null>,"isDeleted":<bool>}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{KvError, Result};

/// A single key-value record or tombstone
///
/// Entries are never edited: updating a key appends a newer Entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The key this record belongs to
    pub key: String,

    /// Stored value (always `null` for tombstones)
    #[serde(rename = "val", default)]
    pub value: Value,

    /// Whether this record marks the key as deleted
    #[serde(rename = "isDeleted")]
    pub is_deleted: bool,
}

impl Entry {
    /// Create a live record
    pub fn put(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
            is_deleted: false,
        }
    }

    /// Create a tombstone for `key`
    pub fn tombstone(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Value::Null,
            is_deleted: true,
        }
    }

    /// The value this record resolves to, `None` for tombstones
    pub fn live_value(&self) -> Option<&Value> {
        if self.is_deleted {
            None
        } else {
            Some(&self.value)
        }
    }

    /// Consume the record, yielding its resolved value
    pub fn into_live_value(self) -> Option<Value> {
        if self.is_deleted {
            None
        } else {
            Some(self.value)
        }
    }

    /// Serialize to a single line of JSON (no trailing newline)
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| KvError::Serialization(e.to_string()))
    }

    /// Parse one segment line
    pub fn decode(line: &str) -> Result<Self> {
        let mut entry: Entry =
            serde_json::from_str(line).map_err(|e| KvError::Parse(e.to_string()))?;

        // Whatever a tombstone carries on disk, it has no value.
        if entry.is_deleted {
            entry.value = Value::Null;
        }

        Ok(entry)
    }
}
