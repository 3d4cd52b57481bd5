//! Configuration for SegKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{KvError, Result};

/// Main configuration for a SegKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {storage_root}/
    ///     └── segments/     (sorted_string_table_NNNN.json files)
    pub storage_root: PathBuf,

    /// fsync segment files and their directory on flush
    pub sync_segments: bool,

    // -------------------------------------------------------------------------
    // Write Buffer Configuration
    // -------------------------------------------------------------------------
    /// Number of buffered entries that triggers a flush
    pub max_buffer_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("./segkv_data"),
            sync_segments: true,
            max_buffer_length: 100,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the configuration can drive an engine
    pub fn validate(&self) -> Result<()> {
        if self.max_buffer_length == 0 {
            return Err(KvError::Config(
                "max_buffer_length must be at least 1".to_string(),
            ));
        }
        if self.storage_root.as_os_str().is_empty() {
            return Err(KvError::Config("storage_root must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the storage root directory
    pub fn storage_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.storage_root = path.into();
        self
    }

    /// Set the buffer length that triggers a flush
    pub fn max_buffer_length(mut self, length: usize) -> Self {
        self.config.max_buffer_length = length;
        self
    }

    /// Enable or disable fsync of new segments
    pub fn sync_segments(mut self, sync: bool) -> Self {
        self.config.sync_segments = sync;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
