//! Persistent cache errors
//!
//! These never escape the cache: every failure is logged and degrades to a
//! miss so that resolution proceeds live.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to read cache file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write cache file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache file '{path}' is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Cache file '{path}' has format version {found}, expected {expected}")]
    FormatVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    /// Another group's entry, under a file name both groups sanitize to
    #[error("Cache file '{path}' belongs to group '{found}', expected '{expected}'")]
    GroupMismatch {
        path: PathBuf,
        found: String,
        expected: String,
    },
}

impl CacheError {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Read { path, .. }
            | Self::Write { path, .. }
            | Self::Malformed { path, .. }
            | Self::FormatVersion { path, .. }
            | Self::GroupMismatch { path, .. } => path,
        }
    }

    /// Whether the on-disk file should be discarded
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Malformed { .. } | Self::FormatVersion { .. })
    }
}
