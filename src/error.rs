use std::path::PathBuf;

use thiserror::Error;

use crate::sort_mode::SortMode;

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The user's home directory could not be determined.
    #[error("could not determine home directory for settings")]
    NoHomeDir,

    /// The store was never constructed, so there is nothing to read or write.
    #[error("settings store is unavailable")]
    Unavailable,

    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file has content but it is not a settings document.
    #[error("malformed settings at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// A failed load, together with the value the caller should fall back to.
#[derive(Debug, Error)]
#[error("failed to load sort mode, falling back to {fallback}")]
pub struct LoadFailure {
    pub fallback: SortMode,
    #[source]
    pub source: SettingsError,
}

impl LoadFailure {
    pub fn into_fallback(self) -> SortMode {
        self.fallback
    }
}
