//! Error types for the XDG backend.

use std::path::PathBuf;
use thiserror::Error;

/// Errors specific to XDG backend operations.
#[derive(Error, Debug)]
pub enum XdgError {
    /// No desktop entry with this id is installed
    #[error("no desktop entry for {id}")]
    EntryNotFound { id: String },

    /// The desktop entry has no Exec line
    #[error("desktop entry {id} has no Exec line")]
    MissingExec { id: String },

    /// The Exec line could not be split into arguments
    #[error("invalid Exec line in {id}: {reason}")]
    InvalidExec { id: String, reason: String },

    /// Failed to start the process
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A scan pattern could not be built for a directory
    #[error("invalid scan pattern under {dir}: {reason}")]
    Pattern { dir: PathBuf, reason: String },

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl XdgError {
    /// Check if this error means the app is simply not installed
    pub fn is_not_installed(&self) -> bool {
        matches!(self, XdgError::EntryNotFound { .. })
    }
}
