//! Error types for Radial core operations.
//!
//! This module defines well-structured error types using `thiserror` for
//! library-level errors, while host collaborators and the CLI use `anyhow`
//! at the seams.
//!
//! Most failures in the core degrade instead of propagating: a missing menu
//! file is an empty menu and a malformed menu line is skipped. The variants
//! below cover what is left.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using RadialError
pub type Result<T> = std::result::Result<T, RadialError>;

/// Core error types for Radial operations.
#[derive(Error, Debug)]
pub enum RadialError {
    // === Identifier Errors ===
    /// A textual identifier could not be parsed as `package/class`
    #[error("invalid app identifier: {input:?}")]
    InvalidIdentifier { input: String },

    // === Menu Errors ===
    /// The persisted menu resource does not exist
    #[error("menu not found at {path}")]
    MenuNotFound { path: PathBuf },

    /// Writing the persisted menu failed; the in-memory menu is unaffected
    #[error("failed to store menu at {path}: {source}")]
    MenuWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A menu position was outside the list
    #[error("menu position {position} out of range (menu has {len} entries)")]
    MenuPosition { position: usize, len: usize },

    // === Collaborator Errors ===
    /// The host enumeration collaborator failed
    #[error("app enumeration failed: {reason}")]
    Enumeration { reason: String },

    // === Configuration Errors ===
    /// Configuration file parsing failed
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    // === I/O Errors ===
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Internal Errors ===
    /// Internal error that should not happen
    #[error("internal error: {0}")]
    Internal(String),
}

impl RadialError {
    /// Returns true if this error means "absent", which callers treat as empty state
    pub fn is_not_found(&self) -> bool {
        match self {
            RadialError::MenuNotFound { .. } => true,
            RadialError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Create an enumeration error
    pub fn enumeration(reason: impl Into<String>) -> Self {
        RadialError::Enumeration {
            reason: reason.into(),
        }
    }
}
