//! Error types for PhoneBook
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using PhoneBookError
pub type Result<T> = std::result::Result<T, PhoneBookError>;

/// Unified error type for PhoneBook operations
#[derive(Debug, Error)]
pub enum PhoneBookError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Log File Errors
    // -------------------------------------------------------------------------
    #[error("Log corruption detected: {0}")]
    LogCorruption(String),

    #[error("Log entry truncated: needed {needed} bytes, {available} available")]
    LogTruncated { needed: usize, available: usize },

    #[error("Keyspace not found: {0}")]
    KeyspaceNotFound(String),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Entry not found: {first_name} {surname}")]
    EntryNotFound { surname: String, first_name: String },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Corrupted record for '{surname}': {reason}")]
    CorruptRecord { surname: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Server error: {0}")]
    Remote(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PhoneBookError {
    /// The requested surname or entry does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PhoneBookError::RecordNotFound(_) | PhoneBookError::EntryNotFound { .. }
        )
    }

    /// Bytes (supplied or stored) did not parse into a record
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            PhoneBookError::Decode(_) | PhoneBookError::CorruptRecord { .. }
        )
    }

    /// The caller supplied something malformed.
    ///
    /// Stored corruption (`CorruptRecord`) is a server fault, not one of these.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            PhoneBookError::Decode(_) | PhoneBookError::InvalidInput(_)
        )
    }
}
