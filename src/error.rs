//! Error types for arksave
//!
//! `ArkError` covers failures that abort a whole operation (store I/O,
//! malformed header, bad configuration). Per-object decode failures live in
//! [`crate::decoder::DecodeError`] and recoverable conditions are reported as
//! [`crate::diagnostics::Diagnostic`] values instead.

use thiserror::Error;

/// Result type alias using ArkError
pub type Result<T> = std::result::Result<T, ArkError>;

/// Unified error type for arksave operations
#[derive(Debug, Error)]
pub enum ArkError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Store error: {0}")]
    Store(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Custom record not found: {0}")]
    MissingHeader(String),

    // -------------------------------------------------------------------------
    // Name Table Errors
    // -------------------------------------------------------------------------
    #[error("Malformed header record: {0}")]
    HeaderFormat(String),

    #[error("Name not found: {0}")]
    NameNotFound(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("Worker thread failed: {0}")]
    Worker(String),
}
