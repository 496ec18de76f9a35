//! Error types for QuarryDB
//!
//! This module defines the error taxonomy for the table-definition
//! subsystem. Every variant carries a stable numeric code alongside its
//! message; other components match on both, so codes and message shapes
//! are part of the public contract.

use thiserror::Error;

/// The main error type for QuarryDB
#[derive(Error, Debug)]
pub enum Error {
    // ========== Catalog Errors ==========
    #[error("Catalog error: table '{0}.{1}' not found")]
    TableNotFound(String, String),

    #[error("Catalog error: table '{0}.{1}' already exists")]
    TableAlreadyExists(String, String),

    #[error("Catalog error: database '{0}' not found")]
    DatabaseNotFound(String),

    #[error("Catalog error: database '{0}' already exists")]
    DatabaseAlreadyExists(String),

    #[error("Catalog error: database '{0}' is reserved and cannot be modified")]
    ProtectedNamespace(String),

    // ========== Binder Errors ==========
    #[error("Bind error: duplicate column name '{0}'")]
    DuplicateColumnName(String),

    #[error("Bind error: unsupported type '{0}'")]
    UnsupportedType(String),

    #[error("Bind error: unsupported column modifier {0}")]
    UnsupportedColumnModifier(String),

    #[error("Bind error: invalid default expression for column '{column}': {reason}")]
    InvalidDefaultExpression { column: String, reason: String },

    #[error("Bind error: number of columns in the column list ({declared}) does not match the select query ({projected})")]
    ColumnCountMismatch { declared: usize, projected: usize },

    // ========== Engine & Option Errors ==========
    #[error("Unknown table engine '{0}'")]
    UnknownEngine(String),

    #[error("Unsupported cluster key for engine: {0}")]
    UnsupportedClusterBy(String),

    #[error("Invalid table option '{key}': {reason}")]
    InvalidOptionValue { key: String, reason: String },

    #[error("Table option '{0}' is reserved or unknown and cannot be set")]
    ReservedOrUnknownOption(String),

    #[error("Malformed external location: {0}")]
    MalformedExternalLocation(String),

    // ========== Persistence Errors ==========
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable numeric code surfaced to clients next to the message.
    ///
    /// `ReservedOrUnknownOption` uses a dedicated code for the snapshot
    /// location keys; storage relies on it to distinguish a blocked
    /// snapshot pin from an ordinary bad option.
    pub fn code(&self) -> u16 {
        match self {
            Error::TableNotFound(_, _) => 1025,
            Error::TableAlreadyExists(_, _) => 2302,
            Error::DatabaseNotFound(_) => 1003,
            Error::DatabaseAlreadyExists(_) => 2301,
            Error::ProtectedNamespace(_) => 1002,
            Error::DuplicateColumnName(_) => 1006,
            Error::UnsupportedType(_) => 1007,
            Error::UnsupportedColumnModifier(_) => 1005,
            Error::InvalidDefaultExpression { .. } => 1065,
            Error::ColumnCountMismatch { .. } => 1006,
            Error::UnknownEngine(_) => 1302,
            Error::UnsupportedClusterBy(_) => 2703,
            Error::InvalidOptionValue { .. } => 1301,
            Error::ReservedOrUnknownOption(key) => match key.as_str() {
                "snapshot_location" | "snapshot_loc" => 3001,
                _ => 1301,
            },
            Error::MalformedExternalLocation(_) => 4000,
            Error::IoError(_) | Error::Internal(_) => 9001,
        }
    }
}

/// Result type alias for QuarryDB operations
pub type Result<T> = std::result::Result<T, Error>;
