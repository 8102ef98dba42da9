//! Common error types for the eight-count workspace

use thiserror::Error;

/// Common result type for eight-count operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the domain core and services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding error for stored sheet data
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Cell address outside the grid
    #[error("Cell ({eight_count}, {cell}) out of range for grid of {len} eight-counts")]
    OutOfRange {
        eight_count: usize,
        cell: usize,
        len: usize,
    },

    /// Character edit attempted on a blocked cell
    #[error("Cell ({eight_count}, {cell}) is blocked")]
    CellBlocked { eight_count: usize, cell: usize },

    /// Tap history cannot produce a meaningful tempo
    #[error("Invalid tempo estimate: {0}")]
    InvalidTempoEstimate(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
