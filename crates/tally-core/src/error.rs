//! Error types for tally-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or parsing A1 references
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Column index out of bounds (1-based)
    #[error("Column index {0} out of bounds (valid: 1..={1})")]
    ColumnOutOfBounds(u32, u32),

    /// Row number out of bounds (1-based)
    #[error("Row number {0} out of bounds (rows start at 1)")]
    RowOutOfBounds(u32),

    /// Invalid sheet (tab) name
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),
}
