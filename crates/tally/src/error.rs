//! Error types for report configuration.

use thiserror::Error;

/// Result type alias using [`ReportError`]
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors raised when configuring a report layout.
///
/// Report operations themselves never fail; see [`crate::Report`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// Bad column letters or row number
    #[error(transparent)]
    Address(#[from] tally_core::Error),

    /// Name and result column are the same column
    #[error("Name column and result column must differ (both are {0})")]
    SameColumn(String),

    /// The first test row leaves no room for the header row above it
    #[error("Start row must be at least 2 (row {0} leaves no header row)")]
    StartRowTooLow(u32),

    /// The first test row lies beyond the last row a tab can have
    #[error("Start row {0} is past the last sheet row ({1})")]
    StartRowTooHigh(u32, u32),
}
