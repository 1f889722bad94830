//! Error types for the Sheets client.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid range: {0}")]
    Range(#[from] tally_core::Error),

    #[error("No credentials found at {0} and no bundled credentials configured")]
    CredentialsNotFound(PathBuf),

    #[error("Unreadable credentials: {0}")]
    InvalidCredentials(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sheets API call failed: {0}")]
    Sheets(#[from] google_sheets4::Error),

    #[error("Sheets API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("No API session for spreadsheet {0}")]
    NoSession(String),
}

impl ClientError {
    pub(crate) fn api(status: u16, message: impl Into<String>) -> Self {
        ClientError::Api {
            status,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
