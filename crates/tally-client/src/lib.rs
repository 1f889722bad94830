//! Google Sheets client for tally.
//!
//! This crate opens an authorized `google-sheets4` session and wraps the four
//! calls tally needs (range read, range write, spreadsheet metadata, batch
//! update) behind the [`Sheet`] façade, which never returns an error: failures are
//! logged and reported as an empty list or `false`.
//!
//! # Architecture
//!
//! ```text
//! Sheet (façade, soft failures)
//!     └── dyn SpreadsheetService
//!           ├── GoogleSheetsService (google-sheets4 hub, blocking on a private runtime)
//!           └── MemoryService (in-process, for tests and offline runs)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use tally_client::{CredentialsConfig, Sheet};
//!
//! let sheet = Sheet::connect("1AbCdEf", &CredentialsConfig::default());
//! let names = sheet.read_range("Results", "C", 5, "C", 14);
//! sheet.set_value("PASSED", "Results!E5:E5");
//! # let _ = names;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod memory;
pub mod service;
pub mod sheet;

pub use config::CredentialsConfig;
pub use error::{ClientError, Result};
pub use memory::MemoryService;
pub use service::{GoogleSheetsService, SpreadsheetService};
pub use sheet::Sheet;
pub use tally_protocol::{CellValue, Rows, ValueInputOption, ValueRenderOption};

/// SDK request and response types used by [`SpreadsheetService`].
pub use google_sheets4::api;
