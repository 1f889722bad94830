//! # tally
//!
//! Record automated-test results into a Google Sheets spreadsheet.
//!
//! Given a test name, tally finds the test's row on a report tab (or appends
//! one) and writes a result into the result column. A new, timestamped result
//! column can be inserted at the start of each run.
//!
//! ## Features
//!
//! - Block-wise scan of the name column with case-insensitive matching
//! - Overwrite or fill-the-blank policies for existing results
//! - Timestamped result column insertion and header rewriting
//! - Sessions memoized per spreadsheet identifier
//! - Failures are logged via `tracing` and reported as `None` / `false`
//!
//! ## Example
//!
//! ```rust,no_run
//! // Uses gconf/gsheet-auth.json, names in column C, results in column E from row 5
//! let doc = "1AbCdEfGhIjKlMnOpQrStUvWxYz";
//!
//! tally::create_new_result_col("Nightly", doc);
//! match tally::update_test_result_by_name("login", "PASSED", "Nightly", doc, false) {
//!     Some(row) => println!("recorded on row {row}"),
//!     None => eprintln!("could not record result"),
//! }
//! ```
//!
//! Or with an explicit session:
//!
//! ```rust
//! use std::sync::Arc;
//! use tally::prelude::*;
//!
//! let svc = MemoryService::new();
//! svc.add_sheet("doc", "Nightly");
//!
//! let sheet = Arc::new(Sheet::with_service("doc", svc.clone()));
//! let mut report = Report::new(sheet, ReportLayout::default());
//!
//! assert_eq!(report.update_test_result_by_name("login", "PASSED", "Nightly", false), Some(5));
//! assert_eq!(report.find_test_by_name("LOGIN", "Nightly", true), Some(5));
//! ```

pub mod error;
pub mod prelude;
pub mod registry;
pub mod report;

pub use error::{ReportError, Result};
pub use registry::{
    create_new_result_col, find_test_by_name, global, insert_column, overwrite_result_col_header,
    read_range, set_credential_dir, set_start_row, set_test_columns, set_value, set_values,
    set_values_in, update_test_result_by_name, Registry, SessionFactory,
};
pub use report::{
    Report, ReportLayout, BLOCK_ROWS, HEADER_TIMESTAMP_FORMAT, MAX_BLANK_ROWS, MAX_BLOCKS,
};

// Re-export addressing helpers
pub use tally_core::{column_to_letters, letters_to_column, CellAddress, SheetRange};

// Re-export client types
pub use tally_client::{
    CellValue, ClientError, CredentialsConfig, MemoryService, Rows, Sheet, SpreadsheetService,
};
