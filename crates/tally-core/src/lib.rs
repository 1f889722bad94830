//! # tally-core
//!
//! A1 addressing for the tally test-result recorder.
//!
//! This crate provides the small set of types shared by the other tally crates:
//! - [`column_to_letters`] and [`letters_to_column`] - 1-based column index ⇄ letters
//! - [`CellAddress`] - a single cell such as `C5`
//! - [`SheetRange`] - a sheet-qualified rectangle such as `'Smoke Tests'!C5:C14`
//!
//! ## Example
//!
//! ```rust
//! use tally_core::{column_to_letters, letters_to_column, SheetRange};
//!
//! assert_eq!(column_to_letters(27).unwrap(), "AA");
//! assert_eq!(letters_to_column("E").unwrap(), 5);
//!
//! let range = SheetRange::from_bounds("Results", "C", 5, "C", 14).unwrap();
//! assert_eq!(range.to_string(), "Results!C5:C14");
//! ```

pub mod address;
pub mod error;

pub use address::{column_to_letters, letters_to_column, quote_sheet_name, CellAddress, SheetRange};
pub use error::{Error, Result};

/// Maximum number of columns in a Google Sheets tab (`ZZZ`)
pub const MAX_COLS: u32 = 18_278;

/// Most rows a Google Sheets tab can hold (the 10 million cell limit of a
/// single-column tab)
pub const MAX_ROWS: u32 = 10_000_000;
