//! Test-result bookkeeping on top of a [`Sheet`].
//!
//! A report tab has a fixed layout: test names in one column, results in
//! another, both starting at [`ReportLayout::start_row`]. The row just above
//! holds the result column's header (usually a run timestamp).
//!
//! ```text
//!        C (names)        E (results)
//!   4                     20240301-021500     <- header row
//!   5    login            PASSED
//!   6    checkout         FAILED
//!   7    refund
//! ```

use std::sync::Arc;

use chrono::Local;
use tally_client::{CellValue, Rows, Sheet};
use tally_core::{letters_to_column, SheetRange, MAX_ROWS};

use crate::error::{ReportError, Result};

/// Rows fetched per name-column read.
pub const BLOCK_ROWS: u32 = 10;

/// A scan stops at this many consecutive blank names.
///
/// Earlier releases tolerated five blanks and stopped on the sixth; a gap of
/// exactly five blank rows now ends the scan.
pub const MAX_BLANK_ROWS: u32 = 5;

/// Upper bound on blocks read by one scan.
pub const MAX_BLOCKS: u32 = 1000;

/// `strftime` pattern of result column headers (`20240301-021500`).
pub const HEADER_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Where names and results live on a report tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    /// Column holding test names. Default: `C`.
    pub name_column: String,
    /// Column holding results. Default: `E`.
    pub result_column: String,
    /// First row holding a test name. Default: 5.
    pub start_row: u32,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            name_column: "C".to_string(),
            result_column: "E".to_string(),
            start_row: 5,
        }
    }
}

impl ReportLayout {
    /// Create a validated layout. Column letters are normalized to upper case.
    pub fn new(name_column: &str, result_column: &str, start_row: u32) -> Result<Self> {
        let name_idx = letters_to_column(name_column)?;
        let result_idx = letters_to_column(result_column)?;
        if name_idx == result_idx {
            return Err(ReportError::SameColumn(name_column.to_ascii_uppercase()));
        }
        if start_row < 2 {
            return Err(ReportError::StartRowTooLow(start_row));
        }
        if start_row > MAX_ROWS {
            return Err(ReportError::StartRowTooHigh(start_row, MAX_ROWS));
        }

        Ok(Self {
            name_column: name_column.to_ascii_uppercase(),
            result_column: result_column.to_ascii_uppercase(),
            start_row,
        })
    }

    /// Row holding the result column header.
    pub fn header_row(&self) -> u32 {
        self.start_row.saturating_sub(1)
    }
}

/// Finds and updates test rows in one spreadsheet.
///
/// Operations never fail: problems are logged and reported as `None` or
/// `false`, so "not found" and "API failure" look the same to the caller.
#[derive(Debug)]
pub struct Report {
    sheet: Arc<Sheet>,
    layout: ReportLayout,
    /// Last row with a non-blank name seen by the most recent scan
    last_name_row: Option<u32>,
}

impl Report {
    pub fn new(sheet: Arc<Sheet>, layout: ReportLayout) -> Self {
        Self {
            sheet,
            layout,
            last_name_row: None,
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        self.sheet.spreadsheet_id()
    }

    pub fn sheet(&self) -> &Arc<Sheet> {
        &self.sheet
    }

    pub fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: ReportLayout) {
        self.layout = layout;
    }

    /// Last row with a non-blank name seen by the most recent scan.
    pub fn last_name_row(&self) -> Option<u32> {
        self.last_name_row
    }

    /// Find the row of `test_name` on tab `sheet_name`.
    ///
    /// The name column is read in blocks of [`BLOCK_ROWS`] starting at the
    /// layout's start row. The scan ends after [`MAX_BLANK_ROWS`] consecutive
    /// blank names, or at the first block that comes back empty. Names match
    /// case-insensitively. With `allow_existing_result` false, a matching row
    /// whose result cell is already filled is skipped.
    pub fn find_test_by_name(
        &mut self,
        test_name: &str,
        sheet_name: &str,
        allow_existing_result: bool,
    ) -> Option<u32> {
        if test_name.is_empty() || sheet_name.is_empty() {
            return None;
        }

        self.last_name_row = None;
        let column = self.layout.name_column.clone();
        let mut blank_run = 0;

        for block in 0..MAX_BLOCKS {
            // Layout fields are public, so the start row may bypass `new`
            let Some((first, last)) = block_bounds(self.layout.start_row, block) else {
                tracing::debug!("{sheet_name}: block {block} is past the last row, stopping scan");
                break;
            };
            let names = self
                .sheet
                .read_range(sheet_name, &column, first, &column, last);
            if names.is_empty() {
                tracing::debug!("{sheet_name}!{column}{first}: empty block, stopping scan");
                break;
            }

            for offset in 0..BLOCK_ROWS {
                let row = first + offset;
                let name = cell_text(&names, offset as usize);
                if name.is_empty() {
                    blank_run += 1;
                    if blank_run >= MAX_BLANK_ROWS {
                        tracing::debug!("{sheet_name}: {blank_run} blank names before row {row}");
                        return None;
                    }
                    continue;
                }

                blank_run = 0;
                self.last_name_row = Some(row);
                if same_name(&name, test_name)
                    && (allow_existing_result || self.result_is_blank(sheet_name, row))
                {
                    return Some(row);
                }
            }
        }

        None
    }

    /// Write `result` for `test_name`, appending a new row when needed.
    ///
    /// With `overwrite_result` the first matching row is updated even if it
    /// already has a result; otherwise only a matching row with a blank result
    /// is used. When nothing matches, the name and result are written on the
    /// row after the last name seen (the start row for an empty tab).
    /// Returns the row written.
    pub fn update_test_result_by_name(
        &mut self,
        test_name: &str,
        test_result: &str,
        sheet_name: &str,
        overwrite_result: bool,
    ) -> Option<u32> {
        if test_name.is_empty() || sheet_name.is_empty() {
            return None;
        }

        let result_column = self.layout.result_column.clone();
        if let Some(row) = self.find_test_by_name(test_name, sheet_name, overwrite_result) {
            return self
                .write_cell(sheet_name, &result_column, row, test_result)
                .then_some(row);
        }

        let row = self
            .last_name_row
            .map_or(self.layout.start_row, |last| last.saturating_add(1));
        if row > MAX_ROWS {
            tracing::warn!("{sheet_name}: row {row} for {test_name} is past the last sheet row");
            return None;
        }
        tracing::debug!("{test_name} not found on {sheet_name}, appending at row {row}");

        let name_column = self.layout.name_column.clone();
        let written = self.write_cell(sheet_name, &name_column, row, test_name)
            && self.write_cell(sheet_name, &result_column, row, test_result);
        written.then_some(row)
    }

    /// Insert a fresh result column at the layout's result column and head it
    /// with the current local time.
    pub fn create_new_result_col(&mut self, sheet_name: &str) -> bool {
        let index = match letters_to_column(&self.layout.result_column) {
            Ok(col) => col - 1,
            Err(e) => {
                tracing::warn!("bad result column {}: {e}", self.layout.result_column);
                return false;
            }
        };

        if !self.sheet.insert_column(index, sheet_name) {
            return false;
        }

        let header = Local::now().format(HEADER_TIMESTAMP_FORMAT).to_string();
        self.write_header(sheet_name, header)
    }

    /// Replace the result column header with `"{title}-{timestamp}"`.
    pub fn overwrite_result_col_header(&mut self, title: &str, sheet_name: &str) -> bool {
        let header = format!(
            "{}-{}",
            title,
            Local::now().format(HEADER_TIMESTAMP_FORMAT)
        );
        self.write_header(sheet_name, header)
    }

    fn write_header(&self, sheet_name: &str, header: String) -> bool {
        let column = self.layout.result_column.clone();
        self.write_cell(sheet_name, &column, self.layout.header_row(), header)
    }

    fn result_is_blank(&self, sheet_name: &str, row: u32) -> bool {
        let column = &self.layout.result_column;
        let cells = self.sheet.read_range(sheet_name, column, row, column, row);
        cell_text(&cells, 0).is_empty()
    }

    fn write_cell(
        &self,
        sheet_name: &str,
        column: &str,
        row: u32,
        value: impl Into<CellValue>,
    ) -> bool {
        match SheetRange::cell(sheet_name, column, row) {
            Ok(range) => self.sheet.set_value(value, &range.to_a1_string()),
            Err(e) => {
                tracing::warn!("cannot address {sheet_name}!{column}{row}: {e}");
                false
            }
        }
    }
}

/// First and last row of scan block `block`, or `None` once the block starts
/// past [`MAX_ROWS`].
fn block_bounds(start_row: u32, block: u32) -> Option<(u32, u32)> {
    let first = block
        .checked_mul(BLOCK_ROWS)
        .and_then(|offset| start_row.checked_add(offset))
        .filter(|first| *first <= MAX_ROWS)?;
    Some((first, first + BLOCK_ROWS - 1))
}

/// Text of the first cell of row `index`; empty when the row or cell is missing.
fn cell_text(rows: &Rows, index: usize) -> String {
    rows.get(index)
        .and_then(|row| row.first())
        .map(CellValue::as_text)
        .unwrap_or_default()
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_validation() {
        let layout = ReportLayout::new("b", "f", 3).unwrap();
        assert_eq!(layout.name_column, "B");
        assert_eq!(layout.result_column, "F");
        assert_eq!(layout.header_row(), 2);

        assert_eq!(
            ReportLayout::new("c", "C", 5),
            Err(ReportError::SameColumn("C".into()))
        );
        assert_eq!(
            ReportLayout::new("C", "E", 1),
            Err(ReportError::StartRowTooLow(1))
        );
        assert!(matches!(
            ReportLayout::new("C5", "E", 5),
            Err(ReportError::Address(_))
        ));
    }

    #[test]
    fn test_layout_rejects_rows_past_the_sheet() {
        assert!(ReportLayout::new("C", "E", MAX_ROWS).is_ok());
        assert_eq!(
            ReportLayout::new("C", "E", MAX_ROWS + 1),
            Err(ReportError::StartRowTooHigh(MAX_ROWS + 1, MAX_ROWS))
        );
        assert_eq!(
            ReportLayout::new("C", "E", u32::MAX - 3),
            Err(ReportError::StartRowTooHigh(u32::MAX - 3, MAX_ROWS))
        );
    }

    #[test]
    fn test_block_bounds() {
        assert_eq!(block_bounds(5, 0), Some((5, 14)));
        assert_eq!(block_bounds(5, 2), Some((25, 34)));
        assert_eq!(block_bounds(MAX_ROWS, 0), Some((MAX_ROWS, MAX_ROWS + 9)));
        assert_eq!(block_bounds(MAX_ROWS - 5, 1), None);
        assert_eq!(block_bounds(u32::MAX - 3, 0), None);
        assert_eq!(block_bounds(5, u32::MAX), None);
    }

    #[test]
    fn test_default_layout() {
        let layout = ReportLayout::default();
        assert_eq!(layout, ReportLayout::new("C", "E", 5).unwrap());
        assert_eq!(layout.header_row(), 4);
    }

    #[test]
    fn test_same_name_ignores_case() {
        assert!(same_name("Login Flow", "login flow"));
        assert!(same_name("ÉCHEC", "échec"));
        assert!(!same_name("login", "login "));
    }

    #[test]
    fn test_cell_text() {
        let rows: Rows = vec![vec!["a".into()], vec![], vec![CellValue::Number(7.0)]];
        assert_eq!(cell_text(&rows, 0), "a");
        assert_eq!(cell_text(&rows, 1), "");
        assert_eq!(cell_text(&rows, 2), "7");
        assert_eq!(cell_text(&rows, 9), "");
    }
}
