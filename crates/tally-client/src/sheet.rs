//! The `Sheet` façade: one spreadsheet, one API session.
//!
//! Every operation swallows its error: failures are logged with
//! `tracing::warn!` and reported as an empty row list or `false`. No call is
//! retried.

use google_sheets4::api::{
    BatchUpdateSpreadsheetRequest, DimensionRange, InsertDimensionRequest, Request, Spreadsheet,
    ValueRange,
};
use tally_core::{Error as RangeError, SheetRange, MAX_COLS};
use tally_protocol::{
    rows_from_json, rows_to_json, CellValue, Rows, ValueInputOption, ValueRenderOption,
};

use crate::config::CredentialsConfig;
use crate::error::{ClientError, Result};
use crate::service::{GoogleSheetsService, SpreadsheetService};

/// A handle to one spreadsheet.
///
/// The session is `None` when it could not be opened (missing credentials,
/// refused consent, ...); every call then fails softly.
pub struct Sheet {
    spreadsheet_id: String,
    service: Option<Box<dyn SpreadsheetService>>,
}

impl Sheet {
    /// Open a Google Sheets session for `spreadsheet_id`.
    pub fn connect(spreadsheet_id: &str, config: &CredentialsConfig) -> Self {
        let service = match GoogleSheetsService::connect(config) {
            Ok(service) => {
                tracing::info!("Opened Sheets session for {spreadsheet_id}");
                Some(Box::new(service) as Box<dyn SpreadsheetService>)
            }
            Err(e) => {
                tracing::warn!("Cannot open Sheets session for {spreadsheet_id}: {e}");
                None
            }
        };

        Self {
            spreadsheet_id: spreadsheet_id.to_string(),
            service,
        }
    }

    /// Bind `spreadsheet_id` to an existing service.
    pub fn with_service(spreadsheet_id: &str, service: impl SpreadsheetService + 'static) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.to_string(),
            service: Some(Box::new(service)),
        }
    }

    /// A handle with no session; every call fails softly.
    pub fn disconnected(spreadsheet_id: &str) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.to_string(),
            service: None,
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn is_connected(&self) -> bool {
        self.service.is_some()
    }

    fn service(&self) -> Result<&dyn SpreadsheetService> {
        self.service
            .as_deref()
            .ok_or_else(|| ClientError::NoSession(self.spreadsheet_id.clone()))
    }

    // ========================================================================
    // Fallible operations
    // ========================================================================

    /// Read `sheet_name!{start_col}{start_row}:{end_col}{end_row}` with formulas unevaluated.
    pub fn try_read_range(
        &self,
        sheet_name: &str,
        start_col: &str,
        start_row: u32,
        end_col: &str,
        end_row: u32,
    ) -> Result<Rows> {
        let range = SheetRange::from_bounds(sheet_name, start_col, start_row, end_col, end_row)?;
        let vr = self.service()?.get_values(
            &self.spreadsheet_id,
            &range.to_a1_string(),
            ValueRenderOption::Formula,
        )?;
        Ok(rows_from_json(vr.values))
    }

    /// Write `values` to the A1 range `write_range`, parsed as if typed by a user.
    pub fn try_set_values_in(&self, values: Rows, write_range: &str) -> Result<()> {
        let body = ValueRange {
            range: Some(write_range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values: Some(rows_to_json(&values)),
            ..Default::default()
        };
        let update = self.service()?.update_values(
            &self.spreadsheet_id,
            write_range,
            body,
            ValueInputOption::UserEntered,
        )?;
        tracing::debug!(
            "Updated {} cell(s) in {}",
            update.updated_cells.unwrap_or(0),
            update.updated_range.as_deref().unwrap_or(write_range)
        );
        Ok(())
    }

    /// Insert one column before the 0-based `column_index` of tab `sheet_name`.
    pub fn try_insert_column(&self, column_index: u32, sheet_name: &str) -> Result<()> {
        if column_index >= MAX_COLS {
            return Err(RangeError::ColumnOutOfBounds(column_index.saturating_add(1), MAX_COLS).into());
        }

        let service = self.service()?;
        let spreadsheet = service.get_spreadsheet(&self.spreadsheet_id)?;
        let sheet_id = sheet_id_by_title(&spreadsheet, sheet_name)
            .ok_or_else(|| ClientError::SheetNotFound(sheet_name.to_string()))?;

        service.batch_update(
            &self.spreadsheet_id,
            insert_column_request(sheet_id, column_index as i32),
        )?;
        Ok(())
    }

    // ========================================================================
    // Soft-failing operations
    // ========================================================================

    /// Read a range; empty on any failure.
    pub fn read_range(
        &self,
        sheet_name: &str,
        start_col: &str,
        start_row: u32,
        end_col: &str,
        end_row: u32,
    ) -> Rows {
        self.try_read_range(sheet_name, start_col, start_row, end_col, end_row)
            .unwrap_or_else(|e| {
                tracing::warn!(
                    "read_range {sheet_name}!{start_col}{start_row}:{end_col}{end_row} failed: {e}"
                );
                Vec::new()
            })
    }

    /// Write a single value to `write_range`; `false` on any failure.
    pub fn set_value(&self, value: impl Into<CellValue>, write_range: &str) -> bool {
        self.set_values_in(vec![vec![value.into()]], write_range)
    }

    /// Write rows of values to a range given by its bounds; `false` on any failure.
    pub fn set_values(
        &self,
        values: Rows,
        sheet_name: &str,
        start_col: &str,
        start_row: u32,
        end_col: &str,
        end_row: u32,
    ) -> bool {
        match SheetRange::from_bounds(sheet_name, start_col, start_row, end_col, end_row) {
            Ok(range) => self.set_values_in(values, &range.to_a1_string()),
            Err(e) => {
                tracing::warn!("set_values on {sheet_name}: {e}");
                false
            }
        }
    }

    /// Write rows of values to the A1 range `write_range`; `false` on any failure.
    pub fn set_values_in(&self, values: Rows, write_range: &str) -> bool {
        match self.try_set_values_in(values, write_range) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("write to {write_range} failed: {e}");
                false
            }
        }
    }

    /// Insert a column into tab `sheet_name`; `false` on any failure,
    /// including an unknown tab.
    pub fn insert_column(&self, column_index: u32, sheet_name: &str) -> bool {
        match self.try_insert_column(column_index, sheet_name) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("insert_column {column_index} on {sheet_name} failed: {e}");
                false
            }
        }
    }
}

/// Numeric id of the tab whose title matches `title`, ignoring case.
pub(crate) fn sheet_id_by_title(spreadsheet: &Spreadsheet, title: &str) -> Option<i32> {
    let title = title.to_lowercase();
    spreadsheet
        .sheets
        .iter()
        .flatten()
        .filter_map(|s| s.properties.as_ref())
        .find(|p| p.title.as_deref().map(str::to_lowercase).as_deref() == Some(title.as_str()))
        .and_then(|p| p.sheet_id)
}

/// One `insertDimension` request adding a column before the 0-based `column_index`.
pub(crate) fn insert_column_request(sheet_id: i32, column_index: i32) -> BatchUpdateSpreadsheetRequest {
    BatchUpdateSpreadsheetRequest {
        requests: Some(vec![Request {
            insert_dimension: Some(InsertDimensionRequest {
                range: Some(DimensionRange {
                    sheet_id: Some(sheet_id),
                    dimension: Some("COLUMNS".to_string()),
                    start_index: Some(column_index),
                    end_index: Some(column_index + 1),
                    ..Default::default()
                }),
                inherit_from_before: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

impl std::fmt::Debug for Sheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sheet")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("connected", &self.is_connected())
            .finish()
    }
}
