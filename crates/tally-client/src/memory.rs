//! An in-memory [`SpreadsheetService`] with the Sheets API's read/write
//! semantics, for tests and offline runs.
//!
//! Reads trim trailing blank cells and rows the way the real API does, so a
//! range with nothing in it comes back with no values at all. Writes skip
//! `null` cells and clear cells written as `""`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use google_sheets4::api::{
    BatchUpdateSpreadsheetRequest, BatchUpdateSpreadsheetResponse, Response, Sheet,
    SheetProperties, Spreadsheet, SpreadsheetProperties, UpdateValuesResponse, ValueRange,
};
use tally_core::{CellAddress, SheetRange};
use tally_protocol::{rows_to_json, CellValue, Rows, ValueInputOption, ValueRenderOption};

use crate::error::{ClientError, Result};
use crate::service::SpreadsheetService;

#[derive(Debug, Default)]
struct Tab {
    sheet_id: i32,
    title: String,
    /// Keyed by (row, col), both 1-based
    cells: BTreeMap<(u32, u32), CellValue>,
}

#[derive(Debug, Default)]
struct State {
    spreadsheets: HashMap<String, Vec<Tab>>,
    failing: bool,
    calls: usize,
}

impl State {
    fn tabs(&self, spreadsheet_id: &str) -> Result<&Vec<Tab>> {
        self.spreadsheets
            .get(spreadsheet_id)
            .ok_or_else(|| ClientError::api(404, "Requested entity was not found."))
    }

    fn tabs_mut(&mut self, spreadsheet_id: &str) -> Result<&mut Vec<Tab>> {
        self.spreadsheets
            .get_mut(spreadsheet_id)
            .ok_or_else(|| ClientError::api(404, "Requested entity was not found."))
    }

    fn tab_mut(&mut self, spreadsheet_id: &str, range: &SheetRange) -> Result<&mut Tab> {
        let title = range.sheet.clone().unwrap_or_default();
        self.tabs_mut(spreadsheet_id)?
            .iter_mut()
            .find(|t| t.title.to_lowercase() == title.to_lowercase())
            .ok_or_else(|| ClientError::api(400, format!("Unable to parse range: {range}")))
    }

    /// Count the call and fail it if failure injection is on.
    fn enter(&mut self) -> Result<()> {
        self.calls += 1;
        if self.failing {
            return Err(ClientError::api(503, "The service is currently unavailable."));
        }
        Ok(())
    }
}

/// Shared in-memory spreadsheet store. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryService {
    state: Arc<Mutex<State>>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a tab to a spreadsheet (creating the spreadsheet if needed) and
    /// return its numeric sheet id.
    pub fn add_sheet(&self, spreadsheet_id: &str, title: &str) -> i32 {
        let mut state = self.lock();
        let tabs = state
            .spreadsheets
            .entry(spreadsheet_id.to_string())
            .or_default();
        let sheet_id = 1000 + tabs.len() as i32;
        tabs.push(Tab {
            sheet_id,
            title: title.to_string(),
            cells: BTreeMap::new(),
        });
        sheet_id
    }

    /// Set one cell, e.g. `put("id", "Results", "C5", "login")`.
    pub fn put(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        cell: &str,
        value: impl Into<CellValue>,
    ) -> Result<()> {
        let addr = CellAddress::parse(cell)?;
        let range = SheetRange::new(Some(sheet.to_string()), addr, addr);
        let mut state = self.lock();
        let tab = state.tab_mut(spreadsheet_id, &range)?;
        tab.cells.insert((addr.row, addr.col), value.into());
        Ok(())
    }

    /// Read one cell; blank when unset or when the tab doesn't exist.
    pub fn get(&self, spreadsheet_id: &str, sheet: &str, cell: &str) -> CellValue {
        let Ok(addr) = CellAddress::parse(cell) else {
            return CellValue::Null;
        };
        let state = self.lock();
        state
            .spreadsheets
            .get(spreadsheet_id)
            .and_then(|tabs| {
                tabs.iter()
                    .find(|t| t.title.to_lowercase() == sheet.to_lowercase())
            })
            .and_then(|tab| tab.cells.get(&(addr.row, addr.col)).cloned())
            .unwrap_or(CellValue::Null)
    }

    /// Make every subsequent API call fail (or stop failing).
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Number of API calls made so far.
    pub fn call_count(&self) -> usize {
        self.lock().calls
    }
}

impl SpreadsheetService for MemoryService {
    fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        _render: ValueRenderOption,
    ) -> Result<ValueRange> {
        let mut state = self.lock();
        state.enter()?;
        let parsed = SheetRange::parse(range)?;
        let tab = state.tab_mut(spreadsheet_id, &parsed)?;

        let mut values: Rows = (parsed.start.row..=parsed.end.row)
            .map(|row| {
                let mut cells: Vec<CellValue> = (parsed.start.col..=parsed.end.col)
                    .map(|col| tab.cells.get(&(row, col)).cloned().unwrap_or(CellValue::Null))
                    .collect();
                while cells.last().map_or(false, CellValue::is_blank) {
                    cells.pop();
                }
                cells
            })
            .collect();
        while values.last().map_or(false, Vec::is_empty) {
            values.pop();
        }

        Ok(ValueRange {
            range: Some(parsed.to_a1_string()),
            major_dimension: Some("ROWS".to_string()),
            values: (!values.is_empty()).then(|| rows_to_json(&values)),
            ..Default::default()
        })
    }

    fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        body: ValueRange,
        _input: ValueInputOption,
    ) -> Result<UpdateValuesResponse> {
        let mut state = self.lock();
        state.enter()?;
        let parsed = SheetRange::parse(range)?;
        let values = body.values.unwrap_or_default();

        let too_tall = values.len() as u32 > parsed.row_count();
        let too_wide = values.iter().any(|r| r.len() as u32 > parsed.col_count());
        if too_tall || too_wide {
            return Err(ClientError::api(
                400,
                format!("Requested writing within range [{range}], but tried writing past it."),
            ));
        }

        let tab = state.tab_mut(spreadsheet_id, &parsed)?;
        let mut updated_cells = 0;
        for (r, row) in values.iter().enumerate() {
            for (c, json) in row.iter().enumerate() {
                let key = (parsed.start.row + r as u32, parsed.start.col + c as u32);
                match CellValue::from_json(json) {
                    // null leaves the cell as it is
                    CellValue::Null => continue,
                    value if value.is_blank() => {
                        tab.cells.remove(&key);
                    }
                    value => {
                        tab.cells.insert(key, value);
                    }
                }
                updated_cells += 1;
            }
        }

        Ok(UpdateValuesResponse {
            spreadsheet_id: Some(spreadsheet_id.to_string()),
            updated_range: Some(parsed.to_a1_string()),
            updated_rows: Some(values.len() as i32),
            updated_columns: Some(values.iter().map(Vec::len).max().unwrap_or(0) as i32),
            updated_cells: Some(updated_cells),
            ..Default::default()
        })
    }

    fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet> {
        let mut state = self.lock();
        state.enter()?;
        let tabs = state.tabs(spreadsheet_id)?;

        Ok(Spreadsheet {
            spreadsheet_id: Some(spreadsheet_id.to_string()),
            properties: Some(SpreadsheetProperties {
                title: Some(spreadsheet_id.to_string()),
                ..Default::default()
            }),
            sheets: Some(
                tabs.iter()
                    .enumerate()
                    .map(|(index, tab)| Sheet {
                        properties: Some(SheetProperties {
                            sheet_id: Some(tab.sheet_id),
                            title: Some(tab.title.clone()),
                            index: Some(index as i32),
                            ..Default::default()
                        }),
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        })
    }

    fn batch_update(
        &self,
        spreadsheet_id: &str,
        request: BatchUpdateSpreadsheetRequest,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        let mut state = self.lock();
        state.enter()?;
        let tabs = state.tabs_mut(spreadsheet_id)?;
        let requests = request.requests.unwrap_or_default();

        for req in &requests {
            let Some(insert) = &req.insert_dimension else {
                return Err(ClientError::api(400, "Only insertDimension is supported"));
            };
            let range = insert.range.clone().unwrap_or_default();
            let sheet_id = range.sheet_id.unwrap_or_default();
            let tab = tabs
                .iter_mut()
                .find(|t| t.sheet_id == sheet_id)
                .ok_or_else(|| ClientError::api(400, format!("No grid with id: {sheet_id}")))?;

            let (start, end) = (range.start_index.unwrap_or(0), range.end_index.unwrap_or(0));
            if start < 0 || end <= start {
                return Err(ClientError::api(400, "Invalid dimension range"));
            }
            // Indices are 0-based; stored coordinates are 1-based
            let first = start as u32 + 1;
            let count = (end - start) as u32;
            let columns = match range.dimension.as_deref() {
                Some("COLUMNS") => true,
                Some("ROWS") => false,
                other => {
                    return Err(ClientError::api(400, format!("Invalid dimension: {other:?}")))
                }
            };

            tab.cells = std::mem::take(&mut tab.cells)
                .into_iter()
                .map(|((row, col), value)| {
                    if columns && col >= first {
                        ((row, col + count), value)
                    } else if !columns && row >= first {
                        ((row + count, col), value)
                    } else {
                        ((row, col), value)
                    }
                })
                .collect();
        }

        Ok(BatchUpdateSpreadsheetResponse {
            spreadsheet_id: Some(spreadsheet_id.to_string()),
            replies: Some(requests.iter().map(|_| Response::default()).collect()),
            ..Default::default()
        })
    }
}
