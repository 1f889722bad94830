//! Process-wide cache of sheets and reports, keyed by spreadsheet identifier.
//!
//! Repeated calls for the same spreadsheet reuse one API session. The free
//! functions at the bottom of this module go through a global [`Registry`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lazy_static::lazy_static;
use tally_client::{CellValue, CredentialsConfig, Rows, Sheet};

use crate::error::Result;
use crate::report::{Report, ReportLayout};

/// Opens a [`Sheet`] for a spreadsheet identifier.
pub type SessionFactory = Box<dyn Fn(&str, &CredentialsConfig) -> Sheet + Send + Sync>;

/// Settings plus the memoized sheets and reports.
pub struct Registry {
    credentials: CredentialsConfig,
    layout: ReportLayout,
    factory: SessionFactory,
    sheets: HashMap<String, Arc<Sheet>>,
    reports: HashMap<String, Report>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry that opens real Google Sheets sessions.
    pub fn new() -> Self {
        Self::with_factory(|id, config| Sheet::connect(id, config))
    }

    /// A registry that opens sessions with `factory`.
    pub fn with_factory(
        factory: impl Fn(&str, &CredentialsConfig) -> Sheet + Send + Sync + 'static,
    ) -> Self {
        Self {
            credentials: CredentialsConfig::default(),
            layout: ReportLayout::default(),
            factory: Box::new(factory),
            sheets: HashMap::new(),
            reports: HashMap::new(),
        }
    }

    // ========================================================================
    // Settings
    // ========================================================================

    pub fn credentials(&self) -> &CredentialsConfig {
        &self.credentials
    }

    /// Replace the credential settings. Only sessions opened afterwards use them.
    pub fn set_credentials(&mut self, credentials: CredentialsConfig) {
        self.credentials = credentials;
    }

    /// Override the credential directory and/or file name; empty values are ignored.
    pub fn set_credential_dir(&mut self, directory: &str, file_name: &str) {
        self.credentials.set_credential_dir(directory, file_name);
    }

    pub fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    /// Replace the report layout; cached reports pick it up on their next call.
    pub fn set_layout(&mut self, layout: ReportLayout) {
        self.layout = layout;
    }

    /// Set the name and result columns (e.g. `"C"`, `"E"`).
    pub fn set_test_columns(&mut self, name_column: &str, result_column: &str) -> Result<()> {
        self.layout = ReportLayout::new(name_column, result_column, self.layout.start_row)?;
        Ok(())
    }

    /// Set the first row holding a test name.
    pub fn set_start_row(&mut self, start_row: u32) -> Result<()> {
        self.layout = ReportLayout::new(
            &self.layout.name_column,
            &self.layout.result_column,
            start_row,
        )?;
        Ok(())
    }

    // ========================================================================
    // Cache
    // ========================================================================

    /// The cached sheet for `spreadsheet_id`, opening a session on first use.
    pub fn sheet(&mut self, spreadsheet_id: &str) -> Arc<Sheet> {
        if let Some(sheet) = self.sheets.get(spreadsheet_id) {
            return Arc::clone(sheet);
        }

        tracing::debug!("Opening session for spreadsheet {spreadsheet_id}");
        let sheet = Arc::new((self.factory)(spreadsheet_id, &self.credentials));
        self.sheets
            .insert(spreadsheet_id.to_string(), Arc::clone(&sheet));
        sheet
    }

    /// The cached report for `spreadsheet_id`, created on first use.
    pub fn report(&mut self, spreadsheet_id: &str) -> &mut Report {
        let sheet = self.sheet(spreadsheet_id);
        let layout = self.layout.clone();
        let report = self
            .reports
            .entry(spreadsheet_id.to_string())
            .or_insert_with(|| Report::new(sheet, layout.clone()));
        if report.layout() != &layout {
            report.set_layout(layout);
        }
        report
    }

    /// Number of cached sessions.
    pub fn session_count(&self) -> usize {
        self.sheets.len()
    }

    /// Drop every cached sheet and report.
    pub fn clear(&mut self) {
        self.reports.clear();
        self.sheets.clear();
    }

    // ========================================================================
    // Sheet operations by spreadsheet identifier
    // ========================================================================

    pub fn read_range(
        &mut self,
        sheet_name: &str,
        start_col: &str,
        start_row: u32,
        end_col: &str,
        end_row: u32,
        spreadsheet_id: &str,
    ) -> Rows {
        self.sheet(spreadsheet_id)
            .read_range(sheet_name, start_col, start_row, end_col, end_row)
    }

    pub fn set_value(
        &mut self,
        value: impl Into<CellValue>,
        write_range: &str,
        spreadsheet_id: &str,
    ) -> bool {
        self.sheet(spreadsheet_id).set_value(value, write_range)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_values(
        &mut self,
        values: Rows,
        sheet_name: &str,
        start_col: &str,
        start_row: u32,
        end_col: &str,
        end_row: u32,
        spreadsheet_id: &str,
    ) -> bool {
        self.sheet(spreadsheet_id)
            .set_values(values, sheet_name, start_col, start_row, end_col, end_row)
    }

    pub fn set_values_in(&mut self, values: Rows, write_range: &str, spreadsheet_id: &str) -> bool {
        self.sheet(spreadsheet_id).set_values_in(values, write_range)
    }

    pub fn insert_column(&mut self, column_index: u32, sheet_name: &str, spreadsheet_id: &str) -> bool {
        self.sheet(spreadsheet_id)
            .insert_column(column_index, sheet_name)
    }

    // ========================================================================
    // Report operations by spreadsheet identifier
    // ========================================================================

    pub fn find_test_by_name(
        &mut self,
        test_name: &str,
        sheet_name: &str,
        spreadsheet_id: &str,
        allow_existing_result: bool,
    ) -> Option<u32> {
        self.report(spreadsheet_id)
            .find_test_by_name(test_name, sheet_name, allow_existing_result)
    }

    pub fn update_test_result_by_name(
        &mut self,
        test_name: &str,
        test_result: &str,
        sheet_name: &str,
        spreadsheet_id: &str,
        overwrite_result: bool,
    ) -> Option<u32> {
        self.report(spreadsheet_id).update_test_result_by_name(
            test_name,
            test_result,
            sheet_name,
            overwrite_result,
        )
    }

    pub fn create_new_result_col(&mut self, sheet_name: &str, spreadsheet_id: &str) -> bool {
        self.report(spreadsheet_id)
            .create_new_result_col(sheet_name)
    }

    pub fn overwrite_result_col_header(
        &mut self,
        title: &str,
        sheet_name: &str,
        spreadsheet_id: &str,
    ) -> bool {
        self.report(spreadsheet_id)
            .overwrite_result_col_header(title, sheet_name)
    }
}

lazy_static! {
    static ref REGISTRY: Mutex<Registry> = Mutex::new(Registry::new());
}

/// Lock the global registry.
pub fn global() -> MutexGuard<'static, Registry> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Override where credentials are loaded from; empty values are ignored.
pub fn set_credential_dir(directory: &str, file_name: &str) {
    global().set_credential_dir(directory, file_name);
}

/// Set the name and result columns used by every report.
pub fn set_test_columns(name_column: &str, result_column: &str) -> Result<()> {
    global().set_test_columns(name_column, result_column)
}

/// Set the first row holding a test name.
pub fn set_start_row(start_row: u32) -> Result<()> {
    global().set_start_row(start_row)
}

/// See [`Report::find_test_by_name`].
pub fn find_test_by_name(
    test_name: &str,
    sheet_name: &str,
    spreadsheet_id: &str,
    allow_existing_result: bool,
) -> Option<u32> {
    global().find_test_by_name(test_name, sheet_name, spreadsheet_id, allow_existing_result)
}

/// See [`Report::update_test_result_by_name`].
pub fn update_test_result_by_name(
    test_name: &str,
    test_result: &str,
    sheet_name: &str,
    spreadsheet_id: &str,
    overwrite_result: bool,
) -> Option<u32> {
    global().update_test_result_by_name(
        test_name,
        test_result,
        sheet_name,
        spreadsheet_id,
        overwrite_result,
    )
}

/// See [`Report::create_new_result_col`].
pub fn create_new_result_col(sheet_name: &str, spreadsheet_id: &str) -> bool {
    global().create_new_result_col(sheet_name, spreadsheet_id)
}

/// See [`Report::overwrite_result_col_header`].
pub fn overwrite_result_col_header(title: &str, sheet_name: &str, spreadsheet_id: &str) -> bool {
    global().overwrite_result_col_header(title, sheet_name, spreadsheet_id)
}

/// See [`Sheet::read_range`].
pub fn read_range(
    sheet_name: &str,
    start_col: &str,
    start_row: u32,
    end_col: &str,
    end_row: u32,
    spreadsheet_id: &str,
) -> Rows {
    global().read_range(sheet_name, start_col, start_row, end_col, end_row, spreadsheet_id)
}

/// See [`Sheet::set_value`].
pub fn set_value(value: impl Into<CellValue>, write_range: &str, spreadsheet_id: &str) -> bool {
    global().set_value(value, write_range, spreadsheet_id)
}

/// See [`Sheet::set_values`].
#[allow(clippy::too_many_arguments)]
pub fn set_values(
    values: Rows,
    sheet_name: &str,
    start_col: &str,
    start_row: u32,
    end_col: &str,
    end_row: u32,
    spreadsheet_id: &str,
) -> bool {
    global().set_values(
        values,
        sheet_name,
        start_col,
        start_row,
        end_col,
        end_row,
        spreadsheet_id,
    )
}

/// See [`Sheet::set_values_in`].
pub fn set_values_in(values: Rows, write_range: &str, spreadsheet_id: &str) -> bool {
    global().set_values_in(values, write_range, spreadsheet_id)
}

/// See [`Sheet::insert_column`].
pub fn insert_column(column_index: u32, sheet_name: &str, spreadsheet_id: &str) -> bool {
    global().insert_column(column_index, sheet_name, spreadsheet_id)
}
