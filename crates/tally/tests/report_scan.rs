//! Row search and update policy against deterministic in-memory sheets.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use regex::Regex;
use tally::prelude::*;
use tally_client::api::{
    BatchUpdateSpreadsheetRequest, BatchUpdateSpreadsheetResponse, Spreadsheet,
    UpdateValuesResponse, ValueRange,
};
use tally_client::{ClientError, ValueInputOption, ValueRenderOption};

const DOC: &str = "1AbCdEfGhIjK";
const TAB: &str = "Nightly";

/// A report over a fresh in-memory tab with `names` in C5, C6, ...
fn setup(names: &[&str]) -> (MemoryService, Report) {
    let svc = MemoryService::new();
    svc.add_sheet(DOC, TAB);
    for (i, name) in names.iter().enumerate() {
        if !name.is_empty() {
            svc.put(DOC, TAB, &format!("C{}", 5 + i), *name).unwrap();
        }
    }
    let sheet = Arc::new(Sheet::with_service(DOC, svc.clone()));
    (svc, Report::new(sheet, ReportLayout::default()))
}

fn text(svc: &MemoryService, cell: &str) -> String {
    svc.get(DOC, TAB, cell).as_text()
}

#[test]
fn test_absent_name_is_not_found() {
    let (_svc, mut report) = setup(&["login", "checkout", "refund"]);

    assert_eq!(report.find_test_by_name("search", TAB, true), None);
    assert_eq!(report.last_name_row(), Some(7));
}

#[test]
fn test_match_ignores_case() {
    let (_svc, mut report) = setup(&["login", "Checkout Flow", "refund"]);

    assert_eq!(report.find_test_by_name("CHECKOUT flow", TAB, true), Some(6));
    assert_eq!(report.find_test_by_name("checkout", TAB, true), None);
}

#[test]
fn test_empty_arguments() {
    let (svc, mut report) = setup(&["login"]);

    assert_eq!(report.find_test_by_name("", TAB, true), None);
    assert_eq!(report.find_test_by_name("login", "", true), None);
    assert_eq!(report.update_test_result_by_name("", "PASSED", TAB, true), None);
    assert_eq!(svc.call_count(), 0);
}

#[test]
fn test_existing_result_is_skipped_unless_allowed() {
    let (svc, mut report) = setup(&["login", "checkout", "login"]);
    svc.put(DOC, TAB, "E5", "PASSED").unwrap();

    assert_eq!(report.find_test_by_name("login", TAB, true), Some(5));
    assert_eq!(report.find_test_by_name("login", TAB, false), Some(7));

    svc.put(DOC, TAB, "E7", "FAILED").unwrap();
    assert_eq!(report.find_test_by_name("login", TAB, false), None);
}

#[test]
fn test_scan_crosses_blocks() {
    let names: Vec<String> = (0..25).map(|i| format!("case-{i:02}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let (svc, mut report) = setup(&refs);

    // case-22 sits on row 27, inside the third block (rows 25..=34)
    assert_eq!(report.find_test_by_name("case-22", TAB, true), Some(27));
    assert_eq!(svc.call_count(), 3);
}

#[test]
fn test_scan_stops_after_five_blank_rows() {
    let (_svc, mut report) = setup(&["login", "", "", "", "", "", "late"]);
    assert_eq!(report.find_test_by_name("late", TAB, true), None);
    assert_eq!(report.last_name_row(), Some(5));

    let (_svc, mut report) = setup(&["login", "", "", "", "", "late"]);
    assert_eq!(report.find_test_by_name("late", TAB, true), Some(10));
}

#[test]
fn test_scan_stops_at_empty_block() {
    let names: Vec<String> = (0..10).map(|i| format!("case-{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let (svc, mut report) = setup(&refs);

    assert_eq!(report.find_test_by_name("missing", TAB, true), None);
    assert_eq!(report.last_name_row(), Some(14));
    // One full block, then one empty block
    assert_eq!(svc.call_count(), 2);
}

#[test]
fn test_update_overwrites_found_row() {
    let (svc, mut report) = setup(&["login", "checkout"]);
    svc.put(DOC, TAB, "E6", "FAILED").unwrap();

    assert_eq!(
        report.update_test_result_by_name("Checkout", "PASSED", TAB, true),
        Some(6)
    );
    assert_eq!(text(&svc, "E6"), "PASSED");
    assert_eq!(text(&svc, "C7"), "");
}

#[test]
fn test_update_fills_blank_result() {
    let (svc, mut report) = setup(&["login", "checkout"]);

    assert_eq!(
        report.update_test_result_by_name("login", "PASSED", TAB, false),
        Some(5)
    );
    assert_eq!(text(&svc, "E5"), "PASSED");
}

#[test]
fn test_update_appends_below_last_scanned_row() {
    let (svc, mut report) = setup(&["login", "checkout", "refund"]);

    assert_eq!(
        report.update_test_result_by_name("search", "FAILED", TAB, false),
        Some(8)
    );
    assert_eq!(text(&svc, "C8"), "search");
    assert_eq!(text(&svc, "E8"), "FAILED");

    // The appended row is found on the next run
    assert_eq!(report.find_test_by_name("search", TAB, true), Some(8));
}

#[test]
fn test_update_without_overwrite_appends_duplicate() {
    let (svc, mut report) = setup(&["login", "checkout"]);
    svc.put(DOC, TAB, "E5", "PASSED").unwrap();

    assert_eq!(
        report.update_test_result_by_name("login", "FAILED", TAB, false),
        Some(7)
    );
    assert_eq!(text(&svc, "E5"), "PASSED");
    assert_eq!(text(&svc, "C7"), "login");
    assert_eq!(text(&svc, "E7"), "FAILED");
}

#[test]
fn test_update_on_empty_tab_starts_at_start_row() {
    let (svc, mut report) = setup(&[]);

    assert_eq!(
        report.update_test_result_by_name("login", "PASSED", TAB, true),
        Some(5)
    );
    assert_eq!(text(&svc, "C5"), "login");
    assert_eq!(text(&svc, "E5"), "PASSED");
}

#[test]
fn test_api_failure_looks_like_not_found() {
    let (svc, mut report) = setup(&["login"]);
    svc.set_failing(true);

    assert_eq!(report.find_test_by_name("login", TAB, true), None);
    assert_eq!(report.update_test_result_by_name("login", "PASSED", TAB, true), None);
    assert!(!report.create_new_result_col(TAB));
}

/// Delegates to a [`MemoryService`] but rejects the `fail_on`-th write
/// (1-based); every other call goes through.
struct FailingWrite {
    inner: MemoryService,
    writes: AtomicUsize,
    fail_on: usize,
}

impl SpreadsheetService for FailingWrite {
    fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        render: ValueRenderOption,
    ) -> tally_client::Result<ValueRange> {
        self.inner.get_values(spreadsheet_id, range, render)
    }

    fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        body: ValueRange,
        input: ValueInputOption,
    ) -> tally_client::Result<UpdateValuesResponse> {
        if self.writes.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
            return Err(ClientError::Api {
                status: 503,
                message: "backend unavailable".into(),
            });
        }
        self.inner.update_values(spreadsheet_id, range, body, input)
    }

    fn get_spreadsheet(&self, spreadsheet_id: &str) -> tally_client::Result<Spreadsheet> {
        self.inner.get_spreadsheet(spreadsheet_id)
    }

    fn batch_update(
        &self,
        spreadsheet_id: &str,
        request: BatchUpdateSpreadsheetRequest,
    ) -> tally_client::Result<BatchUpdateSpreadsheetResponse> {
        self.inner.batch_update(spreadsheet_id, request)
    }
}

#[test]
fn test_append_with_failed_result_write_leaves_name_only() {
    let (svc, _) = setup(&["login", "checkout"]);
    let service = FailingWrite {
        inner: svc.clone(),
        writes: AtomicUsize::new(0),
        fail_on: 2,
    };
    let mut report = Report::new(
        Arc::new(Sheet::with_service(DOC, service)),
        ReportLayout::default(),
    );

    // The name lands on row 7, the result write is rejected
    assert_eq!(
        report.update_test_result_by_name("refund", "PASSED", TAB, false),
        None
    );
    assert_eq!(text(&svc, "C7"), "refund");
    assert_eq!(text(&svc, "E7"), "");

    // A retry finds the half-written row and fills in its result
    assert_eq!(
        report.update_test_result_by_name("refund", "PASSED", TAB, false),
        Some(7)
    );
    assert_eq!(text(&svc, "E7"), "PASSED");
}

#[test]
fn test_scan_near_the_last_row_does_not_overflow() {
    let svc = MemoryService::new();
    svc.add_sheet(DOC, TAB);
    let sheet = Arc::new(Sheet::with_service(DOC, svc.clone()));
    let layout = ReportLayout {
        start_row: u32::MAX - 3,
        ..ReportLayout::default()
    };
    let mut report = Report::new(sheet, layout);

    assert_eq!(report.find_test_by_name("login", TAB, true), None);
    assert_eq!(report.last_name_row(), None);
    assert_eq!(svc.call_count(), 0);
    assert_eq!(
        report.update_test_result_by_name("login", "PASSED", TAB, true),
        None
    );
}

#[test]
fn test_unknown_tab() {
    let (_svc, mut report) = setup(&["login"]);

    assert_eq!(report.find_test_by_name("login", "Weekly", true), None);
    assert_eq!(
        report.update_test_result_by_name("login", "PASSED", "Weekly", true),
        None
    );
}

#[test]
fn test_create_new_result_col() {
    let (svc, mut report) = setup(&["login"]);
    svc.put(DOC, TAB, "E4", "20240101-000000").unwrap();
    svc.put(DOC, TAB, "E5", "PASSED").unwrap();

    assert!(report.create_new_result_col(TAB));

    let stamp = Regex::new(r"^\d{8}-\d{6}$").unwrap();
    assert!(stamp.is_match(&text(&svc, "E4")), "header was {:?}", text(&svc, "E4"));
    assert_eq!(text(&svc, "E5"), "");
    assert_eq!(text(&svc, "F4"), "20240101-000000");
    assert_eq!(text(&svc, "F5"), "PASSED");
    // Names stay put
    assert_eq!(text(&svc, "C5"), "login");

    // The fresh column is blank, so the old result no longer blocks the row
    assert_eq!(report.find_test_by_name("login", TAB, false), Some(5));

    assert!(!report.create_new_result_col("Weekly"));
}

#[test]
fn test_overwrite_result_col_header() {
    let (svc, mut report) = setup(&["login"]);
    svc.put(DOC, TAB, "E4", "old").unwrap();

    assert!(report.overwrite_result_col_header("release-2.3", TAB));

    let header = Regex::new(r"^release-2\.3-\d{8}-\d{6}$").unwrap();
    assert!(header.is_match(&text(&svc, "E4")), "header was {:?}", text(&svc, "E4"));
}

#[test]
fn test_custom_layout() {
    let svc = MemoryService::new();
    svc.add_sheet(DOC, "Smoke Tests");
    svc.put(DOC, "Smoke Tests", "A2", "boot").unwrap();
    svc.put(DOC, "Smoke Tests", "A3", "shutdown").unwrap();

    let sheet = Arc::new(Sheet::with_service(DOC, svc.clone()));
    let mut report = Report::new(sheet, ReportLayout::new("A", "B", 2).unwrap());

    assert_eq!(
        report.update_test_result_by_name("SHUTDOWN", "PASSED", "Smoke Tests", true),
        Some(3)
    );
    assert_eq!(svc.get(DOC, "Smoke Tests", "B3").as_text(), "PASSED");

    assert!(report.overwrite_result_col_header("run", "Smoke Tests"));
    assert!(svc.get(DOC, "Smoke Tests", "B1").as_text().starts_with("run-"));
}
