//! Sheet façade behavior against the in-memory service.

use tally_client::{CellValue, MemoryService, Sheet};

const DOC: &str = "1AbCdEfGhIjK";

fn sheet_with(svc: &MemoryService) -> Sheet {
    Sheet::with_service(DOC, svc.clone())
}

#[test]
fn test_read_range_returns_rows() {
    let svc = MemoryService::new();
    svc.add_sheet(DOC, "Results");
    svc.put(DOC, "Results", "C5", "login").unwrap();
    svc.put(DOC, "Results", "C6", "=UPPER(\"x\")").unwrap();

    let sheet = sheet_with(&svc);
    let rows = sheet.read_range("Results", "C", 5, "C", 14);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], CellValue::from("login"));
    // Formulas come back as written
    assert_eq!(rows[1][0].as_str(), Some("=UPPER(\"x\")"));
}

#[test]
fn test_read_range_failures_are_empty() {
    let svc = MemoryService::new();
    svc.add_sheet(DOC, "Results");
    svc.put(DOC, "Results", "C5", "login").unwrap();
    let sheet = sheet_with(&svc);

    // Unknown tab
    assert!(sheet.read_range("Nope", "C", 5, "C", 14).is_empty());
    // Bad column letters never reach the service
    assert!(sheet.read_range("Results", "C1", 5, "C", 14).is_empty());
    // Remote failure
    svc.set_failing(true);
    assert!(sheet.read_range("Results", "C", 5, "C", 14).is_empty());
}

#[test]
fn test_set_value_and_set_values() {
    let svc = MemoryService::new();
    svc.add_sheet(DOC, "Smoke Tests");
    let sheet = sheet_with(&svc);

    assert!(sheet.set_value("PASSED", "'Smoke Tests'!E7:E7"));
    assert_eq!(svc.get(DOC, "Smoke Tests", "E7"), CellValue::from("PASSED"));

    svc.put(DOC, "Smoke Tests", "D8", "flaky").unwrap();
    let rows = vec![
        vec![CellValue::from("checkout"), CellValue::Null, CellValue::from("FAILED")],
        vec![CellValue::from("refund")],
    ];
    assert!(sheet.set_values(rows, "Smoke Tests", "C", 8, "E", 9));
    assert_eq!(svc.get(DOC, "Smoke Tests", "C8"), CellValue::from("checkout"));
    assert_eq!(svc.get(DOC, "Smoke Tests", "E8"), CellValue::from("FAILED"));
    assert_eq!(svc.get(DOC, "Smoke Tests", "C9"), CellValue::from("refund"));
    // A null cell leaves what was there
    assert_eq!(svc.get(DOC, "Smoke Tests", "D8"), CellValue::from("flaky"));

    // An empty string clears it
    assert!(sheet.set_value("", "'Smoke Tests'!D8:D8"));
    assert_eq!(svc.get(DOC, "Smoke Tests", "D8"), CellValue::Null);
}

#[test]
fn test_writes_fail_softly() {
    let svc = MemoryService::new();
    svc.add_sheet(DOC, "Results");
    let sheet = sheet_with(&svc);

    assert!(!sheet.set_value("PASSED", "Missing!E7:E7"));
    assert!(!sheet.set_values(vec![vec!["x".into()]], "", "C", 1, "C", 1));

    svc.set_failing(true);
    assert!(!sheet.set_value("PASSED", "Results!E7:E7"));
}

#[test]
fn test_insert_column_by_tab_title() {
    let svc = MemoryService::new();
    svc.add_sheet(DOC, "Summary");
    svc.add_sheet(DOC, "Nightly");
    svc.put(DOC, "Nightly", "E4", "20240101-000000").unwrap();
    svc.put(DOC, "Summary", "E4", "untouched").unwrap();
    let sheet = sheet_with(&svc);

    // Column index is 0-based: 4 inserts before E
    assert!(sheet.insert_column(4, "NIGHTLY"));
    assert_eq!(svc.get(DOC, "Nightly", "F4"), CellValue::from("20240101-000000"));
    assert_eq!(svc.get(DOC, "Nightly", "E4"), CellValue::Null);
    assert_eq!(svc.get(DOC, "Summary", "E4"), CellValue::from("untouched"));

    assert!(!sheet.insert_column(4, "Weekly"));
}

#[test]
fn test_disconnected_sheet() {
    let sheet = Sheet::disconnected(DOC);
    assert!(!sheet.is_connected());
    assert!(sheet.read_range("Results", "C", 5, "C", 14).is_empty());
    assert!(!sheet.set_value("PASSED", "Results!E5:E5"));
    assert!(!sheet.insert_column(4, "Results"));
}
