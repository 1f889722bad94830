//! Prelude module - common imports for tally users
//!
//! ```rust
//! use tally::prelude::*;
//! ```

pub use crate::{
    // Addressing
    column_to_letters,
    letters_to_column,
    CellAddress,
    CellValue,
    // Sessions
    CredentialsConfig,
    MemoryService,
    Registry,
    // Reports
    Report,
    ReportError,
    ReportLayout,
    Rows,
    Sheet,
    SheetRange,
    SpreadsheetService,
};
