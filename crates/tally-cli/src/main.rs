//! Tally CLI - record test results in a Google Sheets report

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tally::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tally")]
#[command(
    author,
    version,
    about = "Record automated-test results in a Google Sheets spreadsheet"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Spreadsheet identifier (the long token in the spreadsheet URL)
    #[arg(short, long, env = "TALLY_SPREADSHEET_ID", global = true)]
    spreadsheet: Option<String>,

    /// Directory holding the credential file
    #[arg(long, env = "TALLY_CREDENTIALS_DIR", global = true)]
    credentials_dir: Option<String>,

    /// Credential file name inside the credentials directory
    #[arg(long, env = "TALLY_CREDENTIALS_FILE", global = true)]
    credentials_file: Option<String>,

    /// Column holding test names
    #[arg(long, default_value = "C", global = true)]
    name_column: String,

    /// Column holding results
    #[arg(long, default_value = "E", global = true)]
    result_column: String,

    /// First row holding a test name
    #[arg(long, default_value = "5", global = true)]
    start_row: u32,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the row of a test, or -1 when it is not found
    Find {
        /// Report tab name
        sheet: String,

        /// Test name (matched case-insensitively)
        test: String,

        /// Only match rows whose result cell is blank
        #[arg(long)]
        blank_only: bool,
    },

    /// Record a result for a test, appending a row when needed
    Update {
        /// Report tab name
        sheet: String,

        /// Test name
        test: String,

        /// Result text (e.g. PASSED)
        result: String,

        /// Overwrite an existing result instead of appending a new row
        #[arg(short, long)]
        overwrite: bool,
    },

    /// Insert a timestamped result column
    #[command(name = "new-column")]
    NewColumn {
        /// Report tab name
        sheet: String,
    },

    /// Rewrite the result column header as TITLE-timestamp
    Header {
        /// Report tab name
        sheet: String,

        /// Header title
        title: String,
    },

    /// Print a range as tab-separated values
    Read {
        /// Tab name
        sheet: String,

        /// Top-left cell (e.g. A1)
        start: String,

        /// Bottom-right cell (e.g. D20)
        end: String,
    },

    /// Write one value into a range (e.g. 'Nightly!B2')
    Write {
        /// Target range in A1 notation
        range: String,

        /// Value to write
        value: String,
    },

    /// Insert an empty column before a 0-based column index
    #[command(name = "insert-column")]
    InsertColumn {
        /// Tab name
        sheet: String,

        /// 0-based column index (0 = A)
        index: u32,
    },

    /// Convert between column letters and 1-based column numbers
    Column {
        /// Letters (e.g. AA) or a number (e.g. 27)
        value: String,
    },
}

fn main() -> Result<()> {
    let Cli { global, command } = Cli::parse();
    init_tracing(global.verbose);

    match command {
        Commands::Column { value } => convert_column(&value),
        command => run(command, &global),
    }
}

fn run(command: Commands, args: &GlobalArgs) -> Result<()> {
    let id = args
        .spreadsheet
        .as_deref()
        .context("No spreadsheet given (use --spreadsheet or TALLY_SPREADSHEET_ID)")?;
    let mut registry = build_registry(args)?;

    match command {
        Commands::Find {
            sheet,
            test,
            blank_only,
        } => print_row(registry.find_test_by_name(&test, &sheet, id, !blank_only)),
        Commands::Update {
            sheet,
            test,
            result,
            overwrite,
        } => print_row(registry.update_test_result_by_name(&test, &result, &sheet, id, overwrite)),
        Commands::NewColumn { sheet } => {
            if !registry.create_new_result_col(&sheet, id) {
                bail!("Failed to insert a result column on '{}'", sheet);
            }
        }
        Commands::Header { sheet, title } => {
            if !registry.overwrite_result_col_header(&title, &sheet, id) {
                bail!("Failed to write the result header on '{}'", sheet);
            }
        }
        Commands::Read { sheet, start, end } => read(&mut registry, id, &sheet, &start, &end)?,
        Commands::Write { range, value } => {
            if !registry.set_value(value, &range, id) {
                bail!("Failed to write '{}'", range);
            }
        }
        Commands::InsertColumn { sheet, index } => {
            if !registry.insert_column(index, &sheet, id) {
                bail!("Failed to insert a column on '{}'", sheet);
            }
        }
        Commands::Column { value } => convert_column(&value)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "tally=debug" } else { "tally=info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .init();
}

fn build_registry(args: &GlobalArgs) -> Result<Registry> {
    let mut registry = Registry::new();
    registry.set_credential_dir(
        args.credentials_dir.as_deref().unwrap_or_default(),
        args.credentials_file.as_deref().unwrap_or_default(),
    );
    tracing::debug!(
        "Credentials: {}",
        registry.credentials().credentials_path().display()
    );

    let layout = ReportLayout::new(&args.name_column, &args.result_column, args.start_row)
        .context("Invalid report layout")?;
    registry.set_layout(layout);

    Ok(registry)
}

/// Not found prints -1 so scripts can test the output.
fn print_row(row: Option<u32>) {
    match row {
        Some(row) => println!("{}", row),
        None => println!("-1"),
    }
}

fn read(registry: &mut Registry, id: &str, sheet: &str, start: &str, end: &str) -> Result<()> {
    let start = CellAddress::parse(start).with_context(|| format!("Bad cell '{}'", start))?;
    let end = CellAddress::parse(end).with_context(|| format!("Bad cell '{}'", end))?;

    let rows = registry.read_range(
        sheet,
        &start.column_letters(),
        start.row,
        &end.column_letters(),
        end.row,
        id,
    );
    for row in rows {
        let line: Vec<String> = row.iter().map(CellValue::as_text).collect();
        println!("{}", line.join("\t"));
    }

    Ok(())
}

fn convert_column(value: &str) -> Result<()> {
    let text = match value.parse::<u32>() {
        Ok(index) => column_to_letters(index)
            .with_context(|| format!("Column {} is out of range", index))?,
        Err(_) => letters_to_column(value)
            .with_context(|| format!("Invalid column letters '{}'", value))?
            .to_string(),
    };
    println!("{}", text);
    Ok(())
}
