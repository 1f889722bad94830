//! Column letters, cell addresses and sheet-qualified ranges

use crate::error::{Error, Result};
use crate::MAX_COLS;
use std::fmt;
use std::str::FromStr;

/// Convert a 1-based column index to letters (1 = A, 26 = Z, 27 = AA, etc.)
///
/// # Examples
/// ```
/// use tally_core::column_to_letters;
///
/// assert_eq!(column_to_letters(1).unwrap(), "A");
/// assert_eq!(column_to_letters(28).unwrap(), "AB");
/// assert!(column_to_letters(0).is_err());
/// ```
pub fn column_to_letters(col: u32) -> Result<String> {
    if col == 0 || col > MAX_COLS {
        return Err(Error::ColumnOutOfBounds(col, MAX_COLS));
    }
    Ok(letters(col))
}

/// Convert column letters to a 1-based index (A = 1, Z = 26, AA = 27, etc.)
///
/// Letters are case-insensitive.
pub fn letters_to_column(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidAddress("empty column letters".into()));
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidAddress(format!(
                "invalid column letter '{}'",
                c
            )));
        }
        col = col
            .saturating_mul(26)
            .saturating_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }

    if col > MAX_COLS {
        return Err(Error::ColumnOutOfBounds(col, MAX_COLS));
    }

    Ok(col)
}

fn letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = col;

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// A single cell address such as `C5`.
///
/// Both the column and the row are 1-based, matching what a spreadsheet UI shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    /// Column index (1-based, A=1)
    pub col: u32,
    /// Row number (1-based)
    pub row: u32,
}

impl CellAddress {
    /// Create an address, validating both coordinates
    pub fn new(col: u32, row: u32) -> Result<Self> {
        if col == 0 || col > MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS));
        }
        if row == 0 {
            return Err(Error::RowOutOfBounds(row));
        }
        Ok(Self { col, row })
    }

    /// Create an address from column letters and a row number
    pub fn from_letters(col: &str, row: u32) -> Result<Self> {
        Self::new(letters_to_column(col)?, row)
    }

    /// Parse an A1-style address. `$` markers are accepted and ignored.
    ///
    /// # Examples
    /// ```
    /// use tally_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("C5").unwrap();
    /// assert_eq!((addr.col, addr.row), (3, 5));
    ///
    /// let addr = CellAddress::parse("$AA$10").unwrap();
    /// assert_eq!((addr.col, addr.row), (27, 10));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let body = s.strip_prefix('$').unwrap_or(s);
        let split = body
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(body.len());
        let (col_str, rest) = body.split_at(split);

        if col_str.is_empty() {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }
        let col = letters_to_column(col_str)?;

        let row_str = rest.strip_prefix('$').unwrap_or(rest);
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        Ok(Self { col, row })
    }

    /// The column letters of this address
    pub fn column_letters(&self) -> String {
        letters(self.col)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", letters(self.col), self.row)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangular range, optionally qualified by a sheet (tab) name.
///
/// Formats as `Results!C5:C14`, quoting the sheet name when it needs it
/// (`'Smoke Tests'!E7`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetRange {
    /// Tab name, if the range is qualified
    pub sheet: Option<String>,
    /// Top-left corner
    pub start: CellAddress,
    /// Bottom-right corner
    pub end: CellAddress,
}

impl SheetRange {
    /// Create a range, normalizing so `start` is top-left and `end` is bottom-right
    pub fn new(sheet: Option<String>, start: CellAddress, end: CellAddress) -> Self {
        Self {
            sheet,
            start: CellAddress {
                col: start.col.min(end.col),
                row: start.row.min(end.row),
            },
            end: CellAddress {
                col: start.col.max(end.col),
                row: start.row.max(end.row),
            },
        }
    }

    /// Build `sheet!{start_col}{start_row}:{end_col}{end_row}`
    pub fn from_bounds(
        sheet: &str,
        start_col: &str,
        start_row: u32,
        end_col: &str,
        end_row: u32,
    ) -> Result<Self> {
        let sheet = validate_sheet_name(sheet)?;
        let start = CellAddress::from_letters(start_col, start_row)?;
        let end = CellAddress::from_letters(end_col, end_row)?;
        Ok(Self::new(Some(sheet), start, end))
    }

    /// A single-cell range on a sheet
    pub fn cell(sheet: &str, col: &str, row: u32) -> Result<Self> {
        Self::from_bounds(sheet, col, row, col, row)
    }

    /// Parse `A1`, `A1:B10`, `Sheet1!A1:B10` or `'My Tab'!A1`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (sheet, refs) = split_sheet(s)?;

        let (start, end) = match refs.split_once(':') {
            Some((a, b)) => (CellAddress::parse(a)?, CellAddress::parse(b)?),
            None => {
                let addr = CellAddress::parse(refs)?;
                (addr, addr)
            }
        };

        Ok(Self::new(sheet, start, end))
    }

    /// Whether the range covers exactly one cell
    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    /// Number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of columns in the range
    pub fn col_count(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// Check if a cell is within this range (sheet name is not compared)
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    /// Format in A1 notation, always spelling out both corners
    pub fn to_a1_string(&self) -> String {
        let refs = format!("{}:{}", self.start, self.end);
        match &self.sheet {
            Some(name) => format!("{}!{}", quote_sheet_name(name), refs),
            None => refs,
        }
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for SheetRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Quote a sheet name for use in A1 notation if it needs quoting.
///
/// Names made only of ASCII letters, digits and `_` that don't start with a
/// digit and don't look like a cell reference are left bare.
pub fn quote_sheet_name(name: &str) -> String {
    let plain = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && CellAddress::parse(name).is_err();

    if plain {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

fn validate_sheet_name(name: &str) -> Result<String> {
    if name.trim().is_empty() {
        return Err(Error::InvalidSheetName("empty sheet name".into()));
    }
    Ok(name.to_string())
}

fn split_sheet(s: &str) -> Result<(Option<String>, &str)> {
    if let Some(rest) = s.strip_prefix('\'') {
        let mut name = String::new();
        let mut chars = rest.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            if c != '\'' {
                name.push(c);
                continue;
            }
            // '' is an escaped quote inside the name
            if let Some((_, '\'')) = chars.peek() {
                chars.next();
                name.push('\'');
                continue;
            }
            return match rest[i + 1..].strip_prefix('!') {
                Some(refs) => Ok((Some(validate_sheet_name(&name)?), refs)),
                None => Err(Error::InvalidRange(format!(
                    "expected '!' after sheet name in '{}'",
                    s
                ))),
            };
        }

        Err(Error::InvalidRange(format!("unterminated sheet name in '{}'", s)))
    } else if let Some((name, refs)) = s.split_once('!') {
        Ok((Some(validate_sheet_name(name)?), refs))
    } else {
        Ok((None, s))
    }
}
