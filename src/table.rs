//! Tabular parsing of decoded text.

use std::fmt;

use foldhash::{HashSet, HashSetExt};

use crate::cell::{Cell, ColumnType};
use crate::detector::Delimiter;
use crate::error::{ExplorerError, Result};

/// A table with fixed, named columns.
///
/// Every row has exactly `headers().len()` cells. Rows only get in through
/// [`Table::from_rows`] and [`Table::push_row`], which pad or truncate them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given columns.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Create a table from existing rows, fitting each one to the header width.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut table = Self::new(headers);
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Split into column names and rows.
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Cell>>) {
        (self.headers, self.rows)
    }

    /// Column names, in file order.
    #[inline]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The rows of the table.
    #[inline]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Returns true if the table has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.headers.len()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Iterate the cells of a column, or `None` if the column is absent.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Append a row. Short rows are padded with missing cells and long rows
    /// are truncated, so the column invariant always holds.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), Cell::Missing);
        self.rows.push(row);
    }

    /// Inferred type of every column.
    pub fn column_types(&self) -> Vec<ColumnType> {
        let mut types = vec![ColumnType::Null; self.num_columns()];
        for row in &self.rows {
            for (ty, cell) in types.iter_mut().zip(row) {
                *ty = ty.merge(cell.column_type());
            }
        }
        types
    }

    /// Number of missing cells in every column.
    pub fn missing_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_columns()];
        for row in &self.rows {
            for (count, cell) in counts.iter_mut().zip(row) {
                if cell.is_missing() {
                    *count += 1;
                }
            }
        }
        counts
    }

    /// First `n` rows as a new table.
    pub fn head(&self, n: usize) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: self.rows[..n.min(self.rows.len())].to_vec(),
        }
    }
}

/// What happened to a row whose field count didn't match the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    /// Too few fields; padded with missing cells.
    Padded,
    /// Too many fields or unreadable; dropped.
    Skipped,
}

impl fmt::Display for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowAction::Padded => write!(f, "padded"),
            RowAction::Skipped => write!(f, "skipped"),
        }
    }
}

/// Diagnostic for a malformed row. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
    /// 1-based line number in the input.
    pub line: u64,
    /// Number of header columns.
    pub expected: usize,
    /// Number of fields found on the line.
    pub found: usize,
    pub action: RowAction,
}

impl fmt::Display for MalformedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: expected {} fields, saw {} ({})",
            self.line, self.expected, self.found, self.action
        )
    }
}

/// A parsed table plus the malformed-row diagnostics.
#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub table: Table,
    pub malformed: Vec<MalformedRow>,
}

/// Parse decoded text into a table.
///
/// The first record names the columns. Blank lines are ignored. Rows with
/// extra fields are skipped and short rows are padded, each with a warning.
pub fn parse_table(text: &str, delimiter: Delimiter) -> Result<ParsedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?,
        None => return Err(ExplorerError::EmptyData),
    };

    let mut table = Table::new(normalize_headers(header.iter()));
    let expected = table.num_columns();
    let mut malformed = Vec::new();

    for result in records {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map_or(0, csv::Position::line);
                tracing::warn!(line, error = %e, "skipping unreadable row");
                malformed.push(MalformedRow {
                    line,
                    expected,
                    found: 0,
                    action: RowAction::Skipped,
                });
                continue;
            }
        };

        let found = record.len();
        if found != expected {
            let line = record.position().map_or(0, csv::Position::line);
            let action = if found > expected {
                RowAction::Skipped
            } else {
                RowAction::Padded
            };
            let row = MalformedRow {
                line,
                expected,
                found,
                action,
            };
            tracing::warn!("{row}");
            malformed.push(row);
            if action == RowAction::Skipped {
                continue;
            }
        }

        table.push_row(record.iter().map(Cell::from_field).collect());
    }

    tracing::debug!(
        rows = table.num_rows(),
        columns = expected,
        malformed = malformed.len(),
        "parsed table"
    );
    Ok(ParsedTable { table, malformed })
}

/// Give empty header names a placeholder and make duplicates unique.
fn normalize_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut headers = Vec::new();

    for (i, name) in names.enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {i}")
        } else {
            name.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        headers.push(candidate);
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_parse_simple() {
        let parsed = parse_table("a,b\n1,2\n3,\n", Delimiter::Comma).unwrap();
        assert_eq!(parsed.table.headers(), vec!["a", "b"]);
        assert_eq!(
            parsed.table.rows(),
            vec![vec![text("1"), text("2")], vec![text("3"), Cell::Missing]]
        );
        assert!(parsed.malformed.is_empty());
    }

    #[test]
    fn test_parse_semicolon_with_quotes() {
        let parsed = parse_table("TÍTULO;PRECIO\n\"Foo; Bar\";19,99\n", Delimiter::Semicolon).unwrap();
        assert_eq!(parsed.table.rows(), vec![vec![text("Foo; Bar"), text("19,99")]]);
    }

    #[test]
    fn test_long_rows_are_skipped() {
        let parsed = parse_table("a,b\n1,2,3\n4,5\n", Delimiter::Comma).unwrap();
        assert_eq!(parsed.table.rows(), vec![vec![text("4"), text("5")]]);
        assert_eq!(
            parsed.malformed,
            vec![MalformedRow {
                line: 2,
                expected: 2,
                found: 3,
                action: RowAction::Skipped
            }]
        );
    }

    #[test]
    fn test_short_rows_are_padded() {
        let parsed = parse_table("a,b,c\n1\n", Delimiter::Comma).unwrap();
        assert_eq!(
            parsed.table.rows(),
            vec![vec![text("1"), Cell::Missing, Cell::Missing]]
        );
        assert_eq!(parsed.malformed[0].action, RowAction::Padded);
        assert_eq!(parsed.malformed[0].found, 1);
    }

    #[test]
    fn test_blank_lines_ignored() {
        let parsed = parse_table("a\n\nx\n\n", Delimiter::Comma).unwrap();
        assert_eq!(parsed.table.rows(), vec![vec![text("x")]]);
    }

    #[test]
    fn test_header_only() {
        let parsed = parse_table("a;b\n", Delimiter::Semicolon).unwrap();
        assert_eq!(parsed.table.num_columns(), 2);
        assert!(parsed.table.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            parse_table("", Delimiter::Comma),
            Err(ExplorerError::EmptyData)
        ));
    }

    #[test]
    fn test_header_normalization() {
        let parsed = parse_table("a,,a,a, \n", Delimiter::Comma).unwrap();
        assert_eq!(
            parsed.table.headers(),
            vec!["a", "Unnamed: 1", "a.1", "a.2", " "]
        );
    }

    #[test]
    fn test_rows_always_match_header_width() {
        let headers = vec!["a".to_string(), "AÑO".to_string()];
        let table = Table::from_rows(
            headers.clone(),
            vec![
                vec![text("x")],
                vec![text("y"), Cell::Number(2020.0), text("extra")],
                vec![],
            ],
        );
        assert!(table.rows().iter().all(|row| row.len() == 2));
        assert_eq!(table.rows()[0], vec![text("x"), Cell::Missing]);
        assert_eq!(table.rows()[1], vec![text("y"), Cell::Number(2020.0)]);

        let (headers_out, rows) = table.clone().into_parts();
        assert_eq!(headers_out, headers);
        assert_eq!(Table::from_rows(headers_out, rows), table);

        assert_eq!(table.column("AÑO").unwrap().count(), 3);
        assert!(table.head(10).rows().iter().all(|row| row.len() == 2));
    }

    #[test]
    fn test_column_helpers() {
        let mut table = Table::new(vec!["x".into(), "y".into()]);
        table.push_row(vec![Cell::Number(1.0), Cell::Missing]);
        table.push_row(vec![text("a"), Cell::Missing, text("extra")]);

        assert_eq!(table.rows()[1].len(), 2);
        assert_eq!(table.column_index("y"), Some(1));
        assert!(table.column("z").is_none());
        assert_eq!(table.column("x").unwrap().count(), 2);
        assert_eq!(
            table.column_types(),
            vec![ColumnType::Mixed, ColumnType::Null]
        );
        assert_eq!(table.missing_counts(), vec![0, 2]);
        assert_eq!(table.head(1).num_rows(), 1);
    }
}
