//! Serializers for CSV, spreadsheet and JSON export.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::cell::Cell;
use crate::error::{ExplorerError, Result};
use crate::table::Table;

/// Base name of exported files.
pub const EXPORT_STEM: &str = "videojuegos_limpio";

/// Export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExportFormat {
    /// UTF-8, comma separated, header row.
    Csv,
    /// Excel workbook with a single sheet.
    Xlsx,
    /// Array of row objects.
    Json,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Json => "json",
        }
    }

    pub const fn mime(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Json => "application/json",
        }
    }

    /// Default download name, e.g. `videojuegos_limpio.csv`.
    pub fn file_name(self) -> String {
        format!("{EXPORT_STEM}.{}", self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serialize a table in the given format.
pub fn export(table: &Table, format: ExportFormat) -> Result<Vec<u8>> {
    let bytes = match format {
        ExportFormat::Csv => to_csv(table)?,
        ExportFormat::Xlsx => to_xlsx(table)?,
        ExportFormat::Json => to_json(table)?,
    };
    tracing::debug!(%format, rows = table.num_rows(), bytes = bytes.len(), "exported table");
    Ok(bytes)
}

/// CSV with a header row and no index column. Missing cells are empty.
pub fn to_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(Cell::to_string))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExplorerError::Io(e.into_error()))
}

/// JSON array with one object per row, keys in column order.
pub fn to_json(table: &Table) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&Records(table))?)
}

struct Records<'a>(&'a Table);

impl Serialize for Records<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let table = self.0;
        let mut seq = serializer.serialize_seq(Some(table.num_rows()))?;
        for row in table.rows() {
            seq.serialize_element(&Record {
                headers: table.headers(),
                cells: row,
            })?;
        }
        seq.end()
    }
}

struct Record<'a> {
    headers: &'a [String],
    cells: &'a [Cell],
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (name, cell) in self.headers.iter().zip(self.cells) {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

#[cfg(feature = "xlsx")]
const MAX_SHEET_ROWS: usize = 1_048_576;
#[cfg(feature = "xlsx")]
const MAX_SHEET_COLUMNS: usize = 16_384;

/// Single-sheet workbook with a header row and no index column.
#[cfg(feature = "xlsx")]
pub fn to_xlsx(table: &Table) -> Result<Vec<u8>> {
    use rust_xlsxwriter::Workbook;

    if table.num_rows() + 1 > MAX_SHEET_ROWS {
        return Err(ExplorerError::TooLarge {
            what: "rows",
            limit: MAX_SHEET_ROWS - 1,
        });
    }
    if table.num_columns() > MAX_SHEET_COLUMNS {
        return Err(ExplorerError::TooLarge {
            what: "columns",
            limit: MAX_SHEET_COLUMNS,
        });
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, name) in table.headers().iter().enumerate() {
        sheet.write_string(0, col as u16, name.as_str())?;
    }
    for (idx, row) in table.rows().iter().enumerate() {
        let r = idx as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let c = col as u16;
            match cell {
                Cell::Text(s) => {
                    sheet.write_string(r, c, s.as_str())?;
                }
                Cell::Number(n) if n.is_finite() => {
                    sheet.write_number(r, c, *n)?;
                }
                // Excel has no infinity
                Cell::Number(_) => {
                    sheet.write_string(r, c, cell.to_string())?;
                }
                Cell::Missing => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(not(feature = "xlsx"))]
pub fn to_xlsx(_table: &Table) -> Result<Vec<u8>> {
    Err(ExplorerError::FeatureDisabled("xlsx"))
}
