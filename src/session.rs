//! A loaded, cleaned table and the read-only operations on it.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::cell::Cell;
use crate::clean::{CleanTable, CleaningRules};
use crate::detector::{Detection, Detector};
use crate::error::{ExplorerError, Result};
use crate::export::{ExportFormat, export};
use crate::filter::{Filter, FilterOptions, filter_options};
use crate::load::{Loaded, Upload, load_path, load_upload};
use crate::summary::{ColumnStats, Summary, describe, summarize, value_counts};
use crate::table::{MalformedRow, Table};

/// Where the session's data came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Upload(String),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Upload(name) => write!(f, "upload {name}"),
        }
    }
}

/// One load of one file, cleaned and held in memory.
///
/// The clean table is never mutated; filters produce derived copies.
#[derive(Debug, Clone)]
pub struct Session {
    source: Source,
    detection: Detection,
    malformed: Vec<MalformedRow>,
    table: CleanTable,
}

impl Session {
    /// Load and clean a local file. Every failure is reported as
    /// [`ExplorerError::Load`] naming the path.
    pub fn open_path<P: AsRef<Path>>(
        path: P,
        detector: &Detector,
        rules: &CleaningRules,
    ) -> Result<Self> {
        let path = path.as_ref();
        let loaded = load_path(path, detector).map_err(|e| ExplorerError::Load {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        Ok(Self::from_loaded(Source::Path(path.to_path_buf()), loaded, rules))
    }

    /// Load and clean an uploaded buffer.
    pub fn open_upload(upload: &Upload, detector: &Detector, rules: &CleaningRules) -> Result<Self> {
        let loaded = load_upload(upload, detector)?;
        Ok(Self::from_loaded(
            Source::Upload(upload.name.clone()),
            loaded,
            rules,
        ))
    }

    pub fn from_loaded(source: Source, loaded: Loaded, rules: &CleaningRules) -> Self {
        let table = rules.clean(loaded.table);
        tracing::info!(
            %source,
            encoding = loaded.detection.encoding_name(),
            delimiter = %loaded.detection.delimiter,
            rows = table.num_rows(),
            columns = table.num_columns(),
            "loaded table"
        );
        Self {
            source,
            detection: loaded.detection,
            malformed: loaded.malformed,
            table,
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn detection(&self) -> &Detection {
        &self.detection
    }

    /// Rows that were padded or skipped during parsing.
    pub fn malformed(&self) -> &[MalformedRow] {
        &self.malformed
    }

    pub fn table(&self) -> &CleanTable {
        &self.table
    }

    pub fn summary(&self) -> Summary {
        summarize(&self.table)
    }

    pub fn describe(&self) -> Vec<ColumnStats> {
        describe(&self.table)
    }

    pub fn filter(&self, filter: &Filter) -> Table {
        filter.apply(&self.table)
    }

    pub fn filter_options(&self) -> FilterOptions {
        filter_options(&self.table)
    }

    /// Value frequencies for a chart, or `None` if the column is absent.
    pub fn value_counts(&self, column: &str, limit: Option<usize>) -> Option<Vec<(Cell, usize)>> {
        value_counts(&self.table, column, limit)
    }

    /// Export the whole clean table.
    pub fn export(&self, format: ExportFormat) -> Result<Vec<u8>> {
        export(&self.table, format)
    }
}
