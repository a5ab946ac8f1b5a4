//! Row filters over the catalog's genre, platform and year columns.

use std::collections::BTreeSet;

use crate::cell::Cell;
use crate::columns;
use crate::table::Table;

/// Filter criteria. A criterion on an absent column is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    /// Exact GÉNERO value.
    pub genre: Option<String>,
    /// Exact PLATAFORMA value.
    pub platform: Option<String>,
    /// Inclusive AÑO range. Defaults to the table's own bounds.
    pub years: Option<(f64, f64)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn genre(&mut self, genre: impl Into<String>) -> &mut Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn platform(&mut self, platform: impl Into<String>) -> &mut Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn years(&mut self, min: f64, max: f64) -> &mut Self {
        self.years = Some((min, max));
        self
    }

    /// Rows matching every criterion, as a new table.
    ///
    /// When the table has an AÑO column, rows without a year never match,
    /// even if no range was given.
    pub fn apply(&self, table: &Table) -> Table {
        let genre = self
            .genre
            .as_deref()
            .and_then(|g| Some((table.column_index(columns::GENRE)?, g)));
        let platform = self
            .platform
            .as_deref()
            .and_then(|p| Some((table.column_index(columns::PLATFORM)?, p)));
        let years = table.column_index(columns::YEAR).map(|idx| {
            let range = self
                .years
                .or_else(|| raw_year_bounds(table))
                .unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
            (idx, range)
        });

        let rows = table
            .rows()
            .iter()
            .filter(|row| {
                genre.is_none_or(|(idx, g)| row[idx].as_text() == Some(g))
                    && platform.is_none_or(|(idx, p)| row[idx].as_text() == Some(p))
                    && years.is_none_or(|(idx, (lo, hi))| {
                        row[idx].as_number().is_some_and(|y| lo <= y && y <= hi)
                    })
            })
            .cloned()
            .collect();

        Table::from_rows(table.headers().to_vec(), rows)
    }
}

/// Choices offered for each filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Sorted distinct genres; empty if the column is absent.
    pub genres: Vec<String>,
    /// Sorted distinct platforms; empty if the column is absent.
    pub platforms: Vec<String>,
    /// Lowest and highest year.
    pub years: Option<(i64, i64)>,
}

/// Collect the filter choices of a table.
pub fn filter_options(table: &Table) -> FilterOptions {
    FilterOptions {
        genres: distinct_values(table, columns::GENRE),
        platforms: distinct_values(table, columns::PLATFORM),
        years: year_bounds(table),
    }
}

/// Sorted distinct non-missing values of a column, as text.
pub fn distinct_values(table: &Table, column: &str) -> Vec<String> {
    table
        .column(column)
        .map(|cells| {
            cells
                .filter(|c| !c.is_missing())
                .map(Cell::to_string)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        })
        .unwrap_or_default()
}

/// Lowest and highest AÑO, truncated to whole years.
pub fn year_bounds(table: &Table) -> Option<(i64, i64)> {
    raw_year_bounds(table).map(|(lo, hi)| (lo as i64, hi as i64))
}

fn raw_year_bounds(table: &Table) -> Option<(f64, f64)> {
    let mut years = table.column(columns::YEAR)?.filter_map(Cell::as_number);
    let first = years.next()?;
    Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
}
