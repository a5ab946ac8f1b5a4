//! Cleaning pipeline: deduplicate, coerce numbers, normalize text.
//!
//! Deduplication runs on the raw cells, before any transform. Two rows that
//! only differ in case or spacing of a text column both survive.

use std::ops::Deref;

use foldhash::{HashSet, HashSetExt};

use crate::cell::Cell;
use crate::columns;
use crate::table::Table;

/// Per-column cleaning transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Coerce to a number, missing on failure.
    Numeric,
    /// Trim surrounding whitespace and uppercase.
    Text,
}

impl Transform {
    pub fn apply(self, cell: &Cell) -> Cell {
        match self {
            Transform::Numeric => cell.to_number(),
            Transform::Text => cell.to_normalized_text(),
        }
    }
}

/// Declarative column → transform mapping.
///
/// Rules for columns the table doesn't have are ignored; columns without a
/// rule pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleaningRules {
    rules: Vec<(String, Transform)>,
}

impl Default for CleaningRules {
    /// The catalog's numeric and text columns.
    fn default() -> Self {
        let mut rules = Self::empty();
        for name in columns::NUMERIC {
            rules.rule(name, Transform::Numeric);
        }
        for name in columns::TEXT {
            rules.rule(name, Transform::Text);
        }
        rules
    }
}

impl CleaningRules {
    /// Rules that only deduplicate.
    pub const fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Set the transform for a column, replacing any previous rule for it.
    pub fn rule(&mut self, column: impl Into<String>, transform: Transform) -> &mut Self {
        let column = column.into();
        match self.rules.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = transform,
            None => self.rules.push((column, transform)),
        }
        self
    }

    /// Transform configured for a column.
    pub fn transform_for(&self, column: &str) -> Option<Transform> {
        self.rules
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, t)| *t)
    }

    /// Run the pipeline over a table.
    pub fn clean(&self, table: Table) -> CleanTable {
        let (headers, mut rows) = table.into_parts();
        let before = rows.len();
        dedup_rows(&mut rows);

        let targets: Vec<(usize, Transform)> = headers
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| self.transform_for(name).map(|t| (idx, t)))
            .collect();

        for row in &mut rows {
            for &(idx, transform) in &targets {
                if let Some(cell) = row.get_mut(idx) {
                    *cell = transform.apply(cell);
                }
            }
        }

        let table = Table::from_rows(headers, rows);
        tracing::debug!(
            rows_in = before,
            rows_out = table.num_rows(),
            transformed_columns = targets.len(),
            "cleaned table"
        );
        CleanTable(table)
    }
}

/// Clean a table with the default catalog rules.
pub fn clean(table: Table) -> CleanTable {
    CleaningRules::default().clean(table)
}

/// Drop rows identical to an earlier row, keeping the first occurrence.
pub fn dedup_rows(rows: &mut Vec<Vec<Cell>>) {
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(rows.len());
        rows.iter().map(|row| seen.insert(row)).collect()
    };
    let mut keep = keep.into_iter();
    rows.retain(|_| keep.next().unwrap_or(false));
}

/// A table that has been through the cleaning pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanTable(Table);

impl CleanTable {
    pub fn into_table(self) -> Table {
        self.0
    }
}

impl Deref for CleanTable {
    type Target = Table;

    fn deref(&self) -> &Table {
        &self.0
    }
}
