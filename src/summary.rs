//! Summary metrics and descriptive statistics.

use foldhash::{HashMap, HashMapExt};

use crate::cell::{Cell, ColumnType};
use crate::columns;
use crate::table::Table;

/// Headline metrics for a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub rows: usize,
    pub columns: usize,
    /// Missing cells across the whole table.
    pub missing: usize,
    pub column_details: Vec<ColumnSummary>,
    /// Highest AÑO, if the column exists and has any number.
    pub latest_year: Option<i64>,
    /// Mean PRECIO, if the column exists and has any number.
    pub average_price: Option<f64>,
}

/// Type and missing count of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSummary {
    pub name: String,
    pub column_type: ColumnType,
    pub missing: usize,
}

/// Compute headline metrics.
pub fn summarize(table: &Table) -> Summary {
    let missing_counts = table.missing_counts();
    let column_details = table
        .headers()
        .iter()
        .zip(table.column_types())
        .zip(&missing_counts)
        .map(|((name, column_type), &missing)| ColumnSummary {
            name: name.clone(),
            column_type,
            missing,
        })
        .collect();

    let latest_year = table
        .column(columns::YEAR)
        .and_then(|cells| numbers(cells).reduce(f64::max))
        .map(|year| year as i64);
    let average_price = table
        .column(columns::PRICE)
        .and_then(|cells| NumericStats::from_cells(cells).mean());

    Summary {
        rows: table.num_rows(),
        columns: table.num_columns(),
        missing: missing_counts.iter().sum(),
        column_details,
        latest_year,
        average_price,
    }
}

fn numbers<'a>(cells: impl Iterator<Item = &'a Cell>) -> impl Iterator<Item = f64> {
    cells.filter_map(Cell::as_number)
}

#[derive(Debug, Clone, Copy, Default)]
struct NumericStats {
    count: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl NumericStats {
    fn from_cells<'a>(cells: impl Iterator<Item = &'a Cell>) -> Self {
        numbers(cells).fold(Self::default(), |mut acc, n| {
            acc.count += 1;
            acc.sum += n;
            acc.min = Some(acc.min.map_or(n, |m| m.min(n)));
            acc.max = Some(acc.max.map_or(n, |m| m.max(n)));
            acc
        })
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Descriptive statistics of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    /// Non-missing cells.
    pub count: usize,
    /// Distinct non-missing values.
    pub unique: usize,
    /// Most frequent value and its frequency.
    pub top: Option<(Cell, usize)>,
    /// Numeric statistics, over the column's number cells only.
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Describe every column.
pub fn describe(table: &Table) -> Vec<ColumnStats> {
    table
        .headers()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells = || table.rows().iter().map(move |row| &row[idx]);
            let counts = count_values(cells());
            let stats = NumericStats::from_cells(cells());
            ColumnStats {
                name: name.clone(),
                count: counts.iter().map(|(_, n)| n).sum(),
                unique: counts.len(),
                top: counts.first().map(|(cell, n)| ((*cell).clone(), *n)),
                mean: stats.mean(),
                min: stats.min,
                max: stats.max,
            }
        })
        .collect()
}

/// Frequency of each non-missing value in a column, most frequent first.
///
/// Ties keep first-seen order. Returns `None` if the column is absent.
pub fn value_counts(table: &Table, column: &str, limit: Option<usize>) -> Option<Vec<(Cell, usize)>> {
    let mut counts = count_values(table.column(column)?);
    if let Some(limit) = limit {
        counts.truncate(limit);
    }
    Some(
        counts
            .into_iter()
            .map(|(cell, n)| (cell.clone(), n))
            .collect(),
    )
}

fn count_values<'a>(cells: impl Iterator<Item = &'a Cell>) -> Vec<(&'a Cell, usize)> {
    let mut index: HashMap<&Cell, usize> = HashMap::new();
    let mut counts: Vec<(&Cell, usize)> = Vec::new();

    for cell in cells.filter(|c| !c.is_missing()) {
        match index.get(cell) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(cell, counts.len());
                counts.push((cell, 1));
            }
        }
    }

    // stable: ties stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
