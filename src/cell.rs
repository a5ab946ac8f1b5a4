use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

/// Largest magnitude written as an integer without a fractional part.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A single table value.
#[derive(Debug, Clone, Default)]
pub enum Cell {
    /// Raw or normalized text.
    Text(String),
    /// Finite or infinite number. Never NaN.
    Number(f64),
    /// Empty field or failed coercion.
    #[default]
    Missing,
}

impl Cell {
    /// Build a cell from a raw field; empty fields are missing.
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            Cell::Missing
        } else {
            Cell::Text(field.to_string())
        }
    }

    /// Build a number cell, mapping NaN to missing.
    pub fn number(value: f64) -> Self {
        if value.is_nan() {
            Cell::Missing
        } else {
            Cell::Number(value)
        }
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Best-effort numeric coercion. Anything that doesn't parse is missing.
    ///
    /// Surrounding whitespace is ignored; a decimal comma is not a number.
    pub fn to_number(&self) -> Cell {
        match self {
            Cell::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_or(Cell::Missing, Cell::number),
            Cell::Number(n) => Cell::Number(*n),
            Cell::Missing => Cell::Missing,
        }
    }

    /// Trim and uppercase text. Other cells pass through.
    pub fn to_normalized_text(&self) -> Cell {
        match self {
            Cell::Text(s) => Cell::Text(s.trim().to_uppercase()),
            other => other.clone(),
        }
    }

    /// Type of this cell for column type inference.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Cell::Text(_) => ColumnType::Text,
            Cell::Number(_) => ColumnType::Number,
            Cell::Missing => ColumnType::Null,
        }
    }
}

/// Integral numbers print without a fractional part, so `2019` stays `2019`.
/// Negative zero is excluded so it prints as `-0` and keeps its sign.
pub(crate) fn is_integral(n: f64) -> bool {
    n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER && !(n == 0.0 && n.is_sign_negative())
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) if is_integral(*n) => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Missing => Ok(()),
        }
    }
}

// Numbers compare by bit pattern so equal cells hash equally.
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Number(a), Cell::Number(b)) => a.to_bits() == b.to_bits(),
            (Cell::Missing, Cell::Missing) => true,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Text(s) => s.hash(state),
            Cell::Number(n) => n.to_bits().hash(state),
            Cell::Missing => {}
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Number(n) if is_integral(*n) => serializer.serialize_i64(*n as i64),
            Cell::Number(n) => serializer.serialize_f64(*n),
            Cell::Missing => serializer.serialize_none(),
        }
    }
}

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColumnType {
    /// Every cell is missing.
    #[default]
    Null,
    Number,
    Text,
    /// Both numbers and text.
    Mixed,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Null => write!(f, "Null"),
            ColumnType::Number => write!(f, "Number"),
            ColumnType::Text => write!(f, "Text"),
            ColumnType::Mixed => write!(f, "Mixed"),
        }
    }
}

impl ColumnType {
    /// Merge two types, returning the most general type that can represent both.
    pub fn merge(self, other: ColumnType) -> ColumnType {
        match (self, other) {
            (a, b) if a == b => a,
            (ColumnType::Null, t) | (t, ColumnType::Null) => t,
            _ => ColumnType::Mixed,
        }
    }
}
