//! Column names of the video game catalog.
//!
//! Matching is exact: uppercase, accents included.

pub const TITLE: &str = "TÍTULO";
pub const GENRE: &str = "GÉNERO";
pub const PLATFORM: &str = "PLATAFORMA";
pub const DEVELOPER: &str = "DESARROLLADOR";

pub const YEAR: &str = "AÑO";
pub const PRICE: &str = "PRECIO";
pub const AVERAGE: &str = "MEDIA";
pub const SCORE: &str = "PUNTUACIÓN";

/// Columns coerced to numbers.
pub const NUMERIC: [&str; 4] = [YEAR, PRICE, AVERAGE, SCORE];

/// Columns trimmed and uppercased.
pub const TEXT: [&str; 4] = [TITLE, GENRE, PLATFORM, DEVELOPER];
