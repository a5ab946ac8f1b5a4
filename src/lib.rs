//! csv-explorer: load, clean and export video game catalog CSV files
//!
//! Files arrive with unknown encodings and either `,` or `;` as delimiter.
//! Loading sniffs both, decodes (falling back to a single-byte encoding when
//! the guess turns out wrong), and parses into a [`Table`]. The cleaning
//! pipeline then deduplicates rows, coerces the numeric columns and
//! normalizes the text columns.
//!
//! # Quick Start
//!
//! ```no_run
//! use csv_explorer::{CleaningRules, Detector, ExportFormat, Filter, Session};
//!
//! let session = Session::open_path(
//!     "base_productos.csv",
//!     &Detector::new(),
//!     &CleaningRules::default(),
//! )
//! .unwrap();
//!
//! println!("Encoding: {}", session.detection().encoding_name());
//! println!("Delimiter: {}", session.detection().delimiter);
//! println!("Games: {}", session.summary().rows);
//!
//! let mut filter = Filter::new();
//! filter.genre("RPG").years(2015.0, 2020.0);
//! let rpgs = session.filter(&filter);
//! println!("RPGs since 2015: {}", rpgs.num_rows());
//!
//! let json = session.export(ExportFormat::Json).unwrap();
//! # let _ = json;
//! ```
//!
//! # Pipeline
//!
//! 1. [`Detector`] guesses the encoding (chardetng) over a byte sample and
//!    picks the delimiter from the first line.
//! 2. [`parse_table`] reads the whole input; malformed rows are padded or
//!    skipped and reported as [`MalformedRow`].
//! 3. [`CleaningRules::clean`] produces a [`CleanTable`].

mod cell;
mod clean;
pub mod columns;
mod detector;
mod encoding;
mod error;
mod export;
mod filter;
mod load;
mod sample;
mod session;
mod summary;
mod table;

pub use cell::{Cell, ColumnType};
pub use clean::{CleanTable, CleaningRules, Transform, clean, dedup_rows};
pub use detector::{Decoded, Delimiter, Detection, Detector};
pub use error::{ExplorerError, Result};
pub use export::{ExportFormat, export, to_csv, to_json, to_xlsx};
pub use filter::{Filter, FilterOptions, distinct_values, filter_options, year_bounds};
pub use load::{Loaded, Upload, load_path, load_upload};
pub use sample::{DEFAULT_SAMPLE_BYTES, SampleSize};
pub use session::{Session, Source};
pub use summary::{ColumnStats, ColumnSummary, Summary, describe, summarize, value_counts};
pub use table::{MalformedRow, ParsedTable, RowAction, Table, parse_table};

// Re-export for advanced usage
pub use encoding::{decode_strict, detect_encoding, encoding_for_label, is_utf8};
pub use encoding_rs::Encoding;
