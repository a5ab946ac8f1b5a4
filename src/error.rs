use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for loading, cleaning and exporting tables.
#[derive(Error, Debug)]
pub enum ExplorerError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV reading or writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Spreadsheet writer error.
    #[cfg(feature = "xlsx")]
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// The bytes could not be decoded with the detected encoding nor the fallback.
    #[error("could not decode input as {encoding} nor as fallback {fallback}")]
    Decode {
        encoding: &'static str,
        fallback: &'static str,
    },

    /// Empty input or no header line.
    #[error("Empty file or no header to parse")]
    EmptyData,

    /// Loading a local file failed.
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: Box<ExplorerError>,
    },

    /// Uploads must carry a `.csv` extension.
    #[error("unsupported upload {0:?}: expected a .csv file")]
    UnsupportedUpload(String),

    /// The crate was built without the feature this operation needs.
    #[error("{0} support is not enabled in this build")]
    FeatureDisabled(&'static str),

    /// The table does not fit in the output format.
    #[error("too many {what} for export (limit {limit})")]
    TooLarge { what: &'static str, limit: usize },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for explorer operations.
pub type Result<T> = std::result::Result<T, ExplorerError>;
