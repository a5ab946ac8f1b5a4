//! Loading raw bytes into a table: detect, decode, parse.

use std::fs;
use std::path::Path;

use crate::detector::{Detection, Detector};
use crate::error::{ExplorerError, Result};
use crate::sample::SampleSize;
use crate::table::{MalformedRow, Table, parse_table};

/// An uploaded file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Client-supplied file name.
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Uploads are accepted by extension only; the content type isn't checked.
    pub fn validate(&self) -> Result<()> {
        let is_csv = Path::new(&self.name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            Ok(())
        } else {
            Err(ExplorerError::UnsupportedUpload(self.name.clone()))
        }
    }
}

/// A parsed, not yet cleaned, table with its load diagnostics.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub table: Table,
    pub detection: Detection,
    pub malformed: Vec<MalformedRow>,
}

/// Load a file from disk.
///
/// Detection only looks at the detector's sample of the file; the whole file
/// is then decoded and parsed.
pub fn load_path<P: AsRef<Path>>(path: P, detector: &Detector) -> Result<Loaded> {
    let path = path.as_ref();
    let detection = detector.detect_path(path)?;
    let bytes = fs::read(path)?;
    load_decoded(&bytes, detection, detector)
}

/// Load an uploaded buffer. Detection always sees the whole buffer.
pub fn load_upload(upload: &Upload, detector: &Detector) -> Result<Loaded> {
    upload.validate()?;

    let mut detector = detector.clone();
    detector.sample_size(SampleSize::All);
    let detection = detector.detect_bytes(&upload.bytes)?;
    load_decoded(&upload.bytes, detection, &detector)
}

fn load_decoded(bytes: &[u8], detection: Detection, detector: &Detector) -> Result<Loaded> {
    let decoded = detector.decode(bytes, detection)?;
    let parsed = parse_table(&decoded.text, decoded.detection.delimiter)?;
    Ok(Loaded {
        table: parsed.table,
        detection: decoded.detection,
        malformed: parsed.malformed,
    })
}
