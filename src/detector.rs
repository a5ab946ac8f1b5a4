//! Encoding and delimiter detection.
//!
//! The delimiter is whichever of `,` and `;` occurs more often in the first
//! line, with ties going to `;`. Quoted delimiters are counted like any other.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use encoding_rs::{Encoding, WINDOWS_1252};

use crate::encoding::{decode_strict, detect_encoding};
use crate::error::{ExplorerError, Result};
use crate::sample::SampleSize;

/// Field delimiter chosen by detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    Comma,
    Semicolon,
}

impl Delimiter {
    /// Pick the delimiter for a header line.
    ///
    /// Comma only when it strictly outnumbers semicolons.
    pub fn sniff(first_line: &str) -> Self {
        let bytes = first_line.as_bytes();
        let commas = bytecount::count(bytes, b',');
        let semicolons = bytecount::count(bytes, b';');
        if commas > semicolons {
            Delimiter::Comma
        } else {
            Delimiter::Semicolon
        }
    }

    /// The delimiter byte, for `csv::ReaderBuilder`.
    pub const fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
        }
    }

    /// Parse a single-character delimiter.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            ',' => Some(Delimiter::Comma),
            ';' => Some(Delimiter::Semicolon),
            _ => None,
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_byte() as char)
    }
}

/// Outcome of detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    /// Encoding guessed from the bytes (or forced).
    pub primary: &'static Encoding,
    /// Encoding actually used to decode; differs from `primary` after fallback.
    pub encoding: &'static Encoding,
    /// Field delimiter.
    pub delimiter: Delimiter,
}

impl Detection {
    /// Name of the encoding in use.
    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// True when the primary encoding failed and the fallback was used.
    pub fn used_fallback(&self) -> bool {
        self.primary != self.encoding
    }
}

/// Decoded text together with the detection that produced it.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub text: String,
    pub detection: Detection,
}

/// Encoding and delimiter detector.
///
/// # Example
///
/// ```no_run
/// use csv_explorer::{Detector, SampleSize};
///
/// let mut detector = Detector::new();
/// detector.sample_size(SampleSize::Bytes(4096));
///
/// let detection = detector.detect_path("base_productos.csv").unwrap();
/// println!("Encoding: {}", detection.encoding_name());
/// println!("Delimiter: {}", detection.delimiter);
/// ```
#[derive(Debug, Clone)]
pub struct Detector {
    /// Sample size for detection.
    sample_size: SampleSize,
    /// Optional forced primary encoding.
    forced_encoding: Option<&'static Encoding>,
    /// Optional forced delimiter.
    forced_delimiter: Option<Delimiter>,
    /// Single-byte encoding tried when the primary one fails.
    fallback: &'static Encoding,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector {
    /// Create a new Detector with default settings.
    pub fn new() -> Self {
        Self {
            sample_size: SampleSize::default(),
            forced_encoding: None,
            forced_delimiter: None,
            fallback: WINDOWS_1252,
        }
    }

    /// Set the sample size for detection.
    pub fn sample_size(&mut self, sample_size: SampleSize) -> &mut Self {
        self.sample_size = sample_size;
        self
    }

    /// Force a primary encoding (skip encoding detection).
    pub fn encoding(&mut self, encoding: &'static Encoding) -> &mut Self {
        self.forced_encoding = Some(encoding);
        self
    }

    /// Force a specific delimiter (skip delimiter detection).
    pub fn delimiter(&mut self, delimiter: Delimiter) -> &mut Self {
        self.forced_delimiter = Some(delimiter);
        self
    }

    /// Set the fallback encoding.
    pub fn fallback_encoding(&mut self, encoding: &'static Encoding) -> &mut Self {
        self.fallback = encoding;
        self
    }

    /// Detect on the first sampled bytes of a file.
    pub fn detect_path<P: AsRef<Path>>(&self, path: P) -> Result<Detection> {
        let file = File::open(path.as_ref())?;
        self.detect_reader(std::io::BufReader::new(file))
    }

    /// Detect on the first sampled bytes of a reader.
    pub fn detect_reader<R: Read>(&self, reader: R) -> Result<Detection> {
        let mut buffer = Vec::new();
        let complete = match self.sample_size.bytes() {
            Some(n) => {
                // One extra byte tells a short input apart from a truncated one.
                reader.take(n as u64 + 1).read_to_end(&mut buffer)?;
                let complete = buffer.len() <= n;
                buffer.truncate(n);
                complete
            }
            None => {
                let mut reader = reader;
                reader.read_to_end(&mut buffer)?;
                true
            }
        };
        self.detect_sample(&buffer, complete)
    }

    /// Detect on an in-memory buffer, honoring the sample size.
    pub fn detect_bytes(&self, data: &[u8]) -> Result<Detection> {
        let (sample, complete) = self.sample_size.apply(data);
        self.detect_sample(sample, complete)
    }

    fn detect_sample(&self, sample: &[u8], complete: bool) -> Result<Detection> {
        let primary = self
            .forced_encoding
            .unwrap_or_else(|| detect_encoding(sample, complete));

        let (text, encoding) = match decode_strict(sample, primary, complete) {
            Some(text) => (text, primary),
            None => {
                tracing::warn!(
                    encoding = primary.name(),
                    fallback = self.fallback.name(),
                    "sample is not valid in detected encoding, using fallback"
                );
                let text = decode_strict(sample, self.fallback, complete)
                    .ok_or_else(|| self.decode_error(primary))?;
                (text, self.fallback)
            }
        };

        let detection = Detection {
            primary,
            encoding,
            delimiter: self.pick_delimiter(&text),
        };
        tracing::debug!(
            encoding = detection.encoding_name(),
            delimiter = %detection.delimiter,
            fallback = detection.used_fallback(),
            "detected input properties"
        );
        Ok(detection)
    }

    /// Decode a whole buffer with the detected encoding.
    ///
    /// If the full buffer turns out to be malformed, it is decoded with the
    /// fallback encoding and the delimiter is sniffed again from that text.
    pub fn decode(&self, data: &[u8], detection: Detection) -> Result<Decoded> {
        if let Some(text) = decode_strict(data, detection.encoding, true) {
            return Ok(Decoded { text, detection });
        }
        if detection.encoding == self.fallback {
            return Err(self.decode_error(detection.primary));
        }

        tracing::warn!(
            encoding = detection.encoding_name(),
            fallback = self.fallback.name(),
            "input is not valid in detected encoding, using fallback"
        );
        let text = decode_strict(data, self.fallback, true)
            .ok_or_else(|| self.decode_error(detection.primary))?;
        let detection = Detection {
            primary: detection.primary,
            encoding: self.fallback,
            delimiter: self.pick_delimiter(&text),
        };
        Ok(Decoded { text, detection })
    }

    fn pick_delimiter(&self, text: &str) -> Delimiter {
        self.forced_delimiter
            .unwrap_or_else(|| Delimiter::sniff(text.lines().next().unwrap_or("")))
    }

    fn decode_error(&self, primary: &'static Encoding) -> ExplorerError {
        ExplorerError::Decode {
            encoding: primary.name(),
            fallback: self.fallback.name(),
        }
    }
}
