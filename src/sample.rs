/// Number of bytes sampled from a file on disk before detection.
pub const DEFAULT_SAMPLE_BYTES: usize = 10_000;

/// Sample size configuration for detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSize {
    /// Sample a specific number of bytes.
    Bytes(usize),
    /// Use the entire buffer.
    ///
    /// This is what uploads use, since the whole buffer is already in memory.
    All,
}

impl Default for SampleSize {
    fn default() -> Self {
        SampleSize::Bytes(DEFAULT_SAMPLE_BYTES)
    }
}

impl SampleSize {
    /// Returns the number of bytes to sample, or None for All.
    pub fn bytes(&self) -> Option<usize> {
        match self {
            SampleSize::Bytes(n) => Some(*n),
            SampleSize::All => None,
        }
    }

    /// Slice `data` down to this sample size.
    ///
    /// The flag is true when the returned slice is the whole input.
    pub fn apply<'a>(&self, data: &'a [u8]) -> (&'a [u8], bool) {
        match self.bytes() {
            Some(n) if n < data.len() => (&data[..n], false),
            _ => (data, true),
        }
    }
}
