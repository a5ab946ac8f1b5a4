//! Encoding detection and decoding using chardetng and `encoding_rs`.

use chardetng::EncodingDetector;
use encoding_rs::{DecoderResult, Encoding, UTF_8};
use simdutf8::compat::from_utf8;

/// Check if the given bytes are valid UTF-8.
///
/// When `complete` is false the data is a truncated sample, so a multi-byte
/// sequence cut off at the very end still counts as valid.
pub fn is_utf8(data: &[u8], complete: bool) -> bool {
    match from_utf8(data) {
        Ok(_) => true,
        Err(e) => !complete && e.error_len().is_none(),
    }
}

/// Guess the encoding of the data.
///
/// A byte order mark wins outright (chardetng doesn't handle UTF-16 BOMs).
/// Valid UTF-8 is reported as UTF-8; everything else goes to chardetng, which
/// always produces a best guess. Empty input is UTF-8.
pub fn detect_encoding(data: &[u8], complete: bool) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(data) {
        return encoding;
    }

    if is_utf8(data, complete) {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(data, complete);
    detector.guess(None, true)
}

/// Decode bytes without replacement characters.
///
/// Returns `None` when the bytes are malformed for `encoding`. A leading BOM
/// for the same encoding is stripped. With `complete` false, an incomplete
/// sequence at the end of the buffer is dropped instead of being malformed.
pub fn decode_strict(data: &[u8], encoding: &'static Encoding, complete: bool) -> Option<String> {
    let mut decoder = encoding.new_decoder_with_bom_removal();
    let capacity = decoder.max_utf8_buffer_length_without_replacement(data.len())?;
    let mut text = String::with_capacity(capacity);

    let (result, _) = decoder.decode_to_string_without_replacement(data, &mut text, complete);
    match result {
        DecoderResult::InputEmpty => Some(text),
        DecoderResult::Malformed(_, _) | DecoderResult::OutputFull => None,
    }
}

/// Look up an encoding by its WHATWG label (e.g. `utf-8`, `latin1`, `cp1252`).
pub fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}
