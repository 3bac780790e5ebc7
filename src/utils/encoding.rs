// Text encoding selectors and the decode fallback chain

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};

/// Text encoding selector carried in the first payload byte of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Latin1 = 0,
    Utf16 = 1,
    Utf16Be = 2,
    Utf8 = 3,
}

impl TextEncoding {
    /// Map a selector byte to an encoding.
    ///
    /// Unknown selectors map to UTF-8 so they take the same fallback
    /// chain as a corrupt UTF-8 payload.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => TextEncoding::Latin1,
            1 => TextEncoding::Utf16,
            2 => TextEncoding::Utf16Be,
            _ => TextEncoding::Utf8,
        }
    }

    /// True for the two UTF-16 selectors, which use double-NUL terminators
    pub fn is_wide(self) -> bool {
        matches!(self, TextEncoding::Utf16 | TextEncoding::Utf16Be)
    }
}

/// Decode bytes with the requested encoding, falling back on failure.
///
/// The chain is: strict decode per the selector, then strict UTF-8, then
/// WINDOWS-1252 which maps every byte and cannot fail. The result is
/// always a valid string; malformed input never propagates an error.
pub fn decode_text(data: &[u8], encoding: TextEncoding) -> String {
    try_decode(data, encoding)
        .or_else(|| decode_strict(data, UTF_8))
        .unwrap_or_else(|| decode_latin1(data))
}

/// Decode as WINDOWS-1252; total over all byte sequences
pub fn decode_latin1(data: &[u8]) -> String {
    WINDOWS_1252.decode(data).0.into_owned()
}

/// Encode text as WINDOWS-1252 bytes (MIME types, frame identifiers)
pub fn encode_latin1(text: &str) -> Vec<u8> {
    WINDOWS_1252.encode(text).0.into_owned()
}

fn try_decode(data: &[u8], encoding: TextEncoding) -> Option<String> {
    match encoding {
        TextEncoding::Latin1 => Some(decode_latin1(data)),
        TextEncoding::Utf16 => {
            // Byte-order mark decides endianness; absent means little-endian
            if data.len() >= 2 && data[0..2] == [0xFF, 0xFE] {
                decode_strict(&data[2..], UTF_16LE)
            } else if data.len() >= 2 && data[0..2] == [0xFE, 0xFF] {
                decode_strict(&data[2..], UTF_16BE)
            } else {
                decode_strict(data, UTF_16LE)
            }
        }
        TextEncoding::Utf16Be => decode_strict(data, UTF_16BE),
        TextEncoding::Utf8 => decode_strict(data, UTF_8),
    }
}

fn decode_strict(data: &[u8], encoding: &'static Encoding) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(data)
        .map(|text| text.into_owned())
}
