// thytom-core/src/domain/charset.rs

use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;
use std::fmt;

const UTF_8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A character encoding usable for line-oriented text files.
///
/// Only ASCII-compatible encodings are accepted: lines are split on `\n` and
/// fields on delimiter characters before decoding.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Charset(&'static Encoding);

impl Charset {
    pub fn utf_8() -> Self {
        Charset(UTF_8)
    }

    /// Resolves a WHATWG label (`UTF-8`, `windows-1251`, `latin1`, ...).
    pub fn for_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .filter(|enc| enc.is_ascii_compatible())
            .map(Charset)
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Decodes the start of a file. A leading UTF-8 byte-order mark is
    /// dropped; no other mark is sniffed, the configured encoding always wins.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        self.decode_line(bytes.strip_prefix(UTF_8_BOM).unwrap_or(bytes))
    }

    /// Decodes one line taken from the middle of a file.
    pub fn decode_line<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        self.0.decode_without_bom_handling(bytes).0
    }

    pub fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        let (bytes, _, _) = self.0.encode(text);
        bytes
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self::utf_8()
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Charset({})", self.name())
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
