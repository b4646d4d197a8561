/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Text decoding (§4.4). The bundled bitmap fonts only cover glyphs
//! `0x20..0x7F` (`microweb_draw::FIRST_GLYPH`/`GLYPH_COUNT`), so decoding
//! is ultimately ASCII-best-effort: bytes are decoded to Unicode scalars
//! via `encoding_rs`, then each scalar outside the printable ASCII range is
//! folded through a small replacement table or, failing that, replaced
//! with `?`.

use encoding_rs::{Decoder, Encoding, ISO_8859_2, WINDOWS_1252};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextEncoding {
    Utf8,
    /// Labeled `ISO-8859-1` in markup; decoded as `windows-1252`, matching
    /// every modern encoding implementation's label override (the two
    /// differ only in the C1 control range, which this engine discards
    /// regardless).
    Iso8859_1,
    Iso8859_2,
}

impl TextEncoding {
    /// Matches against a `<meta charset=...>` or `<meta content="...
    /// charset=...">` value, case-insensitively, per §4.4.
    pub fn from_label(label: &str) -> Option<TextEncoding> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(TextEncoding::Utf8),
            "iso-8859-1" | "latin1" | "windows-1252" | "cp1252" => Some(TextEncoding::Iso8859_1),
            "iso-8859-2" | "latin2" => Some(TextEncoding::Iso8859_2),
            _ => None,
        }
    }

    fn encoding(self) -> &'static Encoding {
        match self {
            TextEncoding::Utf8 => encoding_rs::UTF_8,
            TextEncoding::Iso8859_1 => WINDOWS_1252,
            TextEncoding::Iso8859_2 => ISO_8859_2,
        }
    }
}

/// A resumable decoder: bytes arrive in arbitrary chunks and a half
/// multi-byte sequence at a chunk boundary must survive to the next call.
/// Switching `TextEncoding` resets the underlying decoder, discarding any
/// pending partial sequence (§4.4: "An encoding switch mid-stream resets
/// any pending multi-byte UTF-8 state").
pub struct StreamDecoder {
    encoding: TextEncoding,
    inner: Decoder,
}

impl StreamDecoder {
    pub fn new(encoding: TextEncoding) -> Self {
        StreamDecoder { encoding, inner: encoding.encoding().new_decoder() }
    }

    pub fn set_encoding(&mut self, encoding: TextEncoding) {
        self.encoding = encoding;
        self.inner = encoding.encoding().new_decoder();
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Decodes one chunk of input, folding each resulting scalar through
    /// [`ascii_fold`]. The underlying `encoding_rs` decoder carries any
    /// incomplete multi-byte sequence at the end of `bytes` forward to the
    /// next call itself; the tokenizer above this layer handles
    /// resumability for incomplete tags/entities.
    pub fn decode_chunk(&mut self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len());
        let _ = self.inner.decode_to_string(bytes, &mut out, false);
        out.chars().map(ascii_fold).collect()
    }
}

/// Folds a single Unicode scalar to its closest printable-ASCII
/// equivalent. Printable ASCII and the control characters the tokenizer
/// cares about (`\n`, `\t`, space) pass through unchanged.
pub fn ascii_fold(ch: char) -> char {
    if ch == '\n' || ch == '\t' || (' '..='~').contains(&ch) {
        return ch;
    }
    match ch {
        '\u{2018}' | '\u{2019}' | '\u{201A}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
        '\u{2013}' | '\u{2014}' => '-',
        '\u{2026}' => '.',
        '\u{00A0}' => ' ',
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ą' => 'a',
        'è' | 'é' | 'ê' | 'ë' | 'ę' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'ñ' => 'n',
        'ç' | 'ć' => 'c',
        'ß' => 's',
        _ => '?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_label_matches_case_insensitively() {
        assert_eq!(TextEncoding::from_label("UTF-8"), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::from_label("ISO-8859-2"), Some(TextEncoding::Iso8859_2));
        assert_eq!(TextEncoding::from_label("bogus"), None);
    }

    #[test]
    fn ascii_fold_downgrades_smart_quotes() {
        assert_eq!(ascii_fold('\u{2019}'), '\'');
        assert_eq!(ascii_fold('\u{00E9}'), 'e');
        assert_eq!(ascii_fold('\u{4E2D}'), '?');
    }

    #[test]
    fn utf8_chunk_decodes_and_folds() {
        let mut dec = StreamDecoder::new(TextEncoding::Utf8);
        let text = dec.decode_chunk("caf\u{00E9}".as_bytes());
        assert_eq!(text, "cafe");
    }
}
