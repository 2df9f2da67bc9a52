//! # PC850 Code Page Encoding
//!
//! Converts Unicode strings to the single-byte code page the printers are
//! set to with `ESC t 2`. Only printable ASCII, newline and a fixed table of
//! Spanish glyphs survive; everything else is dropped without a placeholder.
//!
//! ## Pipeline
//!
//! 1. `\r` is removed so only `\n` line endings remain.
//! 2. The mojibake bullet `â€¢` (a UTF-8 `•` read as Windows-1252) becomes `-`.
//! 3. The text is decomposed (NFD). Each base character is recomposed with
//!    its combining marks only if the result is in the table; otherwise the
//!    marks are dropped and the bare base letter is kept (`ç` → `c`).
//! 4. Anything left outside 0x20–0x7E and `\n` is removed (emoji, CJK, tabs).
//!
//! The encoder is case-preserving; callers uppercase where they need to.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::{compose, is_combining_mark};

/// Mojibake form of U+2022 BULLET.
const MOJIBAKE_BULLET: &str = "\u{00E2}\u{20AC}\u{00A2}";

/// Glyphs outside ASCII that the printers can render.
const TABLE: &[(char, u8)] = &[
    ('á', 0xA0),
    ('é', 0x82),
    ('í', 0xA1),
    ('ó', 0xA2),
    ('ú', 0xA3),
    ('ñ', 0xA4),
    ('Ñ', 0xA5),
    ('ü', 0x81),
    ('Ü', 0x9A),
    ('¿', 0xA8),
    ('¡', 0xAD),
    ('€', 0xD5),
    ('Á', 0xB5),
    ('É', 0x90),
    ('Í', 0xD6),
    ('Ó', 0xE0),
    ('Ú', 0xE9),
    ('°', 0xF8),
];

/// Encode a Unicode string for the printer.
///
/// Never fails: unmappable characters produce no bytes.
///
/// ```
/// use ticketera::protocol::codepage::encode;
///
/// assert_eq!(encode("Año"), vec![0x41, 0xA4, 0x6F]);
/// assert_eq!(encode("taco 🌮"), b"taco ".to_vec());
/// ```
pub fn encode(s: &str) -> Vec<u8> {
    let cleaned = s.replace('\r', "").replace(MOJIBAKE_BULLET, "-");

    let mut out = Vec::with_capacity(cleaned.len());
    let mut chars = cleaned.nfd().peekable();

    while let Some(base) = chars.next() {
        let mut composed = Some(base);
        while let Some(&mark) = chars.peek() {
            if !is_combining_mark(mark) {
                break;
            }
            chars.next();
            composed = composed.and_then(|c| compose(c, mark));
        }

        if let Some(byte) = composed.and_then(table_byte) {
            out.push(byte);
        } else if is_printable(base) {
            out.push(base as u8);
        }
    }
    out
}

/// Width of a string in printer columns (one column per encoded byte).
pub fn display_width(s: &str) -> usize {
    encode(s).iter().filter(|&&b| b != b'\n').count()
}

/// Decode printer bytes back to text.
///
/// ASCII passes through, table bytes map back to their glyph and any other
/// byte becomes U+FFFD. Command bytes are not interpreted.
pub fn decode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b < 0x80 {
                b as char
            } else {
                TABLE
                    .iter()
                    .find(|(_, byte)| *byte == b)
                    .map(|(ch, _)| *ch)
                    .unwrap_or('\u{FFFD}')
            }
        })
        .collect()
}

fn table_byte(ch: char) -> Option<u8> {
    TABLE.iter().find(|(c, _)| *c == ch).map(|(_, byte)| *byte)
}

fn is_printable(ch: char) -> bool {
    ch == '\n' || (' '..='~').contains(&ch)
}
