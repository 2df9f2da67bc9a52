//! # Host App Hand-off
//!
//! On phones and kiosks a companion print app owns the printer. The
//! document is described as a JSON array of entries and passed to the app
//! inside a custom URI:
//!
//! ```text
//! {scheme}{base64url(json)}
//!
//! [{"type":0,"content":"COCINA","bold":1,"align":1,"format":2}, ...]
//! ```
//!
//! | Field | Values |
//! |-------|--------|
//! | `type` | 0 text, 1 image, 2 barcode, 3 QR |
//! | `bold` | 0, 1 |
//! | `align` | 0 left, 1 center, 2 right |
//! | `format` | 0 normal, 2 double width and height |
//!
//! Entries come from the same IR program the ESC/POS bytes are compiled
//! from, one text entry per printed line.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Serialize, Serializer};

use crate::error::Result;
use crate::ir::{Op, Program, StyleState};
use crate::protocol::text::{Alignment, TextSize};

/// Kind of a host app entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Text = 0,
    Image = 1,
    Barcode = 2,
    Qr = 3,
}

impl Serialize for EntryType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// One entry of the host app payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    #[serde(rename = "type")]
    pub kind: EntryType,
    pub content: String,
    pub bold: u8,
    pub align: u8,
    pub format: u8,
}

impl Entry {
    fn text(content: String, style: &StyleState) -> Self {
        Self {
            kind: EntryType::Text,
            // The app drops empty entries; a space keeps blank lines
            content: if content.is_empty() { " ".to_string() } else { content },
            bold: style.bold as u8,
            align: match style.alignment {
                Alignment::Left => 0,
                Alignment::Center => 1,
                Alignment::Right => 2,
            },
            format: match style.size {
                TextSize::Normal => 0,
                TextSize::Large => 2,
            },
        }
    }
}

/// Turn a program into host app entries.
///
/// Each line takes the style in effect when its text started. Feeds, cuts
/// and drawer pulses are left to the app.
pub fn entries(program: &Program) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut style = StyleState::default();
    let mut line_style = style;
    let mut line = String::new();

    for op in program {
        match op {
            Op::Text(text) => {
                if line.is_empty() {
                    line_style = style;
                }
                line.push_str(text);
            }
            Op::Newline => {
                if line.is_empty() {
                    line_style = style;
                }
                entries.push(Entry::text(std::mem::take(&mut line), &line_style));
            }
            op => {
                style.apply(op);
            }
        }
    }
    if !line.is_empty() {
        entries.push(Entry::text(line, &line_style));
    }
    entries
}

/// Build the URI that hands `program` to the host app.
pub fn build_uri(scheme: &str, program: &Program) -> Result<String> {
    let json = serde_json::to_vec(&entries(program))?;
    Ok(format!("{}{}", scheme, URL_SAFE_NO_PAD.encode(json)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ComponentExt, Document, Text};
    use pretty_assertions::assert_eq;

    fn program() -> Program {
        Document::new()
            .child(Text::new("COCINA").center().bold().large())
            .child(Text::new("1x AGUA"))
            .cut()
            .compile()
    }

    #[test]
    fn test_entries_carry_style() {
        let entries = entries(&program());
        assert_eq!(
            entries,
            vec![
                Entry {
                    kind: EntryType::Text,
                    content: "COCINA".into(),
                    bold: 1,
                    align: 1,
                    format: 2,
                },
                Entry {
                    kind: EntryType::Text,
                    content: "1x AGUA".into(),
                    bold: 0,
                    align: 0,
                    format: 0,
                },
            ]
        );
    }

    #[test]
    fn test_entry_json_shape() {
        let json = serde_json::to_string(&entries(&program())[1]).unwrap();
        assert_eq!(
            json,
            r#"{"type":0,"content":"1x AGUA","bold":0,"align":0,"format":0}"#
        );
    }

    #[test]
    fn test_uri_round_trip() {
        let uri = build_uri("my.bluetoothprint.scheme://", &program()).unwrap();
        let payload = uri.strip_prefix("my.bluetoothprint.scheme://").unwrap();
        let decoded = URL_SAFE_NO_PAD.decode(payload).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(value[0]["content"], "COCINA");
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_blank_line_keeps_a_space() {
        let program: Program = vec![Op::Newline].into_iter().collect();
        assert_eq!(entries(&program)[0].content, " ");
    }
}
