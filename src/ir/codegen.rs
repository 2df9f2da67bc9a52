//! # Code Generation
//!
//! Converts IR programs to ESC/POS bytes.

use super::ops::{Op, Program};
use crate::protocol::text;
use crate::protocol::{codepage, commands};

impl Program {
    /// Compile the IR program to ESC/POS bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();

        for op in &self.ops {
            match op {
                // ===== Printer Control =====
                Op::Init => out.extend(commands::init()),
                Op::SetCodepage(page) => out.extend(commands::select_codepage(*page)),
                Op::Feed { lines } => out.extend(commands::feed_lines(*lines)),
                Op::Cut { partial } => {
                    if *partial {
                        out.extend(commands::cut_partial());
                    } else {
                        out.extend(commands::cut_full());
                    }
                }
                Op::DrawerPulse => out.extend(commands::drawer_pulse()),

                // ===== Style Changes =====
                Op::SetAlign(align) => out.extend(text::align(*align)),
                Op::SetBold(enabled) => {
                    if *enabled {
                        out.extend(text::bold_on());
                    } else {
                        out.extend(text::bold_off());
                    }
                }
                Op::SetSize(size) => out.extend(text::size(*size)),

                // ===== Content =====
                Op::Text(s) => out.extend(codepage::encode(s)),
                Op::Newline => out.push(commands::LF),
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::text::{Alignment, TextSize};

    #[test]
    fn test_codegen_frame() {
        let program: Program = vec![
            Op::Init,
            Op::SetCodepage(2),
            Op::SetAlign(Alignment::Left),
            Op::Text("Hola".into()),
            Op::Newline,
            Op::Feed { lines: 3 },
            Op::Cut { partial: false },
        ]
        .into_iter()
        .collect();

        let bytes = program.to_bytes();
        assert_eq!(
            bytes,
            vec![
                0x1B, 0x40, 0x1B, 0x74, 0x02, 0x1B, 0x61, 0x00, b'H', b'o', b'l', b'a', 0x0A,
                0x1B, 0x64, 0x03, 0x1D, 0x56, 0x00,
            ]
        );
    }

    #[test]
    fn test_codegen_encodes_text() {
        let program: Program = vec![Op::Text("Piña\r\n".into())].into_iter().collect();
        assert_eq!(program.to_bytes(), vec![b'P', b'i', 0xA4, b'a', b'\n']);
    }

    #[test]
    fn test_codegen_styles() {
        let program: Program = vec![
            Op::SetBold(true),
            Op::SetSize(TextSize::Large),
            Op::SetSize(TextSize::Normal),
            Op::SetBold(false),
            Op::DrawerPulse,
            Op::Cut { partial: true },
        ]
        .into_iter()
        .collect();

        assert_eq!(
            program.to_bytes(),
            vec![
                0x1B, 0x45, 0x01, 0x1D, 0x21, 0x11, 0x1D, 0x21, 0x00, 0x1B, 0x45, 0x00, 0x1B,
                0x70, 0x00, 0x32, 0xFA, 0x1D, 0x56, 0x01,
            ]
        );
    }
}
