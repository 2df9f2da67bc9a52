//! # ESC/POS Protocol Implementation
//!
//! Low-level command builders for ESC/POS thermal receipt printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Printer control (init, code page, feed, cut, drawer)
//! - [`text`]: Text styling (alignment, bold, character size)
//! - [`codepage`]: Unicode to PC850 transliteration
//!
//! ## Usage Example
//!
//! ```
//! use ticketera::protocol::{codepage, commands, text};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(commands::select_codepage(commands::CODEPAGE_PC850));
//! data.extend(text::align(text::Alignment::Center));
//! data.extend(text::bold_on());
//! data.extend(codepage::encode("¡GRACIAS!\n"));
//! data.extend(text::bold_off());
//! data.extend(commands::feed_lines(3));
//! data.extend(commands::cut_full());
//!
//! assert_eq!(&data[..5], &[0x1B, 0x40, 0x1B, 0x74, 0x02]);
//! ```

pub mod codepage;
pub mod commands;
pub mod text;
