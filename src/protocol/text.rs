//! # ESC/POS Text Styling Commands
//!
//! | Style | Command | Bytes |
//! |-------|---------|-------|
//! | Alignment | ESC a n | `1B 61 n` |
//! | Bold | ESC E n | `1B 45 n` |
//! | Character size | GS ! n | `1D 21 n` |
//!
//! ## Text Alignment
//!
//! ```text
//! Left aligned (default)    |LEFT TEXT
//! Center aligned            |  CENTER TEXT
//! ```

use super::commands::{ESC, GS};

// ============================================================================
// TEXT ALIGNMENT
// ============================================================================

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

impl Alignment {
    /// Lowercase name, used for HTML classes and host-app payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// # Select Justification (ESC a n)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC a n  |
/// | Hex     | 1B 61 n  |
///
/// Takes effect at the start of the next line.
///
/// ## Example
///
/// ```
/// use ticketera::protocol::text::{align, Alignment};
///
/// assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
/// ```
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

// ============================================================================
// EMPHASIS
// ============================================================================

/// # Emphasized Mode On (ESC E 1)
#[inline]
pub fn bold_on() -> Vec<u8> {
    vec![ESC, b'E', 1]
}

/// # Emphasized Mode Off (ESC E 0)
#[inline]
pub fn bold_off() -> Vec<u8> {
    vec![ESC, b'E', 0]
}

// ============================================================================
// CHARACTER SIZE
// ============================================================================

/// Character size presets used by the receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextSize {
    /// 1x width, 1x height
    #[default]
    Normal,
    /// 2x width, 2x height
    Large,
}

/// # Select Character Size (GS ! n)
///
/// High nibble is the width multiplier minus one, low nibble the height.
///
/// | Size   | Hex      |
/// |--------|----------|
/// | Normal | 1D 21 00 |
/// | Large  | 1D 21 11 |
pub fn size(size: TextSize) -> Vec<u8> {
    let n = match size {
        TextSize::Normal => 0x00,
        TextSize::Large => 0x11,
    };
    vec![GS, b'!', n]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align() {
        assert_eq!(align(Alignment::Left), vec![0x1B, 0x61, 0x00]);
        assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
        assert_eq!(align(Alignment::Right), vec![0x1B, 0x61, 0x02]);
    }

    #[test]
    fn test_bold() {
        assert_eq!(bold_on(), vec![0x1B, 0x45, 0x01]);
        assert_eq!(bold_off(), vec![0x1B, 0x45, 0x00]);
    }

    #[test]
    fn test_size() {
        assert_eq!(size(TextSize::Normal), vec![0x1D, 0x21, 0x00]);
        assert_eq!(size(TextSize::Large), vec![0x1D, 0x21, 0x11]);
    }
}
