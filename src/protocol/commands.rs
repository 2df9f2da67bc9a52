//! # ESC/POS Printer Control Commands
//!
//! Command builders for initialization, code-page selection, paper feed,
//! cutting and the cash-drawer kick. Text styling lives in [`super::text`].
//!
//! ## Escape Sequence Structure
//!
//! Commands follow these patterns:
//! - Single byte: `LF`
//! - Two bytes: `ESC @`
//! - With parameters: `ESC t n`, `GS V m`, `ESC p m t1 t2`
//!
//! All the sequences emitted here are fixed-length and are reproduced
//! byte-for-byte by every document this crate renders.

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
///
/// Used for character size and cutter commands.
pub const GS: u8 = 0x1D;

/// LF (Line Feed) - Print the line buffer and advance one line
pub const LF: u8 = 0x0A;

/// Code page number for PC850 (Multilingual Latin 1) in `ESC t n`.
pub const CODEPAGE_PC850: u8 = 2;

// ============================================================================
// INITIALIZATION COMMANDS
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Clears the print buffer and resets text formatting to power-on defaults.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
///
/// ## Example
///
/// ```
/// use ticketera::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Select Character Code Table (ESC t n)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC t n  |
/// | Hex     | 1B 74 n  |
///
/// `n = 2` selects PC850, the table [`super::codepage`] encodes for.
#[inline]
pub fn select_codepage(page: u8) -> Vec<u8> {
    vec![ESC, b't', page]
}

// ============================================================================
// PAPER FEED COMMANDS
// ============================================================================

/// # Print and Feed n Lines (ESC d n)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC d n  |
/// | Hex     | 1B 64 n  |
///
/// ## Example
///
/// ```
/// use ticketera::protocol::commands;
///
/// assert_eq!(commands::feed_lines(3), vec![0x1B, 0x64, 0x03]);
/// ```
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}

// ============================================================================
// CUTTER CONTROL COMMANDS
// ============================================================================

/// # Full Cut (GS V 0)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | GS V 0   |
/// | Hex     | 1D 56 00 |
#[inline]
pub fn cut_full() -> Vec<u8> {
    vec![GS, b'V', 0]
}

/// # Partial Cut (GS V 1)
///
/// Leaves a small hinge so the ticket stays attached to the roll.
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | GS V 1   |
/// | Hex     | 1D 56 01 |
#[inline]
pub fn cut_partial() -> Vec<u8> {
    vec![GS, b'V', 1]
}

// ============================================================================
// CASH DRAWER
// ============================================================================

/// # Generate Pulse (ESC p m t1 t2)
///
/// Kicks the cash drawer wired to connector pin 2.
///
/// | Format  | Bytes          |
/// |---------|----------------|
/// | ASCII   | ESC p 0 50 250 |
/// | Hex     | 1B 70 00 32 FA |
///
/// `t1 = 50` and `t2 = 250` are the on/off times in 2 ms units.
#[inline]
pub fn drawer_pulse() -> Vec<u8> {
    vec![ESC, b'p', 0, 0x32, 0xFA]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_select_codepage() {
        assert_eq!(select_codepage(CODEPAGE_PC850), vec![0x1B, 0x74, 0x02]);
    }

    #[test]
    fn test_feed_lines() {
        assert_eq!(feed_lines(3), vec![0x1B, 0x64, 0x03]);
        assert_eq!(feed_lines(0), vec![0x1B, 0x64, 0x00]);
    }

    #[test]
    fn test_cuts() {
        assert_eq!(cut_full(), vec![0x1D, 0x56, 0x00]);
        assert_eq!(cut_partial(), vec![0x1D, 0x56, 0x01]);
    }

    #[test]
    fn test_drawer_pulse() {
        assert_eq!(drawer_pulse(), vec![0x1B, 0x70, 0x00, 0x32, 0xFA]);
    }
}
