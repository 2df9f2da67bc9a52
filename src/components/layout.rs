//! # Layout Components
//!
//! Separators, two-column rows and blank lines.

use super::Component;
use crate::ir::Op;
use crate::protocol::codepage::display_width;

/// A full-width separator line.
///
/// ```
/// use ticketera::components::Divider;
///
/// let ticket = Divider::dashed(42);
/// let kitchen = Divider::equals(32);
/// ```
pub struct Divider {
    ch: char,
    width: usize,
}

impl Divider {
    /// Create a divider repeating `ch` across `width` columns.
    pub fn new(ch: char, width: usize) -> Self {
        Self { ch, width }
    }

    /// Dashed line: `------`
    pub fn dashed(width: usize) -> Self {
        Self::new('-', width)
    }

    /// Equals line: `======`
    pub fn equals(width: usize) -> Self {
        Self::new('=', width)
    }
}

impl Component for Divider {
    fn emit(&self, ops: &mut Vec<Op>) {
        ops.push(Op::Text(self.ch.to_string().repeat(self.width)));
        ops.push(Op::Newline);
    }
}

/// Join `left` and `right` so that `right` ends at column `width`.
///
/// At least one space always separates the two; if they do not fit,
/// nothing is truncated and the line simply overflows.
///
/// ```
/// use ticketera::components::pad_columns;
///
/// assert_eq!(pad_columns("1x Taco", "$25", 14), "1x Taco    $25");
/// assert_eq!(pad_columns("1x Taco al pastor", "$25", 14), "1x Taco al pastor $25");
/// ```
pub fn pad_columns(left: &str, right: &str, width: usize) -> String {
    let used = display_width(left) + display_width(right);
    let gap = width.saturating_sub(used).max(1);
    format!("{}{}{}", left, " ".repeat(gap), right)
}

/// A two-column row: left text, right-aligned value.
///
/// ```
/// use ticketera::components::Columns;
///
/// let line = Columns::new("1x Agua", "$20").width(32);
/// let total = Columns::new("TOTAL:", "$120").width(42).bold();
/// ```
pub struct Columns {
    left: String,
    right: String,
    width: usize,
    bold: bool,
}

impl Columns {
    /// Create a two-column row (default width: 42).
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            width: 42,
            bold: false,
        }
    }

    /// Set the character width.
    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Make the row bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

impl Component for Columns {
    fn emit(&self, ops: &mut Vec<Op>) {
        if self.bold {
            ops.push(Op::SetBold(true));
        }
        ops.push(Op::Text(pad_columns(&self.left, &self.right, self.width)));
        ops.push(Op::Newline);
        if self.bold {
            ops.push(Op::SetBold(false));
        }
    }
}

/// An empty line.
pub struct BlankLine;

impl Component for BlankLine {
    fn emit(&self, ops: &mut Vec<Op>) {
        ops.push(Op::Newline);
    }
}
