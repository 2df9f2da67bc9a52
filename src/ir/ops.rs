//! # IR Opcodes
//!
//! The intermediate representation for receipt documents. Formatters build a
//! [`Program`] once; it is then compiled to ESC/POS bytes ([`Program::to_bytes`]),
//! to HTML ([`Program::to_html`]) or to host-app print entries.
//!
//! ```text
//! Formatter → IR (inspectable) ─┬─► Codegen → ESC/POS bytes
//!                               ├─► HTML
//!                               └─► Host-app entries
//! ```

use crate::protocol::text::{Alignment, TextSize};

/// Style state tracked while walking a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleState {
    pub alignment: Alignment,
    pub bold: bool,
    pub size: TextSize,
}

impl StyleState {
    /// Apply a style op, returning `true` if the op was a style change.
    pub fn apply(&mut self, op: &Op) -> bool {
        match op {
            Op::Init => *self = Self::default(),
            Op::SetAlign(align) => self.alignment = *align,
            Op::SetBold(bold) => self.bold = *bold,
            Op::SetSize(size) => self.size = *size,
            _ => return false,
        }
        true
    }
}

/// IR opcodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    // ========== Printer Control ==========
    /// Initialize printer (ESC @). Resets to default state.
    Init,

    /// Select character code table (ESC t n).
    SetCodepage(u8),

    /// Print and feed n lines.
    Feed { lines: u8 },

    /// Cut paper. `partial: true` leaves a small hinge.
    Cut { partial: bool },

    /// Kick the cash drawer.
    DrawerPulse,

    // ========== Style Changes ==========
    /// Set text alignment.
    SetAlign(Alignment),

    /// Enable/disable bold.
    SetBold(bool),

    /// Set character size.
    SetSize(TextSize),

    // ========== Content ==========
    /// Unicode text (no trailing newline). Encoded at codegen time.
    Text(String),

    /// Line feed.
    Newline,
}

/// A compiled IR program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub ops: Vec<Op>,
}

impl Program {
    /// Create an empty program.
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Add an op to the program.
    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    /// Add multiple ops to the program.
    pub fn extend(&mut self, ops: impl IntoIterator<Item = Op>) {
        self.ops.extend(ops);
    }

    /// Append another program after this one.
    pub fn append(&mut self, other: Program) {
        self.ops.extend(other.ops);
    }

    /// Get the number of ops in the program.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if the program is empty.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Iterate over ops.
    pub fn iter(&self) -> impl Iterator<Item = &Op> {
        self.ops.iter()
    }

    /// The printable lines of the program, without any styling.
    ///
    /// Handy for tests and logs.
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        for op in &self.ops {
            match op {
                Op::Text(s) => current.push_str(s),
                Op::Newline => lines.push(std::mem::take(&mut current)),
                _ => {}
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

impl FromIterator<Op> for Program {
    fn from_iter<T: IntoIterator<Item = Op>>(iter: T) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Program {
    type Item = Op;
    type IntoIter = std::vec::IntoIter<Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
