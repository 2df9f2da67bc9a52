//! # Text Components

use super::Component;
use crate::ir::Op;
use crate::protocol::text::{Alignment, TextSize};

/// A single line of text with optional styling.
///
/// Styles are switched on before the text and restored after the newline,
/// so each line leaves the printer in its default state.
///
/// ```
/// use ticketera::components::*;
///
/// let header = Text::new("TAQUERIA").center().bold().large();
/// let plain = Text::new("Av. Juárez 12");
/// ```
pub struct Text {
    content: String,
    bold: bool,
    large: bool,
    alignment: Alignment,
}

impl Text {
    /// Create a new text line.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            bold: false,
            large: false,
            alignment: Alignment::Left,
        }
    }

    /// Make the text bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Double width and height.
    pub fn large(mut self) -> Self {
        self.large = true;
        self
    }

    /// Center the line.
    pub fn center(mut self) -> Self {
        self.alignment = Alignment::Center;
        self
    }
}

impl Component for Text {
    fn emit(&self, ops: &mut Vec<Op>) {
        let aligned = self.alignment != Alignment::Left;
        if aligned {
            ops.push(Op::SetAlign(self.alignment));
        }
        if self.bold {
            ops.push(Op::SetBold(true));
        }
        if self.large {
            ops.push(Op::SetSize(TextSize::Large));
        }

        ops.push(Op::Text(self.content.clone()));
        ops.push(Op::Newline);

        if self.large {
            ops.push(Op::SetSize(TextSize::Normal));
        }
        if self.bold {
            ops.push(Op::SetBold(false));
        }
        if aligned {
            ops.push(Op::SetAlign(Alignment::Left));
        }
    }
}

/// Several text lines sharing one style block.
///
/// Used for the bold order/customer header and centered footers, where
/// the ESC/POS stream switches a style once for a run of lines.
pub struct TextBlock {
    lines: Vec<String>,
    bold: bool,
    alignment: Alignment,
}

impl TextBlock {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            bold: false,
            alignment: Alignment::Left,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn center(mut self) -> Self {
        self.alignment = Alignment::Center;
        self
    }
}

impl Component for TextBlock {
    fn emit(&self, ops: &mut Vec<Op>) {
        if self.lines.is_empty() {
            return;
        }
        let aligned = self.alignment != Alignment::Left;
        if aligned {
            ops.push(Op::SetAlign(self.alignment));
        }
        if self.bold {
            ops.push(Op::SetBold(true));
        }
        for line in &self.lines {
            ops.push(Op::Text(line.clone()));
            ops.push(Op::Newline);
        }
        if self.bold {
            ops.push(Op::SetBold(false));
        }
        if aligned {
            ops.push(Op::SetAlign(Alignment::Left));
        }
    }
}
