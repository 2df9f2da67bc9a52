//! # Document Component
//!
//! The root container every printed document is built from.

use super::Component;
use crate::ir::Op;
use crate::protocol::commands::CODEPAGE_PC850;
use crate::protocol::text::Alignment;

/// Lines fed before the cut so the last line clears the cutter.
const TRAILER_FEED_LINES: u8 = 3;

/// Document is the root container component.
///
/// It frames its children with the fixed ESC/POS header
/// (`RESET`, `ESC t 2`, left align) and, when a cut is requested, the
/// trailer (`feed 3`, optional drawer pulse, cut).
///
/// ```
/// use ticketera::components::*;
///
/// let bytes = Document::new()
///     .child(Text::new("Hola"))
///     .drawer_pulse()
///     .partial_cut()
///     .build();
///
/// assert!(bytes.ends_with(&[0x1B, 0x70, 0x00, 0x32, 0xFA, 0x1D, 0x56, 0x01]));
/// ```
pub struct Document {
    children: Vec<Box<dyn Component>>,
    auto_cut: bool,
    partial_cut: bool,
    drawer_pulse: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            auto_cut: false,
            partial_cut: false,
            drawer_pulse: false,
        }
    }

    /// Add a child component.
    pub fn child<C: Component + 'static>(mut self, component: C) -> Self {
        self.children.push(Box::new(component));
        self
    }

    /// Add a child component in place.
    pub fn push<C: Component + 'static>(&mut self, component: C) {
        self.children.push(Box::new(component));
    }

    /// Feed and full cut at the end.
    pub fn cut(mut self) -> Self {
        self.auto_cut = true;
        self.partial_cut = false;
        self
    }

    /// Feed and partial cut at the end (leaves hinge).
    pub fn partial_cut(mut self) -> Self {
        self.auto_cut = true;
        self.partial_cut = true;
        self
    }

    /// Full or partial cut depending on `full`.
    pub fn cut_with(self, full: bool) -> Self {
        if full { self.cut() } else { self.partial_cut() }
    }

    /// Pulse the cash drawer after the content, before the cut.
    pub fn drawer_pulse(mut self) -> Self {
        self.drawer_pulse = true;
        self
    }

    /// Pulse the drawer only when `open` is set.
    pub fn drawer_pulse_if(self, open: bool) -> Self {
        if open { self.drawer_pulse() } else { self }
    }
}

impl Component for Document {
    fn emit(&self, ops: &mut Vec<Op>) {
        ops.push(Op::Init);
        ops.push(Op::SetCodepage(CODEPAGE_PC850));
        ops.push(Op::SetAlign(Alignment::Left));

        for child in &self.children {
            child.emit(ops);
        }

        if self.auto_cut {
            ops.push(Op::Feed {
                lines: TRAILER_FEED_LINES,
            });
        }
        if self.drawer_pulse {
            ops.push(Op::DrawerPulse);
        }
        if self.auto_cut {
            ops.push(Op::Cut {
                partial: self.partial_cut,
            });
        }
    }
}
