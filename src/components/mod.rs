//! # Declarative Components
//!
//! Small building blocks the document formatters compose receipts from.
//!
//! ```
//! use ticketera::components::*;
//!
//! let ticket = Document::new()
//!     .child(Text::new("TAQUERIA").center().bold().large())
//!     .child(Divider::dashed(42))
//!     .child(Columns::new("1x Taco", "$25").width(42))
//!     .cut();
//!
//! let bytes = ticket.build();
//! assert_eq!(&bytes[..5], &[0x1B, 0x40, 0x1B, 0x74, 0x02]);
//! ```
//!
//! All components implement [`Component`], which emits IR ops.

mod layout;
mod receipt;
mod text;

pub use layout::*;
pub use receipt::*;
pub use text::*;

use crate::ir::{Op, Program};

/// Trait for declarative components.
pub trait Component {
    /// Emit IR ops for this component into the ops vector.
    fn emit(&self, ops: &mut Vec<Op>);
}

/// Extension trait for compiling components.
pub trait ComponentExt: Component {
    /// Compile this component to an IR program.
    fn compile(&self) -> Program {
        let mut ops = Vec::new();
        self.emit(&mut ops);
        Program { ops }
    }

    /// Compile and generate ESC/POS bytes.
    fn build(&self) -> Vec<u8> {
        self.compile().to_bytes()
    }
}

// Blanket implementation for all components
impl<T: Component> ComponentExt for T {}

// Allow boxed components
impl Component for Box<dyn Component> {
    fn emit(&self, ops: &mut Vec<Op>) {
        self.as_ref().emit(ops);
    }
}
