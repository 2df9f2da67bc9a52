//! # Intermediate Representation (IR)
//!
//! The IR is a "bytecode" representation that sits between the document
//! formatters and the concrete outputs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │ Formatters  │ ──► │     IR      │ ──► │ ESC/POS bytes│
//! │ (receipt::) │     │  (Vec<Op>)  │ ─┐  └──────────────┘
//! └─────────────┘     └─────────────┘  │  ┌──────────────┐
//!                                      └► │     HTML     │
//!                                         └──────────────┘
//! ```
//!
//! Building a document once and rendering it several ways keeps the HTML
//! and host-app outputs in lockstep with the printed ticket.
//!
//! ## Example
//!
//! ```
//! use ticketera::ir::{Op, Program};
//! use ticketera::protocol::text::Alignment;
//!
//! let mut program = Program::new();
//! program.push(Op::Init);
//! program.push(Op::SetAlign(Alignment::Center));
//! program.push(Op::SetBold(true));
//! program.push(Op::Text("HOLA".into()));
//! program.push(Op::Newline);
//! program.push(Op::Cut { partial: false });
//!
//! let bytes = program.to_bytes();
//! assert_eq!(&bytes[..2], &[0x1B, 0x40]);
//!
//! let html = program.to_html_fragment();
//! assert!(html.contains("HOLA"));
//! ```

mod codegen;
mod html;
mod ops;

pub use ops::*;
