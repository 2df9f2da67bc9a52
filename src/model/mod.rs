//! # Print Data Model
//!
//! Plain data structures supplied by the order and register collaborators.
//! JSON field names are camelCase, matching what the POS front end and the
//! print gateway exchange.
//!
//! - [`order`]: cart lines and the ticket context
//! - [`cash_cut`]: the end-of-shift cash-cut context

pub mod cash_cut;
mod lenient;
pub mod order;

pub use cash_cut::*;
pub use order::{CartLine, Customization, TicketContext};
