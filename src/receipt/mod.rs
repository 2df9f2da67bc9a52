//! # Document Formatters
//!
//! Pure functions turning order and cash-cut data into IR programs:
//!
//! | Document | Function | Layout |
//! |----------|----------|--------|
//! | Client ticket | [`client_ticket`] | 42 columns, dashes |
//! | Kitchen order | [`kitchen_order`] | 32 columns, `=`, uppercase |
//! | Cash-cut report | [`cash_cut_report`] | 42 columns, sectioned |
//!
//! A program compiles to ESC/POS with [`Program::to_bytes`] or to HTML with
//! [`Program::to_html`]. Formatters never fail: missing fields are replaced
//! with placeholders.
//!
//! ```
//! use ticketera::model::{CartLine, TicketContext};
//! use ticketera::receipt::{self, PrintOptions, StoreInfo};
//!
//! let ctx = TicketContext {
//!     order_number: Some("42".into()),
//!     customer_name: Some("Ana".into()),
//!     date_str: "2026-10-19 13:05".into(),
//!     payment_method_label: "Efectivo".into(),
//!     total: 85.0,
//!     lines: vec![CartLine::new("Baguette Pavo", 1, 85.0)],
//! };
//!
//! let bytes = receipt::client_ticket(&StoreInfo::default(), &ctx, &PrintOptions::default()).to_bytes();
//! assert_eq!(&bytes[..5], &[0x1B, 0x40, 0x1B, 0x74, 0x02]);
//! ```

mod cash_cut;
mod client;
mod kitchen;

pub use cash_cut::cash_cut_report;
pub use client::client_ticket;
pub use kitchen::kitchen_order;

use serde::{Deserialize, Serialize};

use crate::ir::Program;
use crate::model::TicketContext;
use crate::model::order::non_blank;
use crate::printer::SizeClass;

/// Placeholder for a missing order number.
pub const NO_ORDER_NUMBER: &str = "---";

/// Placeholder for a missing customer name.
pub const DEFAULT_CUSTOMER: &str = "Cliente general";

/// Header and footer data for the store, taken from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreInfo {
    pub name: String,
    pub subtitle: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub thank_you: Vec<String>,
}

impl Default for StoreInfo {
    fn default() -> Self {
        Self {
            name: "RESTAURANTE".to_string(),
            subtitle: None,
            address: None,
            phone: None,
            thank_you: vec![
                "¡Gracias por su compra!".to_string(),
                "Vuelva pronto".to_string(),
            ],
        }
    }
}

impl StoreInfo {
    /// Store name, falling back to the default when blank.
    pub fn display_name(&self) -> &str {
        non_blank(Some(&self.name)).unwrap_or("RESTAURANTE")
    }

    /// Subtitle, address and phone, skipping blanks.
    pub fn info_lines(&self) -> Vec<String> {
        [&self.subtitle, &self.address, &self.phone]
            .into_iter()
            .filter_map(|v| non_blank(v.as_deref()))
            .map(str::to_string)
            .collect()
    }
}

/// Per-print options chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintOptions {
    /// Pulse the cash drawer (client ticket and cash cut only).
    pub open_drawer: bool,
    /// Full cut instead of partial cut.
    pub full_cut: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            open_drawer: false,
            full_cut: true,
        }
    }
}

/// The three printable document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    Ticket,
    Kitchen,
    CashCut,
}

impl DocumentKind {
    /// The printer size class this document is routed to.
    pub fn size_class(&self) -> SizeClass {
        match self {
            Self::Ticket | Self::CashCut => SizeClass::Mm80,
            Self::Kitchen => SizeClass::Mm58,
        }
    }

    /// Path segment used by the print gateway.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ticket => "ticket",
            Self::Kitchen => "kitchen",
            Self::CashCut => "cash-cut",
        }
    }

    /// Character width of the rendered document.
    pub fn columns(&self) -> usize {
        self.size_class().columns()
    }
}

/// Kitchen order followed by the client ticket, each with its own trailer.
pub fn generate_both(
    store: &StoreInfo,
    ctx: &TicketContext,
    client: &PrintOptions,
    kitchen: &PrintOptions,
) -> Program {
    let mut program = kitchen_order(ctx, kitchen);
    program.append(client_ticket(store, ctx, client));
    program
}

/// Format money as a whole-peso amount: `$85`, `-$12`.
///
/// Rounds half away from zero.
pub fn format_money(value: f64) -> String {
    let rounded = if value.is_finite() {
        value.round() as i64
    } else {
        0
    };
    if rounded < 0 {
        format!("-${}", rounded.unsigned_abs())
    } else {
        format!("${}", rounded)
    }
}

/// Local time as printed on tickets: `19/10/2026 13:05`.
pub fn current_datetime() -> String {
    chrono::Local::now().format("%d/%m/%Y %H:%M").to_string()
}

pub(crate) fn order_label(ctx: &TicketContext) -> String {
    match non_blank(ctx.order_number.as_deref()) {
        Some(n) => format!("#{}", n.trim_start_matches('#')),
        None => NO_ORDER_NUMBER.to_string(),
    }
}

pub(crate) fn customer_label(ctx: &TicketContext) -> &str {
    non_blank(ctx.customer_name.as_deref()).unwrap_or(DEFAULT_CUSTOMER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CartLine;
    use crate::protocol::codepage;

    fn ctx() -> TicketContext {
        TicketContext {
            order_number: Some("7".into()),
            customer_name: None,
            date_str: "2026-10-19".into(),
            payment_method_label: "Tarjeta".into(),
            total: 50.0,
            lines: vec![CartLine::new("Agua", 2, 25.0)],
        }
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(85.0), "$85");
        assert_eq!(format_money(84.5), "$85");
        assert_eq!(format_money(84.49), "$84");
        assert_eq!(format_money(0.0), "$0");
        assert_eq!(format_money(-12.5), "-$13");
        assert_eq!(format_money(f64::NAN), "$0");
    }

    #[test]
    fn test_order_label() {
        let mut c = ctx();
        assert_eq!(order_label(&c), "#7");
        c.order_number = Some("#8".into());
        assert_eq!(order_label(&c), "#8");
        c.order_number = None;
        assert_eq!(order_label(&c), "---");
        c.order_number = Some("  ".into());
        assert_eq!(order_label(&c), "---");
    }

    #[test]
    fn test_document_kind_routing() {
        assert_eq!(DocumentKind::Ticket.size_class(), SizeClass::Mm80);
        assert_eq!(DocumentKind::Kitchen.size_class(), SizeClass::Mm58);
        assert_eq!(DocumentKind::CashCut.as_str(), "cash-cut");
        assert_eq!(DocumentKind::Kitchen.columns(), 32);
    }

    #[test]
    fn test_store_info_lines_skip_blanks() {
        let store = StoreInfo {
            subtitle: Some("Ensaladas y baguettes".into()),
            address: Some("  ".into()),
            phone: Some("555-0101".into()),
            ..Default::default()
        };
        assert_eq!(store.info_lines(), vec!["Ensaladas y baguettes", "555-0101"]);
    }

    #[test]
    fn test_generate_both_has_two_full_cuts() {
        let bytes = generate_both(
            &StoreInfo::default(),
            &ctx(),
            &PrintOptions::default(),
            &PrintOptions::default(),
        )
        .to_bytes();
        let cuts = bytes.windows(3).filter(|w| *w == [0x1D, 0x56, 0x00]).count();
        assert_eq!(cuts, 2);
        assert!(codepage::decode(&bytes).contains("COCINA"));
    }
}
