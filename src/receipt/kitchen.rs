//! Kitchen order, read by the cooks.
//!
//! Always laid out for 32 columns so the same document works on either
//! paper width. Product names are uppercased for legibility at a glance.

use super::{PrintOptions, customer_label, order_label};
use crate::components::{ComponentExt, Divider, Document, Text};
use crate::ir::Program;
use crate::model::{CartLine, TicketContext};
use crate::printer::SizeClass;

/// Build the kitchen order.
///
/// ```text
///              COCINA             (centered, bold, large)
///            PEDIDO #42           (centered, bold)
/// ================================
/// Cliente: Ana
/// Hora: 2026-10-19 13:05
/// ================================
/// 1x ENSALADA CESAR (GRANDE)      (bold)
///   - Pollo
///   - OBS: sin crutones
/// ================================
/// ```
///
/// The options only choose the cut; the drawer is never pulsed.
pub fn kitchen_order(ctx: &TicketContext, options: &PrintOptions) -> Program {
    let width = SizeClass::Mm58.columns();

    let mut doc = Document::new()
        .child(Text::new("COCINA").center().bold().large())
        .child(Text::new(format!("PEDIDO {}", order_label(ctx))).center().bold())
        .child(Divider::equals(width))
        .child(Text::new(format!("Cliente: {}", customer_label(ctx))))
        .child(Text::new(format!("Hora: {}", ctx.date_str.trim())))
        .child(Divider::equals(width));

    if ctx.lines.is_empty() {
        doc.push(Text::new("(Sin productos)"));
    }
    for line in &ctx.lines {
        doc.push(Text::new(item_header(line)).bold());
        let details = item_details(line);
        if details.is_empty() {
            doc.push(Text::new("  (Sin modificaciones)"));
        }
        for detail in details {
            doc.push(Text::new(detail));
        }
    }

    doc.child(Divider::equals(width))
        .cut_with(options.full_cut)
        .compile()
}

fn item_header(line: &CartLine) -> String {
    let mut header = format!("{}x {}", line.quantity, line.product_name.trim().to_uppercase());
    if let Some(size) = line.size() {
        header.push_str(&format!(" ({})", size.to_uppercase()));
    }
    header
}

/// Customizations, then the custom label, then the kitchen note.
fn item_details(line: &CartLine) -> Vec<String> {
    let mut details: Vec<String> = line
        .customizations
        .iter()
        .map(|c| c.ingredient_name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| format!("  - {}", name))
        .collect();
    if let Some(label) = line.label() {
        details.push(format!("  - {}", label));
    }
    if let Some(note) = line.note() {
        details.push(format!("  - OBS: {}", note));
    }
    details
}
