//! Client ticket, handed to the customer.

use super::{PrintOptions, StoreInfo, customer_label, format_money, order_label};
use crate::components::{Columns, ComponentExt, Divider, Document, Text, TextBlock};
use crate::ir::Program;
use crate::model::{CartLine, TicketContext};
use crate::model::order::non_blank;
use crate::printer::SizeClass;

/// Build the client ticket.
///
/// ```text
///             STORE NAME          (centered, bold, large)
///          subtitle / address / phone
/// ------------------------------------------
/// Pedido: #42                       (bold)
/// Cliente: Ana                      (bold)
/// Fecha: 2026-10-19 13:05
/// Pago: Efectivo
/// ------------------------------------------
/// 1x Baguette Pavo                       $85
///   - sin cebolla
///   - Nota: para llevar
/// ------------------------------------------
/// TOTAL:                                 $85  (bold)
/// ------------------------------------------
///          ¡Gracias por su compra!
/// ```
///
/// Ends with feed, optional drawer pulse and a full or partial cut.
pub fn client_ticket(store: &StoreInfo, ctx: &TicketContext, options: &PrintOptions) -> Program {
    let width = SizeClass::Mm80.columns();

    let mut doc = Document::new()
        .child(Text::new(store.display_name()).center().bold().large())
        .child(TextBlock::new(store.info_lines()).center())
        .child(Divider::dashed(width))
        .child(
            TextBlock::new([
                format!("Pedido: {}", order_label(ctx)),
                format!("Cliente: {}", customer_label(ctx)),
            ])
            .bold(),
        )
        .child(TextBlock::new([
            format!("Fecha: {}", ctx.date_str.trim()),
            format!(
                "Pago: {}",
                non_blank(Some(&ctx.payment_method_label)).unwrap_or("No especificado")
            ),
        ]))
        .child(Divider::dashed(width));

    if ctx.lines.is_empty() {
        doc.push(Text::new("(Sin productos)"));
    }
    for line in &ctx.lines {
        doc.push(Columns::new(item_label(line), format_money(line.subtotal)).width(width));
        if let Some(label) = line.label() {
            doc.push(Text::new(format!("  - {}", label)));
        }
        if let Some(note) = line.note() {
            doc.push(Text::new(format!("  - Nota: {}", note)));
        }
    }

    doc.child(Divider::dashed(width))
        .child(Columns::new("TOTAL:", format_money(ctx.total)).width(width).bold())
        .child(Divider::dashed(width))
        .child(TextBlock::new(store.thank_you.clone()).center())
        .drawer_pulse_if(options.open_drawer)
        .cut_with(options.full_cut)
        .compile()
}

/// `"{qty}x {name}"` with ` ({size})` when the line has a size.
fn item_label(line: &CartLine) -> String {
    let mut label = format!("{}x {}", line.quantity, line.product_name.trim());
    if let Some(size) = line.size() {
        label.push_str(&format!(" ({})", size));
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Op;
    use crate::protocol::codepage;
    use pretty_assertions::assert_eq;

    fn sample() -> TicketContext {
        TicketContext {
            order_number: Some("42".into()),
            customer_name: Some("Ana".into()),
            date_str: "2026-10-19 13:05".into(),
            payment_method_label: "Efectivo".into(),
            total: 85.0,
            lines: vec![CartLine::new("Baguette Pavo", 1, 85.0)],
        }
    }

    #[test]
    fn test_item_label_with_size() {
        let line = CartLine::new("Ensalada César", 2, 90.0).with_size("Grande");
        assert_eq!(item_label(&line), "2x Ensalada César (Grande)");
    }

    #[test]
    fn test_item_line_is_padded_to_42() {
        let program = client_ticket(&StoreInfo::default(), &sample(), &PrintOptions::default());
        let item = program
            .text_lines()
            .into_iter()
            .find(|l| l.starts_with("1x Baguette Pavo"))
            .unwrap();
        assert_eq!(item.len(), 42);
        assert!(item.ends_with("$85"));
    }

    #[test]
    fn test_header_lines() {
        let lines = client_ticket(&StoreInfo::default(), &sample(), &PrintOptions::default())
            .text_lines();
        assert_eq!(lines[0], "RESTAURANTE");
        assert_eq!(lines[1], "-".repeat(42));
        assert_eq!(lines[2], "Pedido: #42");
        assert_eq!(lines[3], "Cliente: Ana");
        assert_eq!(lines[4], "Fecha: 2026-10-19 13:05");
        assert_eq!(lines[5], "Pago: Efectivo");
    }

    #[test]
    fn test_sub_lines() {
        let mut ctx = sample();
        ctx.lines[0] = ctx.lines[0]
            .clone()
            .with_label("Sin cebolla")
            .with_note("Para llevar");
        let lines = client_ticket(&StoreInfo::default(), &ctx, &PrintOptions::default()).text_lines();
        let idx = lines.iter().position(|l| l.starts_with("1x ")).unwrap();
        assert_eq!(lines[idx + 1], "  - Sin cebolla");
        assert_eq!(lines[idx + 2], "  - Nota: Para llevar");
    }

    #[test]
    fn test_placeholders() {
        let mut ctx = sample();
        ctx.order_number = None;
        ctx.customer_name = Some(" ".into());
        let lines = client_ticket(&StoreInfo::default(), &ctx, &PrintOptions::default()).text_lines();
        assert!(lines.contains(&"Pedido: ---".to_string()));
        assert!(lines.contains(&"Cliente: Cliente general".to_string()));
    }

    #[test]
    fn test_drawer_and_partial_cut() {
        let options = PrintOptions {
            open_drawer: true,
            full_cut: false,
        };
        let program = client_ticket(&StoreInfo::default(), &sample(), &options);
        let n = program.ops.len();
        assert_eq!(program.ops[n - 2], Op::DrawerPulse);
        assert_eq!(program.ops[n - 1], Op::Cut { partial: true });

        let bytes = program.to_bytes();
        assert!(bytes.ends_with(&[0x1B, 0x64, 0x03, 0x1B, 0x70, 0x00, 0x32, 0xFA, 0x1D, 0x56, 0x01]));
    }

    #[test]
    fn test_no_drawer_by_default() {
        let bytes = client_ticket(&StoreInfo::default(), &sample(), &PrintOptions::default()).to_bytes();
        assert!(!bytes.windows(2).any(|w| w == [0x1B, 0x70]));
        assert!(bytes.ends_with(&[0x1D, 0x56, 0x00]));
    }

    #[test]
    fn test_header_bytes() {
        let bytes = client_ticket(&StoreInfo::default(), &sample(), &PrintOptions::default()).to_bytes();
        assert_eq!(
            bytes[..17].to_vec(),
            vec![
                0x1B, 0x40, // reset
                0x1B, 0x74, 0x02, // PC850
                0x1B, 0x61, 0x00, // left
                0x1B, 0x61, 0x01, // center
                0x1B, 0x45, 0x01, // bold
                0x1D, 0x21, 0x11, // large
            ]
        );
        assert!(codepage::decode(&bytes).contains("¡Gracias por su compra!"));
    }
}
