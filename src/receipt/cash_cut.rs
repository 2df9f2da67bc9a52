//! End-of-shift cash-cut report.
//!
//! Sections always appear in the same order. Sales, opening and products
//! print a "no data" line when empty; card payments, movements and the
//! denomination count are left out entirely.

use super::{PrintOptions, StoreInfo, format_money};
use crate::components::{Columns, ComponentExt, Divider, Document, Text};
use crate::ir::Program;
use crate::model::order::non_blank;
use crate::model::{CashCutContext, CashMovement};
use crate::printer::SizeClass;

const DEFAULT_TITLE: &str = "CORTE DE CAJA";

/// Build the cash-cut report.
///
/// ```text
///            CORTE DE CAJA         (centered, bold, large)
///             RESTAURANTE
///     Generado: 2026-10-19 22:10
/// ==========================================
/// Tickets:                                 12
/// Efectivo:                             $1450
/// ...
/// ==========================================
/// ------------------------------------------
/// DETALLE DE VENTAS                  (bold)
/// #41 EFECTIVO $85                   (bold)
/// 13:05 - Ana
/// ...
/// ------------------------------------------
/// TOTAL EN CAJA:                        $1950  (bold)
/// ```
pub fn cash_cut_report(store: &StoreInfo, ctx: &CashCutContext, options: &PrintOptions) -> Program {
    let width = SizeClass::Mm80.columns();
    let row = |label: &str, value: String| Columns::new(label, value).width(width);

    let title = non_blank(Some(&ctx.title)).unwrap_or(DEFAULT_TITLE);
    let mut doc = Document::new()
        .child(Text::new(title).center().bold().large())
        .child(Text::new(store.display_name()).center());
    if let Some(generated_at) = non_blank(Some(&ctx.generated_at)) {
        doc.push(Text::new(format!("Generado: {}", generated_at)).center());
    }

    // Summary box
    doc.push(Divider::equals(width));
    doc.push(row("Tickets:", ctx.sales_count.to_string()));
    doc.push(row("Efectivo:", format_money(ctx.cash_total)));
    doc.push(row("Tarjeta:", format_money(ctx.card_total)));
    doc.push(row("Esperado en caja:", format_money(ctx.expected_cash)));
    doc.push(row("Contado:", format_money(ctx.counted_cash)));
    doc.push(row("Diferencia:", format_money(ctx.difference)).bold());
    doc.push(Divider::equals(width));

    section(&mut doc, width, "DETALLE DE VENTAS");
    if ctx.sales.is_empty() {
        doc.push(Text::new("Sin ventas registradas"));
    }
    for sale in &ctx.sales {
        doc.push(
            Text::new(format!(
                "#{} {} {}",
                sale.number.trim().trim_start_matches('#'),
                sale.payment_method.trim().to_uppercase(),
                format_money(sale.amount)
            ))
            .bold(),
        );
        let customer = non_blank(sale.customer.as_deref()).unwrap_or(super::DEFAULT_CUSTOMER);
        doc.push(Text::new(format!("{} - {}", sale.time.trim(), customer)));
    }

    if !ctx.card_transactions.is_empty() {
        section(&mut doc, width, "PAGOS CON TARJETA");
        for tx in &ctx.card_transactions {
            let left = match (non_blank(tx.time.as_deref()), non_blank(tx.reference.as_deref())) {
                (Some(time), Some(reference)) => format!("{} Ref. {}", time, reference),
                (Some(time), None) => time.to_string(),
                (None, Some(reference)) => format!("Ref. {}", reference),
                (None, None) => "Pago con tarjeta".to_string(),
            };
            doc.push(row(&left, format_money(tx.amount)));
        }
        let total: f64 = ctx.card_transactions.iter().map(|tx| tx.amount).sum();
        doc.push(row("Total tarjeta:", format_money(total)).bold());
    }

    section(&mut doc, width, "APERTURA");
    match &ctx.opening {
        Some(opening) => {
            doc.push(Text::new(format!("Abierta: {}", opening.opened_at.trim())));
            if let Some(by) = non_blank(opening.opened_by.as_deref()) {
                doc.push(Text::new(format!("Por: {}", by)));
            }
            doc.push(row("Fondo inicial:", format_money(opening.initial_cash)));
        }
        None => doc.push(Text::new("Sin apertura registrada")),
    }

    section(&mut doc, width, "PRODUCTOS VENDIDOS");
    if ctx.product_totals.is_empty() {
        doc.push(Text::new("Sin productos vendidos"));
    }
    for product in &ctx.product_totals {
        doc.push(row(
            &format!("{}x {}", product.quantity, product.name.trim()),
            format_money(product.total),
        ));
    }

    if !ctx.deposits.is_empty() || !ctx.withdrawals.is_empty() {
        section(&mut doc, width, "MOVIMIENTOS");
        movements(&mut doc, width, "Entradas", "Sin entradas", &ctx.deposits);
        movements(&mut doc, width, "Salidas", "Sin salidas", &ctx.withdrawals);
    }

    if !ctx.denomination_entries.is_empty() {
        section(&mut doc, width, "CONTEO DE EFECTIVO");
        for entry in &ctx.denomination_entries {
            doc.push(row(
                &format!("{} x {}", entry.label.trim(), entry.quantity),
                format_money(entry.subtotal()),
            ));
        }
        let counted: f64 = ctx.denomination_entries.iter().map(|e| e.subtotal()).sum();
        doc.push(row("Total contado:", format_money(counted)).bold());
    }

    doc.child(Divider::dashed(width))
        .child(row("TOTAL EN CAJA:", format_money(ctx.counted_cash)).bold())
        .drawer_pulse_if(options.open_drawer)
        .cut_with(options.full_cut)
        .compile()
}

fn section(doc: &mut Document, width: usize, header: &str) {
    doc.push(Divider::dashed(width));
    doc.push(Text::new(header).bold());
}

fn movements(doc: &mut Document, width: usize, label: &str, empty: &str, items: &[CashMovement]) {
    doc.push(Text::new(format!("{}:", label)));
    if items.is_empty() {
        doc.push(Text::new(format!("  {}", empty)));
        return;
    }
    for item in items {
        let left = match non_blank(item.time.as_deref()) {
            Some(time) => format!("  {} {}", time, item.concept.trim()),
            None => format!("  {}", item.concept.trim()),
        };
        doc.push(Columns::new(left, format_money(item.amount)).width(width));
    }
    let total: f64 = items.iter().map(|m| m.amount).sum();
    doc.push(Columns::new(format!("Total {}:", label.to_lowercase()), format_money(total)).width(width).bold());
}
