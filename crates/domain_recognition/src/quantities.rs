//! Quantity aggregation
//!
//! Net fulfilled quantity per order line, and the portion of it already
//! reflected in settled invoices. All quantities are expressed in the order
//! line's unit, signed by the line's sign (returns subtract).

use rust_decimal::Decimal;
use tracing::debug;

use domain_orders::{Order, OrderLine};

use crate::ports::{ConversionError, UnitConverter};

/// Net fulfilled quantity of a line, in the line's unit
///
/// Counts `Done` moves plus exception-flagged moves (the latter preserve
/// quantity continuity with their replacement document); everything else is
/// not yet fulfilled. Unit-conversion failures abort the enclosing
/// order-level operation.
pub fn fulfilled_quantity(
    line: &OrderLine,
    units: &dyn UnitConverter,
) -> Result<Decimal, ConversionError> {
    let mut total = Decimal::ZERO;
    for shipment_move in &line.moves {
        if !shipment_move.counts_as_fulfilled() {
            continue;
        }
        total += units.convert(shipment_move.quantity, shipment_move.uom, line.uom)?;
    }
    Ok(total * line.sign())
}

/// Quantity of the line's moves already billed by settled invoices
///
/// Walks the move → invoice-line links and counts lines of posted/paid,
/// active invoices, credit notes negated.
pub fn invoiced_move_quantity(
    order: &Order,
    line: &OrderLine,
    units: &dyn UnitConverter,
) -> Result<Decimal, ConversionError> {
    let mut total = Decimal::ZERO;
    for shipment_move in &line.moves {
        if !shipment_move.counts_as_fulfilled() {
            continue;
        }
        for invoice_line_id in &shipment_move.invoice_lines {
            let Some((invoice, invoice_line)) = order.find_invoice_line(*invoice_line_id) else {
                continue;
            };
            if !invoice.standing.is_active() || !invoice.is_settled() {
                continue;
            }
            let qty = units.convert(invoice_line.quantity, invoice_line.uom, line.uom)?;
            total += qty * invoice.sign();
        }
    }
    Ok(total * line.sign())
}

/// Fulfilled quantity not yet reflected in settled invoices
///
/// The incremental allocation strategy recognizes only this remainder, so
/// quantity invoicing has already accounted for directly is never
/// re-recognized through the suspense mechanism.
pub fn unposted_fulfilled_quantity(
    order: &Order,
    line: &OrderLine,
    units: &dyn UnitConverter,
) -> Result<Decimal, ConversionError> {
    let fulfilled = fulfilled_quantity(line, units)?;
    let invoiced = invoiced_move_quantity(order, line, units)?;
    let unposted = fulfilled - invoiced;
    debug!(line = %line.id, %fulfilled, %invoiced, %unposted, "aggregated line quantities");
    Ok(unposted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::{AccountId, CompanyId, Currency, Money, PartyId, UomId};
    use domain_orders::{
        Invoice, InvoiceKind, InvoiceLine, InvoicingMethod, MoveState, ProductRef, ShipmentMove,
        Standing,
    };
    use rust_decimal_macros::dec;

    /// Identity converter: every unit converts 1:1
    struct SameUnit;

    impl UnitConverter for SameUnit {
        fn convert(&self, quantity: Decimal, _from: UomId, _to: UomId) -> Result<Decimal, ConversionError> {
            Ok(quantity)
        }
    }

    fn uom() -> UomId {
        UomId::new()
    }

    fn widget() -> ProductRef {
        ProductRef::goods("Widget", AccountId::new())
    }

    fn order_with_line(line: OrderLine) -> Order {
        Order::new(
            CompanyId::new(),
            PartyId::new(),
            Currency::USD,
            Currency::USD,
            InvoicingMethod::OnShipment,
        )
        .with_line(line)
    }

    fn line_with_moves(moves: Vec<ShipmentMove>) -> OrderLine {
        let mut line = OrderLine::new(
            widget(),
            dec!(10),
            Money::new(dec!(5.00), Currency::USD),
            uom(),
        );
        line.moves = moves;
        line
    }

    #[test]
    fn only_done_moves_are_fulfilled() {
        let u = uom();
        let line = line_with_moves(vec![
            ShipmentMove::new(widget(), dec!(4), u).done(),
            ShipmentMove::new(widget(), dec!(6), u), // pending
        ]);

        assert_eq!(fulfilled_quantity(&line, &SameUnit).unwrap(), dec!(4));
    }

    #[test]
    fn exception_moves_preserve_quantity_continuity() {
        let u = uom();
        let superseded = ShipmentMove::new(widget(), dec!(4), u)
            .with_standing(Standing::Superseded(core_kernel::ShipmentMoveId::new()));
        let line = line_with_moves(vec![superseded]);

        assert_eq!(fulfilled_quantity(&line, &SameUnit).unwrap(), dec!(4));
    }

    #[test]
    fn cancelled_active_moves_are_excluded() {
        let u = uom();
        let mut cancelled = ShipmentMove::new(widget(), dec!(4), u);
        cancelled.state = MoveState::Cancelled;
        let line = line_with_moves(vec![cancelled]);

        assert_eq!(fulfilled_quantity(&line, &SameUnit).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn return_lines_subtract() {
        let u = uom();
        let mut line = line_with_moves(vec![ShipmentMove::new(widget(), dec!(3), u).done()]);
        line.quantity = dec!(-3);

        assert_eq!(fulfilled_quantity(&line, &SameUnit).unwrap(), dec!(-3));
    }

    #[test]
    fn unposted_quantity_shrinks_as_invoices_settle() {
        let u = uom();
        let mut shipped = ShipmentMove::new(widget(), dec!(10), u).done();

        let invoice_line =
            InvoiceLine::new(dec!(6), u, Money::new(dec!(30.00), Currency::USD));
        shipped.link_invoice_line(invoice_line.id);

        let invoice = Invoice::new(
            InvoiceKind::Invoice,
            Currency::USD,
            NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
        )
        .with_line(invoice_line)
        .post();

        let line = line_with_moves(vec![shipped]);
        let line_id = line.id;
        let mut order = order_with_line(line);
        order.invoices.push(invoice);

        let line = order.lines.iter().find(|l| l.id == line_id).unwrap();
        assert_eq!(unposted_fulfilled_quantity(&order, line, &SameUnit).unwrap(), dec!(4));
    }

    #[test]
    fn draft_invoices_do_not_reduce_unposted_quantity() {
        let u = uom();
        let mut shipped = ShipmentMove::new(widget(), dec!(10), u).done();

        let invoice_line = InvoiceLine::new(dec!(6), u, Money::new(dec!(30.00), Currency::USD));
        shipped.link_invoice_line(invoice_line.id);

        let invoice = Invoice::new(
            InvoiceKind::Invoice,
            Currency::USD,
            NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
        )
        .with_line(invoice_line); // stays draft

        let line = line_with_moves(vec![shipped]);
        let line_id = line.id;
        let mut order = order_with_line(line);
        order.invoices.push(invoice);

        let line = order.lines.iter().find(|l| l.id == line_id).unwrap();
        assert_eq!(unposted_fulfilled_quantity(&order, line, &SameUnit).unwrap(), dec!(10));
    }

    #[test]
    fn credit_notes_restore_unposted_quantity() {
        let u = uom();
        let mut shipped = ShipmentMove::new(widget(), dec!(10), u).done();

        let billed = InvoiceLine::new(dec!(10), u, Money::new(dec!(50.00), Currency::USD));
        let credited = InvoiceLine::new(dec!(4), u, Money::new(dec!(20.00), Currency::USD));
        shipped.link_invoice_line(billed.id);
        shipped.link_invoice_line(credited.id);

        let date = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let invoice = Invoice::new(InvoiceKind::Invoice, Currency::USD, date)
            .with_line(billed)
            .post();
        let credit_note = Invoice::new(InvoiceKind::CreditNote, Currency::USD, date)
            .with_line(credited)
            .post();

        let line = line_with_moves(vec![shipped]);
        let line_id = line.id;
        let mut order = order_with_line(line);
        order.invoices.push(invoice);
        order.invoices.push(credit_note);

        let line = order.lines.iter().find(|l| l.id == line_id).unwrap();
        // 10 shipped, 10 billed, 4 credited back: 4 remain unposted
        assert_eq!(unposted_fulfilled_quantity(&order, line, &SameUnit).unwrap(), dec!(4));
    }
}
