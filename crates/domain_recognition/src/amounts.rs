//! Amount calculation
//!
//! Converts aggregated quantities into company-currency amounts and reads
//! back what earlier cycles already posted. Every posting decision is a
//! function of `target - already_posted`, never of the target alone; the
//! posted-suspense query is the idempotency anchor of the whole engine.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use core_kernel::{AccountId, Money, OrderLineId};
use domain_orders::{Order, OrderLine};

use crate::config::RecognitionConfig;
use crate::error::RecognitionError;
use crate::ports::{ConversionError, CurrencyConverter, LedgerStore, LineFilter, UnitConverter};
use crate::quantities::fulfilled_quantity;

/// Fulfilled amount of one line, in the company currency
///
/// `fulfilled_quantity × unit_price` accumulates unrounded in the order
/// currency; rounding happens exactly once, inside the currency conversion.
pub fn line_shipment_amount(
    order: &Order,
    line: &OrderLine,
    units: &dyn UnitConverter,
    currencies: &dyn CurrencyConverter,
) -> Result<Money, ConversionError> {
    let quantity = fulfilled_quantity(line, units)?;
    if quantity.is_zero() {
        return Ok(Money::zero(order.company_currency));
    }
    let gross = line.unit_price.multiply(quantity);
    currencies.convert(gross, order.company_currency)
}

/// Fulfilled amounts of the whole order, bucketed by revenue account
///
/// The revenue account comes from the moved product, as shipped moves may
/// carry a different product than the line sold. Amounts accumulate
/// unrounded per bucket and are converted (and thereby rounded) once per
/// bucket. Input of the legacy proration strategy.
pub fn shipment_amounts(
    order: &Order,
    units: &dyn UnitConverter,
    currencies: &dyn CurrencyConverter,
) -> Result<BTreeMap<AccountId, Money>, ConversionError> {
    let mut buckets: BTreeMap<AccountId, Decimal> = BTreeMap::new();

    for line in order.lines.iter().filter(|l| l.is_recognizable()) {
        for shipment_move in &line.moves {
            if !shipment_move.counts_as_fulfilled() {
                continue;
            }
            let quantity = units.convert(shipment_move.quantity, shipment_move.uom, line.uom)?;
            let amount = line.unit_price.amount() * quantity * line.sign();
            *buckets
                .entry(shipment_move.product.revenue_account)
                .or_insert(Decimal::ZERO) += amount;
        }
    }

    buckets
        .into_iter()
        .map(|(account, amount)| {
            let converted =
                currencies.convert(Money::new(amount, order.currency), order.company_currency)?;
            Ok((account, converted))
        })
        .collect()
}

/// Net suspense amount already posted for the order
///
/// `Σ(debit - credit)` over suspense-account lines whose origin is the
/// order, optionally narrowed to one order line via the back-reference.
pub fn posted_suspense_amount(
    ledger: &dyn LedgerStore,
    config: &RecognitionConfig,
    order: &Order,
    line: Option<OrderLineId>,
) -> Result<Money, RecognitionError> {
    let mut filter = LineFilter::new()
        .from_origin(order.id)
        .on_account(config.suspense_account);
    if let Some(line) = line {
        filter = filter.for_order_line(line);
    }

    let mut total = Money::zero(order.company_currency);
    for ledger_line in ledger.search_lines(&filter)? {
        total = total.checked_add(&ledger_line.signed())?;
    }
    debug!(order = %order.id, ?line, posted = %total, "read posted suspense amount");
    Ok(total)
}

/// Invoiced amount per order line, in the company currency
///
/// Counts lines of posted/paid, active invoices only; credit notes negate.
/// Amounts accumulate unrounded per order line and convert once per line.
pub fn invoiced_amounts(
    order: &Order,
    currencies: &dyn CurrencyConverter,
) -> Result<BTreeMap<OrderLineId, Money>, ConversionError> {
    let mut buckets: BTreeMap<OrderLineId, Decimal> = BTreeMap::new();

    for invoice in order.settled_invoices() {
        for invoice_line in &invoice.lines {
            let Some(order_line) = invoice_line.order_line else {
                continue;
            };
            *buckets.entry(order_line).or_insert(Decimal::ZERO) +=
                invoice.signed_line_amount(invoice_line).amount();
        }
    }

    buckets
        .into_iter()
        .map(|(order_line, amount)| {
            let converted =
                currencies.convert(Money::new(amount, order.currency), order.company_currency)?;
            Ok((order_line, converted))
        })
        .collect()
}
