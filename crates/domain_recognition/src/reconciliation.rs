//! Reconciliation matcher
//!
//! As invoices post, the provisional suspense balance is unwound and the
//! matched portion replaced by real revenue postings; the retired suspense
//! lines are cleared against a counter-line in a zero-sum reconciliation
//! group. Safe to invoke on every invoice-posting or shipment event: a run
//! that observes nothing newly invoiced changes nothing.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use core_kernel::{LedgerLineId, LedgerMoveId, Money, OrderLineId, ReconciliationId};
use domain_orders::Order;

use crate::amounts::{invoiced_amounts, line_shipment_amount};
use crate::analytic::mirror_revenue_line;
use crate::config::RecognitionConfig;
use crate::error::RecognitionError;
use crate::ledger::{assemble_and_post, JournalKind, LedgerLine};
use crate::ports::{CurrencyConverter, LedgerStore, LineFilter, PostingCalendar, UnitConverter};

/// Result of one reconciliation cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationOutcome {
    /// The posted move, when new lines were generated
    pub move_id: Option<LedgerMoveId>,
    /// Reconciliation groups marked during the cycle
    pub groups: Vec<ReconciliationId>,
}

/// Returns true once the order can be reconciled at completion
///
/// The legacy gate: everything shipped and every active invoice posted or
/// paid. The per-line matcher itself does not require it; incremental
/// callers invoke [`ReconciliationMatcher::reconcile`] directly on each
/// invoice event.
pub fn ready_to_reconcile(order: &Order) -> bool {
    order.is_fully_shipped() && order.all_invoices_settled()
}

/// Clears matched suspense lines and re-establishes the remaining balance
pub struct ReconciliationMatcher<'a> {
    units: &'a dyn UnitConverter,
    currencies: &'a dyn CurrencyConverter,
    calendar: &'a dyn PostingCalendar,
    ledger: &'a dyn LedgerStore,
}

impl<'a> ReconciliationMatcher<'a> {
    /// Creates a matcher over the given collaborators
    pub fn new(
        units: &'a dyn UnitConverter,
        currencies: &'a dyn CurrencyConverter,
        calendar: &'a dyn PostingCalendar,
        ledger: &'a dyn LedgerStore,
    ) -> Self {
        Self {
            units,
            currencies,
            calendar,
            ledger,
        }
    }

    /// Runs one reconciliation cycle over the order
    ///
    /// Per order line, with `A` the outstanding suspense amount, `F` the
    /// current fulfilled amount and `I` the invoiced amount:
    /// `R = clamp(I - (F - A))` between zero and `A` is recognized now and
    /// `P = A - R` stays pending, so `R + P == A` holds exactly. The
    /// outstanding lines plus a fresh counter-line for `-A` form a
    /// reconciliation group whose signed total must be exactly zero.
    ///
    /// Returns `Ok(None)` when there is nothing to reconcile.
    #[instrument(skip_all, fields(order = %order.id))]
    pub fn reconcile(
        &self,
        order: &Order,
        config: &RecognitionConfig,
        as_of: NaiveDate,
    ) -> Result<Option<ReconciliationOutcome>, RecognitionError> {
        if !order.invoicing_method.requires_provisional_recognition() {
            debug!("invoicing method does not use provisional recognition");
            return Ok(None);
        }

        let invoiced = invoiced_amounts(order, self.currencies)?;
        let journal = self.calendar.find_journal(JournalKind::Revenue);

        let mut new_lines: Vec<LedgerLine> = Vec::new();
        let mut group_plans: Vec<Vec<LedgerLineId>> = Vec::new();

        for line in order.lines.iter().filter(|l| l.is_recognizable()) {
            let Some(product) = &line.product else {
                continue;
            };

            let outstanding = self.ledger.search_lines(
                &LineFilter::new()
                    .from_origin(order.id)
                    .on_account(config.suspense_account)
                    .for_order_line(line.id)
                    .unreconciled(),
            )?;
            if outstanding.is_empty() {
                continue;
            }

            let mut amount_to_reconcile = Money::zero(order.company_currency);
            for open_line in &outstanding {
                amount_to_reconcile = amount_to_reconcile.checked_add(&open_line.signed())?;
            }

            if amount_to_reconcile.is_zero() {
                // The open lines already offset each other; clear them
                // without generating anything.
                group_plans.push(outstanding.iter().map(|l| l.id).collect());
                continue;
            }

            let fulfilled = line_shipment_amount(order, line, self.units, self.currencies)?;
            let line_invoiced = invoiced
                .get(&line.id)
                .copied()
                .unwrap_or_else(|| Money::zero(order.company_currency));

            // F - A is what earlier cycles already recognized, so the
            // clamped difference is exactly the newly observed portion.
            let recognized_before = fulfilled.checked_sub(&amount_to_reconcile)?;
            let newly_invoiced = line_invoiced.checked_sub(&recognized_before)?;
            let recognized_now = clamp_between_zero_and(newly_invoiced, amount_to_reconcile);
            let remaining_pending = amount_to_reconcile.checked_sub(&recognized_now)?;

            if recognized_now.is_zero() {
                debug!(line = %line.id, outstanding = %amount_to_reconcile, "nothing newly invoiced");
                continue;
            }
            debug!(
                line = %line.id,
                outstanding = %amount_to_reconcile,
                %fulfilled,
                invoiced = %line_invoiced,
                %recognized_now,
                %remaining_pending,
                "matched line"
            );

            let counter = LedgerLine::from_signed(config.suspense_account, -amount_to_reconcile)
                .with_party(order.customer)
                .for_order_line(line.id);

            let group_total = amount_to_reconcile.checked_add(&counter.signed())?;
            if !group_total.is_zero() {
                return Err(group_violation(line.id, group_total.amount(), &outstanding));
            }
            let mut group: Vec<LedgerLineId> = outstanding.iter().map(|l| l.id).collect();
            group.push(counter.id);

            let revenue = LedgerLine::from_signed(product.revenue_account, recognized_now)
                .with_party(order.customer)
                .for_order_line(line.id);
            let mirrored = mirror_revenue_line(&revenue, line.analytic_accounts(), as_of, journal);
            new_lines.push(revenue.with_analytic_entries(mirrored));

            if !remaining_pending.is_zero() {
                new_lines.push(
                    LedgerLine::from_signed(config.suspense_account, remaining_pending)
                        .with_party(order.customer)
                        .for_order_line(line.id),
                );
            }
            new_lines.push(counter);
            group_plans.push(group);
        }

        if new_lines.is_empty() && group_plans.is_empty() {
            debug!("nothing to reconcile");
            return Ok(None);
        }

        let move_id = if new_lines.is_empty() {
            None
        } else {
            Some(assemble_and_post(
                self.ledger,
                self.calendar,
                order,
                as_of,
                journal,
                new_lines,
            )?)
        };

        let mut groups = Vec::with_capacity(group_plans.len());
        for plan in group_plans {
            groups.push(self.ledger.reconcile(&plan)?);
        }

        info!(?move_id, groups = groups.len(), "reconciled order");
        Ok(Some(ReconciliationOutcome { move_id, groups }))
    }
}

/// Clamps `value` into the closed interval between zero and `bound`
fn clamp_between_zero_and(value: Money, bound: Money) -> Money {
    let v = value.amount();
    let b = bound.amount();
    let clamped = if b >= Decimal::ZERO {
        v.clamp(Decimal::ZERO, b)
    } else {
        v.clamp(b, Decimal::ZERO)
    };
    Money::new(clamped, value.currency())
}

fn group_violation(
    order_line: OrderLineId,
    total: Decimal,
    outstanding: &[LedgerLine],
) -> RecognitionError {
    tracing::error!(
        %order_line,
        %total,
        lines = ?outstanding,
        "reconciliation group violates the zero-sum identity"
    );
    RecognitionError::UnbalancedGroup { order_line, total }
}
