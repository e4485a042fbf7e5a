//! Allocation engine
//!
//! Computes and posts the incremental ledger entries that bring recognized
//! revenue in line with fulfilled quantity. Each cycle reads what earlier
//! cycles posted on the suspense account and only posts the difference, so
//! re-running after any shipment or invoice event converges instead of
//! double-counting.

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use core_kernel::{JournalId, LedgerMoveId, Money};
use domain_orders::Order;

use crate::amounts::{
    invoiced_amounts, line_shipment_amount, posted_suspense_amount, shipment_amounts,
};
use crate::analytic::mirror_revenue_line;
use crate::config::{AllocationStrategy, RecognitionConfig};
use crate::error::RecognitionError;
use crate::ledger::{assemble_and_post, JournalKind, LedgerLine};
use crate::ports::{CurrencyConverter, LedgerStore, PostingCalendar, UnitConverter};

/// Posts provisional recognition moves for shipped-not-invoiced goods
pub struct AllocationEngine<'a> {
    units: &'a dyn UnitConverter,
    currencies: &'a dyn CurrencyConverter,
    calendar: &'a dyn PostingCalendar,
    ledger: &'a dyn LedgerStore,
}

impl<'a> AllocationEngine<'a> {
    /// Creates an engine over the given collaborators
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

    /// Brings the suspense account in line with the order's fulfilled amount
    ///
    /// Returns `Ok(None)` when the invoicing method invoices directly or
    /// when the books are already in sync (idempotent no-op); otherwise
    /// posts one balanced move and returns its id.
    #[instrument(skip_all, fields(order = %order.id))]
    pub fn allocate(
        &self,
        order: &Order,
        config: &RecognitionConfig,
        as_of: NaiveDate,
    ) -> Result<Option<LedgerMoveId>, RecognitionError> {
        if !order.invoicing_method.requires_provisional_recognition() {
            debug!("invoicing method does not use provisional recognition");
            return Ok(None);
        }

        let journal = self.calendar.find_journal(JournalKind::Revenue);
        let lines = match config.strategy {
            AllocationStrategy::PerLine => self.per_line_lines(order, config, as_of, journal)?,
            AllocationStrategy::Prorated => self.prorated_lines(order, config)?,
        };

        if lines.is_empty() {
            debug!("books already in sync, nothing to post");
            return Ok(None);
        }

        let move_id = assemble_and_post(self.ledger, self.calendar, order, as_of, journal, lines)?;
        info!(%move_id, "posted provisional recognition move");
        Ok(Some(move_id))
    }

    /// Canonical strategy: one suspense/revenue pair per order line
    ///
    /// The line's target pending balance is its fulfilled amount net of
    /// what settled invoices already bill (the suspense balance of an
    /// order is always `fulfilled - invoiced`); `delta = target -
    /// already_posted(line)`. A positive delta debits the suspense account
    /// and credits the line's revenue account. Exact by construction, no
    /// division anywhere.
    fn per_line_lines(
        &self,
        order: &Order,
        config: &RecognitionConfig,
        as_of: NaiveDate,
        journal: Option<JournalId>,
    ) -> Result<Vec<LedgerLine>, RecognitionError> {
        let invoiced = invoiced_amounts(order, self.currencies)?;
        let mut lines = Vec::new();

        for line in order.lines.iter().filter(|l| l.is_recognizable()) {
            let Some(product) = &line.product else {
                continue;
            };

            let fulfilled = line_shipment_amount(order, line, self.units, self.currencies)?;
            let line_invoiced = invoiced
                .get(&line.id)
                .copied()
                .unwrap_or_else(|| Money::zero(order.company_currency));
            let target = fulfilled.checked_sub(&line_invoiced)?;
            let already = posted_suspense_amount(self.ledger, config, order, Some(line.id))?;
            let delta = target.checked_sub(&already)?;
            if delta.is_zero() {
                continue;
            }
            debug!(line = %line.id, %target, %already, %delta, "computed recognition delta");

            let revenue = LedgerLine::from_signed(product.revenue_account, -delta)
                .with_party(order.customer)
                .for_order_line(line.id);
            let mirrored = mirror_revenue_line(&revenue, line.analytic_accounts(), as_of, journal);
            lines.push(revenue.with_analytic_entries(mirrored));

            lines.push(
                LedgerLine::from_signed(config.suspense_account, delta)
                    .with_party(order.customer)
                    .for_order_line(line.id),
            );
        }

        Ok(lines)
    }

    /// Legacy strategy: one order-level suspense line, revenue prorated
    ///
    /// Revenue amounts are each rounded independently
    /// (`bucket × delta / total`), so the move can drift by up to one
    /// minimal currency unit per account; the balance guard downstream
    /// refuses such a move rather than coercing it.
    fn prorated_lines(
        &self,
        order: &Order,
        config: &RecognitionConfig,
    ) -> Result<Vec<LedgerLine>, RecognitionError> {
        let buckets = shipment_amounts(order, self.units, self.currencies)?;

        let mut total = Money::zero(order.company_currency);
        for amount in buckets.values() {
            total = total.checked_add(amount)?;
        }

        let already = posted_suspense_amount(self.ledger, config, order, None)?;
        let delta = total.checked_sub(&already)?;
        if delta.is_zero() {
            return Ok(Vec::new());
        }
        if total.is_zero() {
            return Err(RecognitionError::ProrationUndefined {
                origin: order.id,
                delta: delta.amount(),
            });
        }
        debug!(%total, %already, %delta, "prorating order-level delta");

        let mut lines = vec![
            LedgerLine::from_signed(config.suspense_account, delta).with_party(order.customer),
        ];

        let divisor = delta.amount() / total.amount();
        for (account, amount) in buckets {
            let share =
                Money::new(amount.amount() * divisor, order.company_currency).round_to_currency();
            if share.is_zero() {
                continue;
            }
            lines.push(LedgerLine::from_signed(account, -share).with_party(order.customer));
        }

        Ok(lines)
    }
}
