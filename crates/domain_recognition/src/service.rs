//! Recognition service
//!
//! The two entry points the host system wires its events to: the order's
//! "processing" transition runs an allocation cycle (and a completion-time
//! reconciliation when the order is ready), invoice-posting and
//! shipment-completion events run the incremental matcher.

use chrono::NaiveDate;
use tracing::instrument;

use core_kernel::LedgerMoveId;
use domain_orders::Order;

use crate::allocation::AllocationEngine;
use crate::config::RecognitionConfig;
use crate::error::RecognitionError;
use crate::ports::{CurrencyConverter, LedgerStore, PostingCalendar, UnitConverter};
use crate::reconciliation::{ready_to_reconcile, ReconciliationMatcher, ReconciliationOutcome};

/// What one processing cycle did
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessingOutcome {
    /// Provisional recognition move posted by the allocation engine
    pub allocation: Option<LedgerMoveId>,
    /// Completion-time reconciliation, when the order was ready for it
    pub reconciliation: Option<ReconciliationOutcome>,
}

/// Facade bundling the allocation engine and the reconciliation matcher
pub struct RecognitionService<'a> {
    units: &'a dyn UnitConverter,
    currencies: &'a dyn CurrencyConverter,
    calendar: &'a dyn PostingCalendar,
    ledger: &'a dyn LedgerStore,
}

impl<'a> RecognitionService<'a> {
    /// Creates a service over the given collaborators
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

    fn allocator(&self) -> AllocationEngine<'_> {
        AllocationEngine::new(self.units, self.currencies, self.calendar, self.ledger)
    }

    fn matcher(&self) -> ReconciliationMatcher<'_> {
        ReconciliationMatcher::new(self.units, self.currencies, self.calendar, self.ledger)
    }

    /// Handles the order's transition into a fulfilling state
    ///
    /// Runs an allocation cycle, then a reconciliation when the order is
    /// fully shipped with every active invoice settled.
    #[instrument(skip_all, fields(order = %order.id))]
    pub fn on_order_processing(
        &self,
        order: &Order,
        config: &RecognitionConfig,
        as_of: NaiveDate,
    ) -> Result<ProcessingOutcome, RecognitionError> {
        let allocation = self.allocator().allocate(order, config, as_of)?;

        let reconciliation = if ready_to_reconcile(order) {
            self.matcher().reconcile(order, config, as_of)?
        } else {
            None
        };

        Ok(ProcessingOutcome {
            allocation,
            reconciliation,
        })
    }

    /// Handles an invoice-posting or shipment-completion event
    ///
    /// Runs the incremental matcher; redelivering the same event is a
    /// no-op.
    #[instrument(skip_all, fields(order = %order.id))]
    pub fn on_invoice_event(
        &self,
        order: &Order,
        config: &RecognitionConfig,
        as_of: NaiveDate,
    ) -> Result<Option<ReconciliationOutcome>, RecognitionError> {
        self.matcher().reconcile(order, config, as_of)
    }
}
