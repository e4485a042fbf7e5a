//! Recognition domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{CompanyId, MoneyError, OrderId, OrderLineId};

use crate::ports::{CalendarError, ConversionError, LedgerError};

/// Errors that can occur in the recognition domain
///
/// Every variant aborts the current order's cycle only; the triggering
/// event can be redelivered and the computation converges instead of
/// double-posting.
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// No pending-invoice account is configured for the company
    #[error("There is no pending invoice account defined for company {company}. Please define one in the sale configuration.")]
    MissingSuspenseAccount { company: CompanyId },

    /// Unit or currency conversion failed
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Accounting period lookup failed
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// The posting subsystem rejected an operation
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Money arithmetic failed (currency mismatch)
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// A constructed move violates the debit/credit identity
    #[error("Unbalanced move for order {origin}: debits={debits}, credits={credits}")]
    UnbalancedMove {
        origin: OrderId,
        debits: Decimal,
        credits: Decimal,
    },

    /// A reconciliation group does not sum to exactly zero
    #[error("Reconciliation group for order line {order_line} does not sum to zero: total={total}")]
    UnbalancedGroup {
        order_line: OrderLineId,
        total: Decimal,
    },

    /// The legacy proration strategy cannot distribute over a zero total
    #[error("Cannot prorate for order {origin}: shipment total is zero while delta {delta} is outstanding")]
    ProrationUndefined { origin: OrderId, delta: Decimal },
}
