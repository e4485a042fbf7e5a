//! Revenue Recognition Domain
//!
//! Recognizes revenue for goods that shipped before they were invoiced, and
//! reconciles that provisional recognition against actual invoicing. Each
//! shipped-but-unbilled unit is booked against a configured suspense
//! ("pending invoice") account; as invoices post, the suspense balance is
//! unwound, replaced by real revenue postings, and the matched ledger lines
//! are cleared against each other in zero-sum reconciliation groups.
//!
//! The engine is incremental and idempotent: every posting decision is a
//! function of `target - already_posted`, so re-running after any shipment
//! or invoice event converges instead of double-counting. All collaborators
//! (conversion, calendar, configuration, posting) are consumed through the
//! port traits in [`ports`].

pub mod error;
pub mod ports;
pub mod config;
pub mod analytic;
pub mod ledger;
pub mod quantities;
pub mod amounts;
pub mod allocation;
pub mod reconciliation;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use error::RecognitionError;
pub use config::{AllocationStrategy, RecognitionConfig};
pub use analytic::{mirror_revenue_line, AnalyticEntry};
pub use ledger::{JournalKind, LedgerLine, LedgerMove, MoveStatus};
pub use ports::{
    CalendarError, ConversionError, CurrencyConverter, LedgerError, LedgerStore, LineFilter,
    PostingCalendar, SettingsStore, UnitConverter,
};
pub use quantities::{fulfilled_quantity, invoiced_move_quantity, unposted_fulfilled_quantity};
pub use amounts::{invoiced_amounts, line_shipment_amount, posted_suspense_amount, shipment_amounts};
pub use allocation::AllocationEngine;
pub use reconciliation::{ready_to_reconcile, ReconciliationMatcher, ReconciliationOutcome};
pub use service::{ProcessingOutcome, RecognitionService};
