//! Recognition Domain Ports
//!
//! The engine consumes its collaborators (unit and currency conversion,
//! the accounting calendar, the per-company configuration and the ledger
//! posting subsystem) through the traits defined here. Adapters implement
//! them against the host system; `infra_mem` provides in-memory reference
//! implementations.
//!
//! The whole cycle is synchronous and runs to completion or raises, so the
//! ports are plain traits: no futures, no callbacks.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{
    AccountId, CompanyId, Currency, JournalId, LedgerLineId, LedgerMoveId, Money, OrderId,
    OrderLineId, PeriodId, QuantityError, ReconciliationId, UomId,
};

use crate::ledger::{JournalKind, LedgerLine, LedgerMove};

/// Errors raised by the conversion ports
///
/// Conversion failures are fatal for the enclosing order-level operation;
/// no partial posting is committed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    /// The unit of measure is not registered
    #[error("Unknown unit of measure: {0}")]
    UnknownUnit(UomId),

    /// The underlying quantity conversion failed
    #[error("Quantity conversion failed: {0}")]
    Quantity(#[from] QuantityError),

    /// No exchange rate is available for the currency pair
    #[error("No exchange rate from {from} to {to}")]
    MissingRate { from: Currency, to: Currency },
}

/// Errors raised by the accounting calendar
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    /// No open period covers the accounting date
    #[error("No open accounting period for company {company} covering {date}")]
    NoOpenPeriod { company: CompanyId, date: NaiveDate },
}

/// Errors raised by the posting subsystem
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Ledger move not found: {0}")]
    MoveNotFound(LedgerMoveId),

    #[error("Ledger line not found: {0}")]
    LineNotFound(LedgerLineId),

    #[error("Move {0} is already posted")]
    AlreadyPosted(LedgerMoveId),

    #[error("Cannot post move {0} with no lines")]
    EmptyMove(LedgerMoveId),

    #[error("Line {0} is already part of a reconciliation group")]
    AlreadyReconciled(LedgerLineId),

    #[error("Cannot reconcile line {0} of an unposted move")]
    UnpostedLine(LedgerLineId),

    #[error("Reconciliation group does not sum to zero: total={total}")]
    UnbalancedGroup { total: Decimal },
}

/// Converts quantities between units of measure
///
/// Implementations must round to the target unit's declared precision.
pub trait UnitConverter {
    fn convert(&self, quantity: Decimal, from: UomId, to: UomId) -> Result<Decimal, ConversionError>;
}

/// Converts monetary amounts between currencies
///
/// Implementations must round to the target currency's declared precision;
/// the engine relies on this as its single rounding point per bucket.
pub trait CurrencyConverter {
    fn convert(&self, amount: Money, to: Currency) -> Result<Money, ConversionError>;
}

/// Resolves accounting periods and journals
pub trait PostingCalendar {
    /// Period containing `date` for the company
    fn find_period(&self, company: CompanyId, date: NaiveDate) -> Result<PeriodId, CalendarError>;

    /// First journal of the given kind, if any is configured
    fn find_journal(&self, kind: JournalKind) -> Option<JournalId>;
}

/// Per-company recognition settings
pub trait SettingsStore {
    /// The configured pending-invoice (suspense) account, one per company
    fn suspense_account(&self, company: CompanyId) -> Option<AccountId>;
}

/// Query over stored ledger lines
///
/// All criteria are conjunctive; unset criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct LineFilter {
    /// Restrict to moves originating from this order
    pub origin: Option<OrderId>,
    /// Restrict to lines on this account
    pub account: Option<AccountId>,
    /// Restrict to lines tagged with this order line
    pub order_line: Option<OrderLineId>,
    /// Only lines not yet part of a reconciliation group
    pub unreconciled_only: bool,
}

impl LineFilter {
    /// Creates a filter matching every line
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to moves originating from the order
    pub fn from_origin(mut self, origin: OrderId) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Restricts to lines on the account
    pub fn on_account(mut self, account: AccountId) -> Self {
        self.account = Some(account);
        self
    }

    /// Restricts to lines tagged with the order line
    pub fn for_order_line(mut self, line: OrderLineId) -> Self {
        self.order_line = Some(line);
        self
    }

    /// Excludes lines already in a reconciliation group
    pub fn unreconciled(mut self) -> Self {
        self.unreconciled_only = true;
        self
    }

    /// Returns true when a line of a move with the given origin matches
    pub fn matches(&self, move_origin: OrderId, line: &LedgerLine) -> bool {
        if self.origin.is_some_and(|o| o != move_origin) {
            return false;
        }
        if self.account.is_some_and(|a| a != line.account) {
            return false;
        }
        if self.order_line.is_some_and(|ol| line.order_line != Some(ol)) {
            return false;
        }
        if self.unreconciled_only && line.reconciliation.is_some() {
            return false;
        }
        true
    }
}

/// The posting/storage subsystem
///
/// Implementations must guarantee that reads observe a consistent snapshot
/// with respect to the same order's prior postings, that posting a move is
/// atomic, and that reconciliation-group assignment is atomic across all
/// lines entering the group.
pub trait LedgerStore {
    /// Returns the stored lines matching the filter
    fn search_lines(&self, filter: &LineFilter) -> Result<Vec<LedgerLine>, LedgerError>;

    /// Stores a draft move, keeping all line identifiers
    fn save(&self, ledger_move: LedgerMove) -> Result<LedgerMoveId, LedgerError>;

    /// Posts previously saved moves; each move posts atomically
    fn post(&self, moves: &[LedgerMoveId]) -> Result<(), LedgerError>;

    /// Places the lines into a new reconciliation group
    ///
    /// The group's signed total must be exactly zero and none of the lines
    /// may already belong to a group.
    fn reconcile(&self, lines: &[LedgerLineId]) -> Result<ReconciliationId, LedgerError>;
}
