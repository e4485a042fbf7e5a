//! Ledger posting model
//!
//! The recognition engine communicates with the host ledger through
//! [`LedgerMove`]s: an ordered set of one-sided [`LedgerLine`]s that must
//! balance exactly before it may be posted. Once posted a move is immutable
//! except for the reconciliation-group assignment on its lines.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{
    AccountId, JournalId, LedgerLineId, LedgerMoveId, Money, OrderId, OrderLineId, PartyId,
    PeriodId, ReconciliationId,
};
use domain_orders::Order;

use crate::analytic::AnalyticEntry;
use crate::error::RecognitionError;
use crate::ports::{LedgerStore, PostingCalendar};

/// Journal classification used to pick the posting journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalKind {
    Revenue,
    General,
}

/// Lifecycle of a ledger move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStatus {
    Draft,
    Posted,
}

/// One side of a ledger posting
///
/// Exactly one of `debit`/`credit` is non-zero. The optional order-line
/// back-reference is what later "already posted" queries key on; the
/// reconciliation id stays `None` until the line is cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Unique line identifier, stable across save and post
    pub id: LedgerLineId,
    /// Account posted to
    pub account: AccountId,
    /// Debit amount (zero when the line is a credit)
    pub debit: Money,
    /// Credit amount (zero when the line is a debit)
    pub credit: Money,
    /// Optional party
    pub party: Option<PartyId>,
    /// Back-reference to the originating order line
    pub order_line: Option<OrderLineId>,
    /// Reconciliation group; None until cleared
    pub reconciliation: Option<ReconciliationId>,
    /// Analytic entries mirrored from this line
    pub analytic_entries: Vec<AnalyticEntry>,
}

impl LedgerLine {
    /// Creates a debit line
    pub fn debit(account: AccountId, amount: Money) -> Self {
        Self {
            id: LedgerLineId::new_v7(),
            account,
            debit: amount,
            credit: Money::zero(amount.currency()),
            party: None,
            order_line: None,
            reconciliation: None,
            analytic_entries: Vec::new(),
        }
    }

    /// Creates a credit line
    pub fn credit(account: AccountId, amount: Money) -> Self {
        Self {
            id: LedgerLineId::new_v7(),
            account,
            debit: Money::zero(amount.currency()),
            credit: amount,
            party: None,
            order_line: None,
            reconciliation: None,
            analytic_entries: Vec::new(),
        }
    }

    /// Creates a line from a signed amount: debit when positive, credit
    /// when negative
    pub fn from_signed(account: AccountId, amount: Money) -> Self {
        if amount.is_negative() {
            Self::credit(account, amount.abs())
        } else {
            Self::debit(account, amount)
        }
    }

    /// Sets the party
    pub fn with_party(mut self, party: PartyId) -> Self {
        self.party = Some(party);
        self
    }

    /// Tags the line with its originating order line
    pub fn for_order_line(mut self, line: OrderLineId) -> Self {
        self.order_line = Some(line);
        self
    }

    /// Attaches mirrored analytic entries
    pub fn with_analytic_entries(mut self, entries: Vec<AnalyticEntry>) -> Self {
        self.analytic_entries = entries;
        self
    }

    /// Signed amount of the line: `debit - credit`
    pub fn signed(&self) -> Money {
        self.debit - self.credit
    }

    /// Returns true when the line carries at most one non-zero side
    pub fn is_one_sided(&self) -> bool {
        self.debit.is_zero() || self.credit.is_zero()
    }
}

/// A ledger move: header plus an ordered sequence of lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerMove {
    /// Unique move identifier
    pub id: LedgerMoveId,
    /// Originating order
    pub origin: OrderId,
    /// Accounting period the move falls in
    pub period: PeriodId,
    /// Posting journal
    pub journal: Option<JournalId>,
    /// Accounting date
    pub date: NaiveDate,
    /// Lifecycle status
    pub status: MoveStatus,
    /// Lines, in generation order
    pub lines: Vec<LedgerLine>,
}

impl LedgerMove {
    /// Creates a draft move
    pub fn new(
        origin: OrderId,
        period: PeriodId,
        journal: Option<JournalId>,
        date: NaiveDate,
        lines: Vec<LedgerLine>,
    ) -> Self {
        Self {
            id: LedgerMoveId::new_v7(),
            origin,
            period,
            journal,
            date,
            status: MoveStatus::Draft,
            lines,
        }
    }

    /// Sum of all debit amounts
    pub fn debit_total(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit.amount()).sum()
    }

    /// Sum of all credit amounts
    pub fn credit_total(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit.amount()).sum()
    }

    /// Returns true when debits equal credits exactly
    pub fn is_balanced(&self) -> bool {
        self.debit_total() == self.credit_total()
    }

    /// Validates the exact debit/credit identity and line shape
    ///
    /// # Errors
    ///
    /// `RecognitionError::UnbalancedMove` when the identity fails. The
    /// imbalance is never rounded away; it indicates an upstream bug.
    pub fn ensure_balanced(&self) -> Result<(), RecognitionError> {
        let debits = self.debit_total();
        let credits = self.credit_total();
        if debits != credits || self.lines.iter().any(|l| !l.is_one_sided()) {
            tracing::error!(
                origin = %self.origin,
                %debits,
                %credits,
                lines = ?self.lines,
                "constructed move violates the balance identity"
            );
            return Err(RecognitionError::UnbalancedMove {
                origin: self.origin,
                debits,
                credits,
            });
        }
        Ok(())
    }
}

/// Validates, saves and posts a freshly generated move
///
/// Shared tail of the allocation and reconciliation cycles.
pub(crate) fn assemble_and_post(
    ledger: &dyn LedgerStore,
    calendar: &dyn PostingCalendar,
    order: &Order,
    as_of: NaiveDate,
    journal: Option<JournalId>,
    lines: Vec<LedgerLine>,
) -> Result<LedgerMoveId, RecognitionError> {
    let period = calendar.find_period(order.company, as_of)?;

    let ledger_move = LedgerMove::new(order.id, period, journal, as_of, lines);
    ledger_move.ensure_balanced()?;

    let move_id = ledger.save(ledger_move)?;
    ledger.post(&[move_id])?;
    Ok(move_id)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use core_kernel::Currency;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a move assembled from matching debit/credit pairs
        /// always satisfies the exact balance identity.
        #[test]
        fn paired_lines_always_balance(
            amounts in prop::collection::vec(1i64..1_000_000i64, 1..10)
        ) {
            let debit_account = AccountId::new();
            let credit_account = AccountId::new();

            let mut lines = Vec::new();
            for minor in amounts {
                let amount = Money::from_minor(minor, Currency::USD);
                lines.push(LedgerLine::debit(debit_account, amount));
                lines.push(LedgerLine::credit(credit_account, amount));
            }

            let m = LedgerMove::new(
                OrderId::new(),
                PeriodId::new(),
                None,
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                lines,
            );

            prop_assert!(m.is_balanced());
            prop_assert!(m.ensure_balanced().is_ok());
        }

        /// Property: any one-minor-unit imbalance is refused, never
        /// rounded away.
        #[test]
        fn single_unit_imbalance_is_always_refused(minor in 2i64..1_000_000i64) {
            let m = LedgerMove::new(
                OrderId::new(),
                PeriodId::new(),
                None,
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                vec![
                    LedgerLine::debit(AccountId::new(), Money::from_minor(minor, Currency::USD)),
                    LedgerLine::credit(AccountId::new(), Money::from_minor(minor - 1, Currency::USD)),
                ],
            );

            prop_assert!(
                matches!(
                    m.ensure_balanced(),
                    Err(RecognitionError::UnbalancedMove { .. })
                ),
                "expected UnbalancedMove"
            );
        }
    }
}
