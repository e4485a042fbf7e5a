//! In-crate test doubles for the port traits
//!
//! Deliberately minimal: identity converters, a fixed calendar and a
//! `RefCell`-backed ledger store. The full-featured reference adapters live
//! in `infra_mem`; these exist so the engine modules can test their own
//! logic without a cross-crate dependency.

use std::cell::RefCell;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::{
    CompanyId, Currency, JournalId, LedgerLineId, LedgerMoveId, Money, OrderId, PeriodId,
    ReconciliationId, UomId,
};

use crate::config::RecognitionConfig;
use crate::ledger::{JournalKind, LedgerLine, LedgerMove, MoveStatus};
use crate::ports::{
    CalendarError, ConversionError, CurrencyConverter, LedgerError, LedgerStore, LineFilter,
    PostingCalendar, UnitConverter,
};

/// Identity unit converter: every unit converts 1:1
pub(crate) struct SameUnit;

impl UnitConverter for SameUnit {
    fn convert(&self, quantity: Decimal, _from: UomId, _to: UomId) -> Result<Decimal, ConversionError> {
        Ok(quantity)
    }
}

/// Identity currency converter that still rounds to the target precision
pub(crate) struct SameCurrency;

impl CurrencyConverter for SameCurrency {
    fn convert(&self, amount: Money, to: Currency) -> Result<Money, ConversionError> {
        Ok(Money::new(amount.amount(), to).round_to_currency())
    }
}

/// Calendar with one period and one revenue journal
pub(crate) struct FixedCalendar {
    pub period: PeriodId,
    pub journal: Option<JournalId>,
}

impl Default for FixedCalendar {
    fn default() -> Self {
        Self {
            period: PeriodId::new(),
            journal: Some(JournalId::new()),
        }
    }
}

impl PostingCalendar for FixedCalendar {
    fn find_period(&self, _company: CompanyId, _date: NaiveDate) -> Result<PeriodId, CalendarError> {
        Ok(self.period)
    }

    fn find_journal(&self, _kind: JournalKind) -> Option<JournalId> {
        self.journal
    }
}

/// Single-threaded in-memory ledger store
#[derive(Default)]
pub(crate) struct VecLedger {
    moves: RefCell<Vec<LedgerMove>>,
}

impl VecLedger {
    pub fn move_by_id(&self, id: LedgerMoveId) -> Option<LedgerMove> {
        self.moves.borrow().iter().find(|m| m.id == id).cloned()
    }

    pub fn move_count(&self) -> usize {
        self.moves.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.borrow().is_empty()
    }

    /// Net signed suspense amount for an order (USD test helper)
    pub fn suspense_balance(&self, config: &RecognitionConfig, origin: OrderId) -> Money {
        let total: Decimal = self
            .moves
            .borrow()
            .iter()
            .filter(|m| m.origin == origin)
            .flat_map(|m| m.lines.iter())
            .filter(|l| l.account == config.suspense_account)
            .map(|l| l.signed().amount())
            .sum();
        Money::new(total, Currency::USD)
    }

    /// Suspense lines of an order not yet in a reconciliation group
    pub fn outstanding_suspense(&self, config: &RecognitionConfig, origin: OrderId) -> Vec<LedgerLine> {
        let filter = LineFilter::new()
            .from_origin(origin)
            .on_account(config.suspense_account)
            .unreconciled();
        self.search_lines(&filter).unwrap()
    }
}

impl LedgerStore for VecLedger {
    fn search_lines(&self, filter: &LineFilter) -> Result<Vec<LedgerLine>, LedgerError> {
        Ok(self
            .moves
            .borrow()
            .iter()
            .flat_map(|m| {
                m.lines
                    .iter()
                    .filter(|l| filter.matches(m.origin, l))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect())
    }

    fn save(&self, ledger_move: LedgerMove) -> Result<LedgerMoveId, LedgerError> {
        let id = ledger_move.id;
        self.moves.borrow_mut().push(ledger_move);
        Ok(id)
    }

    fn post(&self, move_ids: &[LedgerMoveId]) -> Result<(), LedgerError> {
        let mut moves = self.moves.borrow_mut();
        for id in move_ids {
            let m = moves
                .iter_mut()
                .find(|m| m.id == *id)
                .ok_or(LedgerError::MoveNotFound(*id))?;
            if m.status == MoveStatus::Posted {
                return Err(LedgerError::AlreadyPosted(*id));
            }
            if m.lines.is_empty() {
                return Err(LedgerError::EmptyMove(*id));
            }
            m.status = MoveStatus::Posted;
        }
        Ok(())
    }

    fn reconcile(&self, line_ids: &[LedgerLineId]) -> Result<ReconciliationId, LedgerError> {
        let mut moves = self.moves.borrow_mut();

        let mut total = Decimal::ZERO;
        for id in line_ids {
            let line = moves
                .iter()
                .flat_map(|m| m.lines.iter())
                .find(|l| l.id == *id)
                .ok_or(LedgerError::LineNotFound(*id))?;
            if line.reconciliation.is_some() {
                return Err(LedgerError::AlreadyReconciled(*id));
            }
            total += line.signed().amount();
        }
        if !total.is_zero() {
            return Err(LedgerError::UnbalancedGroup { total });
        }

        let group = ReconciliationId::new_v7();
        for m in moves.iter_mut() {
            for line in m.lines.iter_mut() {
                if line_ids.contains(&line.id) {
                    line.reconciliation = Some(group);
                }
            }
        }
        Ok(group)
    }
}
