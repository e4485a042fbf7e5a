//! In-memory ledger store
//!
//! Implements the `LedgerStore` port over a mutex-guarded move list. One
//! lock covers all state, so a posted move becomes visible with all of its
//! lines at once and reconciliation-group assignment is atomic across the
//! group. Per-order pessimistic serialization is offered separately via
//! [`MemoryLedger::serialize_order`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use core_kernel::{AccountId, LedgerLineId, LedgerMoveId, OrderId, ReconciliationId};
use domain_recognition::ledger::{LedgerLine, LedgerMove, MoveStatus};
use domain_recognition::ports::{LedgerError, LedgerStore, LineFilter};

#[derive(Default)]
struct LedgerState {
    moves: Vec<LedgerMove>,
}

/// Mutex-guarded in-memory implementation of the posting subsystem
#[derive(Default)]
pub struct MemoryLedger {
    state: Mutex<LedgerState>,
    order_locks: Mutex<HashMap<OrderId, Arc<Mutex<()>>>>,
}

/// Recovers the guard from a poisoned mutex; the protected state is a
/// plain move list and stays usable after a panicking writer.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryLedger {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the pessimistic lock for one order
    ///
    /// Concurrent cycles for the *same* order are serialized; cycles for
    /// different orders proceed independently. The lock is released when
    /// `f` returns or panics.
    pub fn serialize_order<R>(&self, order: OrderId, f: impl FnOnce() -> R) -> R {
        let order_lock = {
            let mut locks = lock(&self.order_locks);
            Arc::clone(locks.entry(order).or_default())
        };
        let _guard = lock(&order_lock);
        f()
    }

    /// Returns a stored move by id
    pub fn move_by_id(&self, id: LedgerMoveId) -> Option<LedgerMove> {
        lock(&self.state).moves.iter().find(|m| m.id == id).cloned()
    }

    /// Number of stored moves
    pub fn move_count(&self) -> usize {
        lock(&self.state).moves.len()
    }

    /// Net signed balance of an account, optionally restricted to an order
    pub fn account_balance(&self, account: AccountId, origin: Option<OrderId>) -> Decimal {
        lock(&self.state)
            .moves
            .iter()
            .filter(|m| origin.map_or(true, |o| m.origin == o))
            .flat_map(|m| m.lines.iter())
            .filter(|l| l.account == account)
            .map(|l| l.signed().amount())
            .sum()
    }
}

impl LedgerStore for MemoryLedger {
    #[instrument(skip(self))]
    fn search_lines(&self, filter: &LineFilter) -> Result<Vec<LedgerLine>, LedgerError> {
        let state = lock(&self.state);
        let lines: Vec<LedgerLine> = state
            .moves
            .iter()
            .flat_map(|m| {
                m.lines
                    .iter()
                    .filter(|l| filter.matches(m.origin, l))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        debug!(count = lines.len(), "searched ledger lines");
        Ok(lines)
    }

    #[instrument(skip(self, ledger_move), fields(move_id = %ledger_move.id))]
    fn save(&self, ledger_move: LedgerMove) -> Result<LedgerMoveId, LedgerError> {
        let id = ledger_move.id;
        debug!(lines = ledger_move.lines.len(), "saving draft move");
        lock(&self.state).moves.push(ledger_move);
        Ok(id)
    }

    #[instrument(skip(self))]
    fn post(&self, move_ids: &[LedgerMoveId]) -> Result<(), LedgerError> {
        let mut state = lock(&self.state);

        // Validate everything first so a batch posts all-or-nothing.
        for id in move_ids {
            let m = state
                .moves
                .iter()
                .find(|m| m.id == *id)
                .ok_or(LedgerError::MoveNotFound(*id))?;
            if m.status == MoveStatus::Posted {
                return Err(LedgerError::AlreadyPosted(*id));
            }
            if m.lines.is_empty() {
                return Err(LedgerError::EmptyMove(*id));
            }
        }
        for id in move_ids {
            if let Some(m) = state.moves.iter_mut().find(|m| m.id == *id) {
                m.status = MoveStatus::Posted;
            }
        }
        debug!(count = move_ids.len(), "posted moves");
        Ok(())
    }

    #[instrument(skip(self))]
    fn reconcile(&self, line_ids: &[LedgerLineId]) -> Result<ReconciliationId, LedgerError> {
        let mut state = lock(&self.state);

        let mut total = Decimal::ZERO;
        for id in line_ids {
            let (owner, line) = state
                .moves
                .iter()
                .find_map(|m| m.lines.iter().find(|l| l.id == *id).map(|l| (m, l)))
                .ok_or(LedgerError::LineNotFound(*id))?;
            if owner.status != MoveStatus::Posted {
                return Err(LedgerError::UnpostedLine(*id));
            }
            if line.reconciliation.is_some() {
                return Err(LedgerError::AlreadyReconciled(*id));
            }
            total += line.signed().amount();
        }
        if !total.is_zero() {
            return Err(LedgerError::UnbalancedGroup { total });
        }

        let group = ReconciliationId::new_v7();
        for m in state.moves.iter_mut() {
            for line in m.lines.iter_mut() {
                if line_ids.contains(&line.id) {
                    line.reconciliation = Some(group);
                }
            }
        }
        debug!(%group, lines = line_ids.len(), "marked reconciliation group");
        Ok(group)
    }
}
