//! Custom Test Assertions
//!
//! Specialized assertion helpers for domain types that give more meaningful
//! error messages than bare equality checks.

use rust_decimal::Decimal;

use core_kernel::{Money, OrderId};
use domain_recognition::LedgerMove;

use crate::harness::RecognitionHarness;

/// Asserts that a Money value is exactly zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a Money amount equals the expected decimal
pub fn assert_money_amount(money: &Money, expected: Decimal) {
    assert_eq!(
        money.amount(),
        expected,
        "Money amount mismatch: got {} {}, expected {}",
        money.currency().symbol(),
        money.amount(),
        expected
    );
}

/// Asserts the exact debit/credit identity of a move
pub fn assert_move_balanced(ledger_move: &LedgerMove) {
    assert_eq!(
        ledger_move.debit_total(),
        ledger_move.credit_total(),
        "Move {} is unbalanced: debits={}, credits={}, lines={:#?}",
        ledger_move.id,
        ledger_move.debit_total(),
        ledger_move.credit_total(),
        ledger_move.lines
    );
}

/// Asserts the net suspense balance attributable to an order
pub fn assert_suspense_balance(harness: &RecognitionHarness, order: OrderId, expected: Decimal) {
    let balance = harness.suspense_balance(order);
    assert_eq!(
        balance, expected,
        "Suspense balance for order {} is {}, expected {}",
        order, balance, expected
    );
}

/// Asserts that no suspense line of the order remains outside a
/// reconciliation group
pub fn assert_no_open_suspense(harness: &RecognitionHarness, order: OrderId) {
    use domain_recognition::ports::{LedgerStore, LineFilter};

    let open = harness
        .ledger
        .search_lines(
            &LineFilter::new()
                .from_origin(order)
                .on_account(harness.suspense_account)
                .unreconciled(),
        )
        .expect("ledger search should not fail");
    assert!(
        open.is_empty(),
        "Order {} still has {} open suspense line(s): {:#?}",
        order,
        open.len(),
        open
    );
}
