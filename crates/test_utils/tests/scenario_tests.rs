//! End-to-end recognition scenarios
//!
//! Whole allocation/reconciliation cycles run against the in-memory
//! adapters: the happy path, partial shipment and invoicing, conversion,
//! exception documents, the legacy proration mode, and per-order
//! serialization.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{AccountId, Currency, LedgerLineId, PeriodId};
use domain_orders::{Invoice, InvoiceKind, InvoiceLine, InvoicingMethod, MoveState, Standing};
use domain_recognition::ports::{LedgerStore, LineFilter};
use domain_recognition::{AllocationStrategy, LedgerLine, LedgerMove, RecognitionError};
use test_utils::{
    assert_move_balanced, assert_no_open_suspense, assert_suspense_balance, init_test_tracing,
    DateFixtures, MoneyFixtures, RecognitionHarness, TestInvoiceBuilder, TestLineBuilder,
    TestOrderBuilder, UNITS,
};

#[test]
fn full_flow_clears_suspense_once_invoiced() {
    init_test_tracing();
    let harness = RecognitionHarness::new();
    let config = harness.config().unwrap();

    // One line, 10 @ 5.00, one shipment of 10 done, no invoice yet.
    let line = TestLineBuilder::new().shipped(dec!(10)).build();
    let line_id = line.id;
    let revenue_account = line.revenue_account().unwrap();
    let mut order = TestOrderBuilder::new().for_company(harness.company).with_line(line).sent().build();

    let move_id = harness
        .allocate(&order, &config)
        .unwrap()
        .expect("allocation should post");

    let posted = harness.ledger.move_by_id(move_id).unwrap();
    assert_move_balanced(&posted);
    let suspense_line = posted.lines.iter().find(|l| l.account == config.suspense_account).unwrap();
    let revenue_line = posted.lines.iter().find(|l| l.account == revenue_account).unwrap();
    assert_eq!(suspense_line.debit.amount(), dec!(50.00));
    assert_eq!(revenue_line.credit.amount(), dec!(50.00));
    assert_suspense_balance(&harness, order.id, dec!(50.00));

    // The invoice for 10 @ 5.00 posts; reconciliation clears everything.
    order.invoices.push(
        TestInvoiceBuilder::new()
            .billing(line_id, dec!(10), UNITS.piece.id, MoneyFixtures::usd(dec!(50.00)))
            .build(),
    );

    let outcome = harness
        .reconcile(&order, &config)
        .unwrap()
        .expect("reconciliation should happen");
    assert_eq!(outcome.groups.len(), 1);

    let reconciliation_move = harness.ledger.move_by_id(outcome.move_id.unwrap()).unwrap();
    assert_move_balanced(&reconciliation_move);

    assert_suspense_balance(&harness, order.id, Decimal::ZERO);
    assert_no_open_suspense(&harness, order.id);
}

#[test]
fn partial_shipment_posts_only_the_delta() {
    init_test_tracing();
    let harness = RecognitionHarness::new();
    let config = harness.config().unwrap();

    let line = TestLineBuilder::new().shipped(dec!(4)).build();
    let mut order = TestOrderBuilder::new().for_company(harness.company).with_line(line).build();

    harness.allocate(&order, &config).unwrap().unwrap();
    assert_suspense_balance(&harness, order.id, dec!(20.00));

    // The remaining 6 ship later; only 30.00 more is posted.
    let product = order.lines[0].product.clone().unwrap();
    let uom = order.lines[0].uom;
    order.lines[0]
        .moves
        .push(domain_orders::ShipmentMove::new(product, dec!(6), uom).done());

    let second = harness.allocate(&order, &config).unwrap().unwrap();
    let posted = harness.ledger.move_by_id(second).unwrap();
    let suspense_line = posted.lines.iter().find(|l| l.account == config.suspense_account).unwrap();
    assert_eq!(suspense_line.debit.amount(), dec!(30.00));
    assert_suspense_balance(&harness, order.id, dec!(50.00));
}

#[test]
fn allocation_is_idempotent() {
    init_test_tracing();
    let harness = RecognitionHarness::new();
    let config = harness.config().unwrap();

    let order = TestOrderBuilder::new()
        .for_company(harness.company)
        .with_line(TestLineBuilder::new().shipped(dec!(10)).build())
        .build();

    assert!(harness.allocate(&order, &config).unwrap().is_some());
    assert!(harness.allocate(&order, &config).unwrap().is_none());
    assert!(harness.allocate(&order, &config).unwrap().is_none());
    assert_eq!(harness.ledger.move_count(), 1);
}

#[test]
fn missing_suspense_account_aborts_before_any_posting() {
    init_test_tracing();
    let mut harness = RecognitionHarness::new();
    harness.settings = infra_mem::MemorySettings::new(); // wipe the configuration

    let err = harness.config().unwrap_err();
    assert!(matches!(err, RecognitionError::MissingSuspenseAccount { .. }));
    assert_eq!(harness.ledger.move_count(), 0);
}

#[test]
fn shipments_in_other_units_convert_to_the_line_unit() {
    init_test_tracing();
    let harness = RecognitionHarness::new();
    let config = harness.config().unwrap();

    // 24 pieces ordered at 1.00 each, shipped as 2 dozen.
    let line = TestLineBuilder::new()
        .quantity(dec!(24))
        .priced(MoneyFixtures::usd(dec!(1.00)))
        .shipped_in(dec!(2), UNITS.dozen.id)
        .build();
    let order = TestOrderBuilder::new().for_company(harness.company).with_line(line).build();

    harness.allocate(&order, &config).unwrap().unwrap();
    assert_suspense_balance(&harness, order.id, dec!(24.00));
}

#[test]
fn cross_currency_orders_post_in_the_company_currency() {
    init_test_tracing();
    let harness = RecognitionHarness::new().with_rate(Currency::EUR, Currency::USD, dec!(1.1));
    let config = harness.config().unwrap();

    // Priced in EUR, posted in USD: 10 @ 5.00 EUR = 55.00 USD.
    let line = TestLineBuilder::new()
        .priced(MoneyFixtures::eur(dec!(5.00)))
        .shipped(dec!(10))
        .build();
    let line_id = line.id;
    let mut order = TestOrderBuilder::new()
        .for_company(harness.company)
        .in_currency(Currency::EUR)
        .with_line(line)
        .sent()
        .build();

    harness.allocate(&order, &config).unwrap().unwrap();
    assert_suspense_balance(&harness, order.id, dec!(55.00));

    order.invoices.push(
        TestInvoiceBuilder::new()
            .in_currency(Currency::EUR)
            .billing(line_id, dec!(10), UNITS.piece.id, MoneyFixtures::eur(dec!(50.00)))
            .build(),
    );

    harness.reconcile(&order, &config).unwrap().unwrap();
    assert_suspense_balance(&harness, order.id, Decimal::ZERO);
    assert_no_open_suspense(&harness, order.id);
}

#[test]
fn credit_notes_reopen_part_of_the_pending_balance() {
    init_test_tracing();
    let harness = RecognitionHarness::new();
    let config = harness.config().unwrap();

    let line = TestLineBuilder::new().shipped(dec!(10)).build();
    let line_id = line.id;
    let mut order = TestOrderBuilder::new().for_company(harness.company).with_line(line).sent().build();

    harness.allocate(&order, &config).unwrap().unwrap();

    // Billed in full, then 20.00 credited back: net invoiced is 30.00.
    order.invoices.push(
        TestInvoiceBuilder::new()
            .billing(line_id, dec!(10), UNITS.piece.id, MoneyFixtures::usd(dec!(50.00)))
            .build(),
    );
    order.invoices.push(
        TestInvoiceBuilder::new()
            .credit_note()
            .billing(line_id, dec!(4), UNITS.piece.id, MoneyFixtures::usd(dec!(20.00)))
            .build(),
    );

    harness.reconcile(&order, &config).unwrap().unwrap();

    // fulfilled 50.00 - net invoiced 30.00 = 20.00 stays pending
    assert_suspense_balance(&harness, order.id, dec!(20.00));
    let open = harness
        .ledger
        .search_lines(
            &LineFilter::new()
                .from_origin(order.id)
                .on_account(config.suspense_account)
                .unreconciled(),
        )
        .unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].signed().amount(), dec!(20.00));
}

#[test]
fn superseded_invoices_are_excluded_from_matching() {
    init_test_tracing();
    let harness = RecognitionHarness::new();
    let config = harness.config().unwrap();

    let line = TestLineBuilder::new().shipped(dec!(10)).build();
    let line_id = line.id;
    let mut order = TestOrderBuilder::new().for_company(harness.company).with_line(line).sent().build();

    harness.allocate(&order, &config).unwrap().unwrap();

    // A posted invoice that was since superseded must not reconcile.
    let replacement = Invoice::new(InvoiceKind::Invoice, Currency::USD, DateFixtures::invoice_date());
    let mut superseded = TestInvoiceBuilder::new()
        .billing(line_id, dec!(10), UNITS.piece.id, MoneyFixtures::usd(dec!(50.00)))
        .build();
    superseded = superseded.with_standing(Standing::Superseded(replacement.id));
    order.invoices.push(superseded);
    order.invoices.push(replacement); // draft replacement

    let outcome = harness.reconcile(&order, &config).unwrap();
    assert!(outcome.is_none());
    assert_suspense_balance(&harness, order.id, dec!(50.00));
}

#[test]
fn ignored_shipments_still_count_as_fulfilled() {
    init_test_tracing();
    let harness = RecognitionHarness::new();
    let config = harness.config().unwrap();

    // 6 shipped normally; a 4-piece shipment failed, was cancelled, and the
    // discrepancy was ignored. The business treats all 10 as fulfilled.
    let line = TestLineBuilder::new().shipped(dec!(6)).pending(dec!(4)).build();
    let mut order = TestOrderBuilder::new().for_company(harness.company).with_line(line).build();
    order.lines[0].moves[1].state = MoveState::Cancelled;
    order.lines[0].moves[1].standing = Standing::Ignored;

    harness.allocate(&order, &config).unwrap().unwrap();
    assert_suspense_balance(&harness, order.id, dec!(50.00));
}

#[test]
fn service_runs_the_whole_lifecycle() {
    init_test_tracing();
    let harness = RecognitionHarness::new();
    let config = harness.config().unwrap();
    let service = harness.service();

    let line = TestLineBuilder::new().shipped(dec!(10)).build();
    let line_id = line.id;
    let mut order = TestOrderBuilder::new().for_company(harness.company).with_line(line).build();

    // Processing while only shipped: allocation, no reconciliation yet.
    let outcome = service.on_order_processing(&order, &config, harness.as_of()).unwrap();
    assert!(outcome.allocation.is_some());
    assert!(outcome.reconciliation.is_none());

    // The invoice posts; the invoice event reconciles incrementally.
    order.invoices.push(
        TestInvoiceBuilder::new()
            .billing(line_id, dec!(10), UNITS.piece.id, MoneyFixtures::usd(dec!(50.00)))
            .build(),
    );
    let reconciliation = service
        .on_invoice_event(&order, &config, harness.as_of())
        .unwrap()
        .expect("the posted invoice should reconcile");
    assert_eq!(reconciliation.groups.len(), 1);
    assert_suspense_balance(&harness, order.id, Decimal::ZERO);

    // Redelivering both events changes nothing.
    let replay = service.on_order_processing(&order, &config, harness.as_of()).unwrap();
    assert!(replay.allocation.is_none());
    assert!(service.on_invoice_event(&order, &config, harness.as_of()).unwrap().is_none());
}

#[test]
fn on_order_invoicing_methods_never_touch_the_suspense_account() {
    init_test_tracing();
    let harness = RecognitionHarness::new();
    let config = harness.config().unwrap();

    let order = TestOrderBuilder::new()
        .for_company(harness.company)
        .invoiced(InvoicingMethod::OnOrder)
        .with_line(TestLineBuilder::new().shipped(dec!(10)).build())
        .build();

    let outcome = harness
        .service()
        .on_order_processing(&order, &config, harness.as_of())
        .unwrap();
    assert!(outcome.allocation.is_none());
    assert_eq!(harness.ledger.move_count(), 0);
}

#[test]
fn unposted_quantity_decreases_as_invoices_post() {
    init_test_tracing();
    let harness = RecognitionHarness::new();

    let mut line = TestLineBuilder::new().shipped(dec!(10)).build();
    let line_id = line.id;
    let uom = line.uom;

    let first_bill = InvoiceLine::new(dec!(4), uom, MoneyFixtures::usd(dec!(20.00))).for_order_line(line_id);
    let second_bill = InvoiceLine::new(dec!(6), uom, MoneyFixtures::usd(dec!(30.00))).for_order_line(line_id);
    line.moves[0].link_invoice_line(first_bill.id);
    line.moves[0].link_invoice_line(second_bill.id);

    let mut order = TestOrderBuilder::new().for_company(harness.company).with_line(line).build();
    let line_ref = |o: &domain_orders::Order| o.lines[0].clone();

    let unposted = |o: &domain_orders::Order| {
        domain_recognition::unposted_fulfilled_quantity(o, &line_ref(o), &harness.units).unwrap()
    };
    assert_eq!(unposted(&order), dec!(10));

    order.invoices.push(
        Invoice::new(InvoiceKind::Invoice, Currency::USD, DateFixtures::invoice_date())
            .with_line(first_bill)
            .post(),
    );
    assert_eq!(unposted(&order), dec!(6));

    order.invoices.push(
        Invoice::new(InvoiceKind::Invoice, Currency::USD, DateFixtures::invoice_date())
            .with_line(second_bill)
            .post(),
    );
    assert_eq!(unposted(&order), dec!(0));
}

#[test]
fn legacy_proration_refuses_drifting_rounding() {
    init_test_tracing();
    let harness = RecognitionHarness::new();
    let config = harness.config().unwrap().with_strategy(AllocationStrategy::Prorated);

    // Two revenue accounts at 0.15 each.
    let line_a = TestLineBuilder::new()
        .quantity(dec!(1))
        .priced(MoneyFixtures::usd(dec!(0.15)))
        .shipped(dec!(1))
        .build();
    let line_b = TestLineBuilder::new()
        .quantity(dec!(1))
        .priced(MoneyFixtures::usd(dec!(0.15)))
        .shipped(dec!(1))
        .build();
    let order = TestOrderBuilder::new()
        .for_company(harness.company)
        .with_line(line_a)
        .with_line(line_b)
        .build();

    // Seed 0.27 of prior suspense so the remaining delta is 0.03 and each
    // prorated share lands on a half-cent.
    let seeded = LedgerMove::new(
        order.id,
        PeriodId::new(),
        None,
        harness.as_of(),
        vec![
            LedgerLine::debit(config.suspense_account, MoneyFixtures::usd(dec!(0.27))),
            LedgerLine::credit(AccountId::new(), MoneyFixtures::usd(dec!(0.27))),
        ],
    );
    let seeded_id = harness.ledger.save(seeded).unwrap();
    harness.ledger.post(&[seeded_id]).unwrap();

    // 0.03 × (0.15 / 0.30) = 0.015 per account; both round to 0.02 and the
    // move drifts by one cent. The engine must refuse, never coerce.
    let err = harness.allocate(&order, &config).unwrap_err();
    match err {
        RecognitionError::UnbalancedMove { debits, credits, .. } => {
            let drift = (debits - credits).abs();
            assert!(drift > Decimal::ZERO);
            // bound: at most one minimal unit per revenue account
            assert!(drift <= dec!(0.01) * Decimal::from(2u32));
        }
        other => panic!("expected UnbalancedMove, got {other:?}"),
    }
}

#[test]
fn legacy_proration_posts_when_shares_divide_exactly() {
    init_test_tracing();
    let harness = RecognitionHarness::new();
    let config = harness.config().unwrap().with_strategy(AllocationStrategy::Prorated);

    let line_a = TestLineBuilder::new()
        .quantity(dec!(1))
        .priced(MoneyFixtures::usd(dec!(0.15)))
        .shipped(dec!(1))
        .build();
    let line_b = TestLineBuilder::new()
        .quantity(dec!(1))
        .priced(MoneyFixtures::usd(dec!(0.15)))
        .shipped(dec!(1))
        .build();
    let order = TestOrderBuilder::new()
        .for_company(harness.company)
        .with_line(line_a)
        .with_line(line_b)
        .build();

    // First pass: delta equals the total, shares are exact.
    let move_id = harness.allocate(&order, &config).unwrap().unwrap();
    let posted = harness.ledger.move_by_id(move_id).unwrap();
    assert_move_balanced(&posted);
    assert_suspense_balance(&harness, order.id, dec!(0.30));
}

#[test]
fn concurrent_cycles_for_one_order_are_serialized() {
    init_test_tracing();
    let harness = RecognitionHarness::new();
    let config = harness.config().unwrap();

    let order = TestOrderBuilder::new()
        .for_company(harness.company)
        .with_line(TestLineBuilder::new().shipped(dec!(10)).build())
        .build();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                harness.ledger.serialize_order(order.id, || {
                    harness.allocate(&order, &config).unwrap();
                });
            });
        }
    });

    // Serialized cycles: the first posts, the other three observe the
    // posted amount and no-op.
    assert_eq!(harness.ledger.move_count(), 1);
    assert_suspense_balance(&harness, order.id, dec!(50.00));
}

#[test]
fn different_orders_proceed_independently() {
    init_test_tracing();
    let harness = RecognitionHarness::new();
    let config = harness.config().unwrap();

    let order_a = TestOrderBuilder::new()
        .for_company(harness.company)
        .with_line(TestLineBuilder::new().shipped(dec!(10)).build())
        .build();
    let order_b = TestOrderBuilder::new()
        .for_company(harness.company)
        .with_line(TestLineBuilder::new().shipped(dec!(2)).build())
        .build();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            harness.ledger.serialize_order(order_a.id, || {
                harness.allocate(&order_a, &config).unwrap();
            });
        });
        scope.spawn(|| {
            harness.ledger.serialize_order(order_b.id, || {
                harness.allocate(&order_b, &config).unwrap();
            });
        });
    });

    assert_eq!(harness.ledger.move_count(), 2);
    assert_suspense_balance(&harness, order_a.id, dec!(50.00));
    assert_suspense_balance(&harness, order_b.id, dec!(10.00));
}

#[test]
fn reconciliation_groups_preserve_line_identity() {
    init_test_tracing();
    let harness = RecognitionHarness::new();
    let config = harness.config().unwrap();

    let line = TestLineBuilder::new().shipped(dec!(10)).build();
    let line_id = line.id;
    let mut order = TestOrderBuilder::new().for_company(harness.company).with_line(line).sent().build();

    let allocation_move = harness.allocate(&order, &config).unwrap().unwrap();
    let allocation_suspense: Vec<LedgerLineId> = harness
        .ledger
        .move_by_id(allocation_move)
        .unwrap()
        .lines
        .iter()
        .filter(|l| l.account == config.suspense_account)
        .map(|l| l.id)
        .collect();

    order.invoices.push(
        TestInvoiceBuilder::new()
            .billing(line_id, dec!(10), UNITS.piece.id, MoneyFixtures::usd(dec!(50.00)))
            .build(),
    );
    let outcome = harness.reconcile(&order, &config).unwrap().unwrap();
    let group = outcome.groups[0];

    // The original allocation line ended up in the marked group.
    let grouped = harness
        .ledger
        .search_lines(&LineFilter::new().from_origin(order.id).on_account(config.suspense_account))
        .unwrap();
    let original = grouped.iter().find(|l| l.id == allocation_suspense[0]).unwrap();
    assert_eq!(original.reconciliation, Some(group));

    // And the group's signed total is exactly zero.
    let total: Decimal = grouped
        .iter()
        .filter(|l| l.reconciliation == Some(group))
        .map(|l| l.signed().amount())
        .sum();
    assert_eq!(total, Decimal::ZERO);
}
