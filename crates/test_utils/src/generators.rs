//! Property-Based Test Generators
//!
//! Proptest strategies generating random but invariant-respecting domain
//! data for the recognition property tests.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money};
use domain_orders::{Order, OrderLine};

use crate::builders::{TestLineBuilder, TestOrderBuilder};

/// Strategy for generating a supported currency
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::CHF),
        Just(Currency::CAD),
    ]
}

/// Strategy for positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000i64
}

/// Strategy for USD Money values with positive amounts
pub fn positive_usd_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|minor| Money::from_minor(minor, Currency::USD))
}

/// Strategy for whole-piece order quantities
pub fn order_quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..500i64).prop_map(Decimal::from)
}

/// Strategy for one fully shipped order line priced in USD
pub fn shipped_line_strategy() -> impl Strategy<Value = OrderLine> {
    (order_quantity_strategy(), 1i64..10_000i64).prop_map(|(quantity, price_minor)| {
        TestLineBuilder::new()
            .quantity(quantity)
            .priced(Money::from_minor(price_minor, Currency::USD))
            .shipped(quantity)
            .build()
    })
}

/// Strategy for a fully shipped USD order with 1 to 4 lines
pub fn shipped_order_strategy() -> impl Strategy<Value = Order> {
    prop::collection::vec(shipped_line_strategy(), 1..=4).prop_map(|lines| {
        let mut builder = TestOrderBuilder::new().sent();
        for line in lines {
            builder = builder.with_line(line);
        }
        builder.build()
    })
}
