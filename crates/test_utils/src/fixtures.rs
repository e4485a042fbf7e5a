//! Pre-built Test Fixtures
//!
//! Ready-to-use test data shared across the recognition test suite. The
//! unit-of-measure set is process-wide so order lines, shipment moves and
//! the registry agree on ids.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, UnitOfMeasure, UomCategory, UomId};
use infra_mem::UomRegistry;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Standard USD amount
    pub fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    /// The canonical unit price of the scenario suite: 5.00 USD
    pub fn usd_unit_price() -> Money {
        Money::new(dec!(5.00), Currency::USD)
    }

    /// EUR amount for multi-currency scenarios
    pub fn eur(amount: Decimal) -> Money {
        Money::new(amount, Currency::EUR)
    }

    /// Zero USD
    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }
}

/// Fixture for temporal test data
pub struct DateFixtures;

impl DateFixtures {
    /// The accounting date used by the scenario suite
    pub fn accounting_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()
    }

    /// An invoice date later in the same period
    pub fn invoice_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 20).unwrap()
    }
}

/// The process-wide standard unit set
pub struct StandardUnits {
    pub piece: UnitOfMeasure,
    pub dozen: UnitOfMeasure,
    pub kilogram: UnitOfMeasure,
    pub gram: UnitOfMeasure,
}

impl StandardUnits {
    fn build() -> Self {
        Self {
            piece: UnitOfMeasure::new(UomId::new(), "Piece", "pc", UomCategory::Unit, dec!(1))
                .with_rounding(dec!(1)),
            dozen: UnitOfMeasure::new(UomId::new(), "Dozen", "dz", UomCategory::Unit, dec!(12))
                .with_rounding(dec!(0.01)),
            kilogram: UnitOfMeasure::new(
                UomId::new(),
                "Kilogram",
                "kg",
                UomCategory::Weight,
                dec!(1),
            ),
            gram: UnitOfMeasure::new(UomId::new(), "Gram", "g", UomCategory::Weight, dec!(0.001))
                .with_rounding(dec!(1)),
        }
    }

    /// A registry containing the full standard set
    pub fn registry(&self) -> UomRegistry {
        UomRegistry::new()
            .register(self.piece.clone())
            .register(self.dozen.clone())
            .register(self.kilogram.clone())
            .register(self.gram.clone())
    }
}

/// Standard units, initialized once per process
pub static UNITS: Lazy<StandardUnits> = Lazy::new(StandardUnits::build);
