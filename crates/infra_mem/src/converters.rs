//! Conversion adapters
//!
//! A unit registry resolving `UomId`s to their `UnitOfMeasure` definitions,
//! and a fixed-rate currency table. Both round to the target's declared
//! precision, as the port contracts require.

use std::collections::HashMap;

use rust_decimal::Decimal;

use core_kernel::{Currency, Money, UnitOfMeasure, UomId};
use domain_recognition::ports::{ConversionError, CurrencyConverter, UnitConverter};

/// Registry of known units of measure
#[derive(Debug, Default)]
pub struct UomRegistry {
    units: HashMap<UomId, UnitOfMeasure>,
}

impl UomRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a unit, replacing any previous definition with the same id
    pub fn register(mut self, unit: UnitOfMeasure) -> Self {
        self.units.insert(unit.id, unit);
        self
    }

    /// Looks up a unit definition
    pub fn get(&self, id: UomId) -> Option<&UnitOfMeasure> {
        self.units.get(&id)
    }
}

impl UnitConverter for UomRegistry {
    fn convert(&self, quantity: Decimal, from: UomId, to: UomId) -> Result<Decimal, ConversionError> {
        let from = self.get(from).ok_or(ConversionError::UnknownUnit(from))?;
        let to = self.get(to).ok_or(ConversionError::UnknownUnit(to))?;
        Ok(from.convert(quantity, to)?)
    }
}

/// Currency conversion over a fixed exchange-rate table
///
/// Identity conversions always succeed; any other pair needs an explicit
/// rate. Results are rounded to the target currency's precision.
#[derive(Debug, Default)]
pub struct FixedRateCurrencies {
    rates: HashMap<(Currency, Currency), Decimal>,
}

impl FixedRateCurrencies {
    /// Creates a table without any rates
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a one-directional rate: `1 from = rate × to`
    pub fn with_rate(mut self, from: Currency, to: Currency, rate: Decimal) -> Self {
        self.rates.insert((from, to), rate);
        self
    }
}

impl CurrencyConverter for FixedRateCurrencies {
    fn convert(&self, amount: Money, to: Currency) -> Result<Money, ConversionError> {
        if amount.currency() == to {
            return Ok(amount.round_to_currency());
        }
        let rate = self
            .rates
            .get(&(amount.currency(), to))
            .ok_or(ConversionError::MissingRate {
                from: amount.currency(),
                to,
            })?;
        Ok(Money::new(amount.amount() * rate, to).round_to_currency())
    }
}
