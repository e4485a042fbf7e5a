//! Unit-of-measure quantity conversion
//!
//! Quantities move between units (pieces, dozens, kilograms, ...) through a
//! per-category base unit: converting `q` from unit `a` to unit `b` yields
//! `q × a.factor / b.factor`, rounded to `b`'s declared rounding step.
//! Units of different categories never convert into each other.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identifiers::UomId;

/// Physical category of a unit of measure
///
/// Conversion is only defined within a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UomCategory {
    Unit,
    Weight,
    Length,
    Volume,
    Time,
}

/// Errors that can occur during quantity operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
    #[error("Cannot convert between unit categories {from:?} and {to:?}")]
    CategoryMismatch { from: UomCategory, to: UomCategory },

    #[error("Unit of measure has a zero conversion factor: {0}")]
    ZeroFactor(String),

    #[error("Unit of measure has a non-positive rounding step: {0}")]
    InvalidRounding(String),
}

/// A unit of measure with its conversion factor to the category base unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOfMeasure {
    /// Unique identifier
    pub id: UomId,
    /// Human-readable name (e.g. "Dozen")
    pub name: String,
    /// Short symbol (e.g. "dz")
    pub symbol: String,
    /// Category this unit belongs to
    pub category: UomCategory,
    /// Multiplier to the category base unit (base unit has factor 1)
    pub factor: Decimal,
    /// Smallest representable step in this unit (e.g. 0.01)
    pub rounding: Decimal,
}

impl UnitOfMeasure {
    /// Creates a new unit of measure
    pub fn new(
        id: UomId,
        name: impl Into<String>,
        symbol: impl Into<String>,
        category: UomCategory,
        factor: Decimal,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            symbol: symbol.into(),
            category,
            factor,
            rounding: dec!(0.01),
        }
    }

    /// Sets the rounding step
    pub fn with_rounding(mut self, rounding: Decimal) -> Self {
        self.rounding = rounding;
        self
    }

    /// Converts a quantity expressed in this unit into `target`
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::CategoryMismatch` when the units belong to
    /// different categories, `ZeroFactor`/`InvalidRounding` on a
    /// misconfigured unit.
    pub fn convert(&self, quantity: Decimal, target: &UnitOfMeasure) -> Result<Decimal, QuantityError> {
        if self.category != target.category {
            return Err(QuantityError::CategoryMismatch {
                from: self.category,
                to: target.category,
            });
        }
        if self.factor.is_zero() || target.factor.is_zero() {
            let unit = if self.factor.is_zero() { &self.name } else { &target.name };
            return Err(QuantityError::ZeroFactor(unit.clone()));
        }
        if target.rounding <= Decimal::ZERO {
            return Err(QuantityError::InvalidRounding(target.name.clone()));
        }

        let raw = quantity * self.factor / target.factor;
        Ok(round_to_step(raw, target.rounding))
    }
}

/// Rounds a value to the nearest multiple of `step`
fn round_to_step(value: Decimal, step: Decimal) -> Decimal {
    (value / step).round() * step
}
