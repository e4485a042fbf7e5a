//! Core Kernel - Foundational types and utilities for the revenue recognition system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Unit-of-measure quantity conversion
//! - Common identifiers and value objects

pub mod money;
pub mod quantity;
pub mod identifiers;

pub use money::{Money, Currency, MoneyError};
pub use quantity::{UnitOfMeasure, UomCategory, QuantityError};
pub use identifiers::{
    CompanyId, PartyId, ProductId, UomId,
    OrderId, OrderLineId, ShipmentMoveId,
    InvoiceId, InvoiceLineId,
    AccountId, AnalyticAccountId, JournalId, PeriodId,
    LedgerMoveId, LedgerLineId, ReconciliationId,
};
