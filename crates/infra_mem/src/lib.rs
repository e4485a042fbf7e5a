//! In-Memory Infrastructure Adapters
//!
//! Reference implementations of the recognition port traits, backed by
//! plain in-process state. They serve two purposes: they are the adapters
//! the test suite runs the engine against, and they document the contract
//! a production adapter (database-backed posting, a real currency service)
//! has to honour: atomic posting, consistent per-order reads, zero-sum
//! reconciliation groups, and per-order serialization.

pub mod ledger;
pub mod converters;
pub mod calendar;
pub mod settings;

pub use ledger::MemoryLedger;
pub use converters::{FixedRateCurrencies, UomRegistry};
pub use calendar::MonthlyCalendar;
pub use settings::MemorySettings;
