//! Recognition configuration
//!
//! Configuration is resolved once per company and passed explicitly into
//! every entry point; the engine never reads ambient state. A missing
//! suspense account is a hard configuration error raised before any
//! shipment or invoice is looked at.

use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, CompanyId};

use crate::error::RecognitionError;
use crate::ports::SettingsStore;

/// Strategy the allocation engine uses to distribute the recognition delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// One suspense/revenue pair per order line; exact by construction.
    /// The canonical strategy.
    #[default]
    PerLine,
    /// Single order-level suspense line with revenue amounts prorated by
    /// account share. Kept for compatibility with historical postings;
    /// per-account rounding can drift by up to one minimal currency unit
    /// per account, which the balance guard refuses rather than coerces.
    Prorated,
}

/// Resolved per-company configuration for one recognition cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Company the cycle runs for
    pub company: CompanyId,
    /// The pending-invoice (suspense) clearing account
    pub suspense_account: AccountId,
    /// Allocation strategy
    pub strategy: AllocationStrategy,
}

impl RecognitionConfig {
    /// Resolves the configuration for a company
    ///
    /// # Errors
    ///
    /// `RecognitionError::MissingSuspenseAccount` when no suspense account
    /// is configured for the company.
    pub fn resolve(
        company: CompanyId,
        settings: &dyn SettingsStore,
    ) -> Result<Self, RecognitionError> {
        let suspense_account = settings
            .suspense_account(company)
            .ok_or(RecognitionError::MissingSuspenseAccount { company })?;

        Ok(Self {
            company,
            suspense_account,
            strategy: AllocationStrategy::default(),
        })
    }

    /// Overrides the allocation strategy
    pub fn with_strategy(mut self, strategy: AllocationStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}
