//! Per-company settings adapter
//!
//! The in-memory counterpart of the sale configuration screen: at most one
//! suspense (pending invoice) account per company.

use std::collections::HashMap;

use core_kernel::{AccountId, CompanyId};
use domain_recognition::ports::SettingsStore;

/// In-memory per-company configuration
#[derive(Debug, Default)]
pub struct MemorySettings {
    suspense_accounts: HashMap<CompanyId, AccountId>,
}

impl MemorySettings {
    /// Creates empty settings: no company has a suspense account yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the suspense account of a company
    pub fn with_suspense_account(mut self, company: CompanyId, account: AccountId) -> Self {
        self.suspense_accounts.insert(company, account);
        self
    }
}

impl SettingsStore for MemorySettings {
    fn suspense_account(&self, company: CompanyId) -> Option<AccountId> {
        self.suspense_accounts.get(&company).copied()
    }
}
