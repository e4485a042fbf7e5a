//! Product references
//!
//! The engine never loads full product records; it only needs the handful
//! of accounting attributes a sale line or shipment move derives from its
//! product.

use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, AnalyticAccountId, ProductId};

/// Kind of product on a sale line
///
/// Service products are billed directly and never participate in
/// shipment-based recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Goods,
    Service,
}

/// Accounting view of a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Product identifier
    pub id: ProductId,
    /// Display name
    pub name: String,
    /// Goods or service
    pub kind: ProductKind,
    /// Revenue account postings for this product go to
    pub revenue_account: AccountId,
    /// Analytic (cost-center) accounts mirrored revenue lines are copied to
    pub analytic_accounts: Vec<AnalyticAccountId>,
}

impl ProductRef {
    /// Creates a goods product posting to the given revenue account
    pub fn goods(name: impl Into<String>, revenue_account: AccountId) -> Self {
        Self {
            id: ProductId::new_v7(),
            name: name.into(),
            kind: ProductKind::Goods,
            revenue_account,
            analytic_accounts: Vec::new(),
        }
    }

    /// Creates a service product
    pub fn service(name: impl Into<String>, revenue_account: AccountId) -> Self {
        Self {
            id: ProductId::new_v7(),
            name: name.into(),
            kind: ProductKind::Service,
            revenue_account,
            analytic_accounts: Vec::new(),
        }
    }

    /// Sets the analytic distribution accounts
    pub fn with_analytic_accounts(mut self, accounts: Vec<AnalyticAccountId>) -> Self {
        self.analytic_accounts = accounts;
        self
    }

    /// Returns true when the product ships physical goods
    pub fn is_goods(&self) -> bool {
        matches!(self.kind, ProductKind::Goods)
    }
}
