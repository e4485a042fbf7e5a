//! Analytic mirror
//!
//! Revenue-account ledger lines are optionally mirrored onto analytic
//! (cost-center) entries. Each configured analytic account receives a full
//! copy of the mirrored debit/credit; no weighting or splitting is applied.
//! Mirroring is pure construction and can never block the primary posting.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{AnalyticAccountId, JournalId, Money, PartyId};

use crate::ledger::LedgerLine;

/// An analytic (cost-center) entry mirroring a ledger line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticEntry {
    /// Unique entry identifier
    pub id: Uuid,
    /// Analytic account the copy goes to
    pub account: AnalyticAccountId,
    /// Mirrored debit
    pub debit: Money,
    /// Mirrored credit
    pub credit: Money,
    /// Accounting date of the mirrored line
    pub date: NaiveDate,
    /// Journal of the mirrored line
    pub journal: Option<JournalId>,
    /// Party of the mirrored line
    pub party: Option<PartyId>,
}

/// Mirrors a revenue-account line onto every configured analytic account
///
/// Each account receives 100% of the line's debit/credit. Returns an empty
/// vector when the originating order line declares no analytic accounts.
pub fn mirror_revenue_line(
    line: &LedgerLine,
    accounts: &[AnalyticAccountId],
    date: NaiveDate,
    journal: Option<JournalId>,
) -> Vec<AnalyticEntry> {
    accounts
        .iter()
        .map(|account| AnalyticEntry {
            id: Uuid::new_v4(),
            account: *account,
            debit: line.debit,
            credit: line.credit,
            date,
            journal,
            party: line.party,
        })
        .collect()
}
