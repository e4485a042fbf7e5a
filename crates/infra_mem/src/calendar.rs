//! Accounting calendar adapter
//!
//! Monthly periods resolved on demand, with a configurable
//! books-closed boundary, and a journal table keyed by kind.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Datelike, NaiveDate};

use core_kernel::{CompanyId, JournalId, PeriodId};
use domain_recognition::ledger::JournalKind;
use domain_recognition::ports::{CalendarError, PostingCalendar};

/// Calendar with one period per (company, month)
///
/// Dates before the closed boundary have no open period and fail lookup,
/// mirroring a host ledger that refuses postings into closed periods.
pub struct MonthlyCalendar {
    open_from: NaiveDate,
    journals: HashMap<JournalKind, JournalId>,
    periods: Mutex<HashMap<(CompanyId, i32, u32), PeriodId>>,
}

impl MonthlyCalendar {
    /// Creates a calendar whose periods are open from `open_from` onwards
    pub fn open_from(open_from: NaiveDate) -> Self {
        Self {
            open_from,
            journals: HashMap::new(),
            periods: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a journal for a kind
    pub fn with_journal(mut self, kind: JournalKind, journal: JournalId) -> Self {
        self.journals.insert(kind, journal);
        self
    }
}

impl Default for MonthlyCalendar {
    fn default() -> Self {
        // everything open, one revenue journal
        Self::open_from(NaiveDate::MIN).with_journal(JournalKind::Revenue, JournalId::new())
    }
}

impl PostingCalendar for MonthlyCalendar {
    fn find_period(&self, company: CompanyId, date: NaiveDate) -> Result<PeriodId, CalendarError> {
        if date < self.open_from {
            return Err(CalendarError::NoOpenPeriod { company, date });
        }
        let mut periods = self
            .periods
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let key = (company, date.year(), date.month());
        Ok(*periods.entry(key).or_insert_with(PeriodId::new))
    }

    fn find_journal(&self, kind: JournalKind) -> Option<JournalId> {
        self.journals.get(&kind).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_month_resolves_to_the_same_period() {
        let calendar = MonthlyCalendar::default();
        let company = CompanyId::new();

        let a = calendar.find_period(company, date(2024, 3, 1)).unwrap();
        let b = calendar.find_period(company, date(2024, 3, 31)).unwrap();
        let c = calendar.find_period(company, date(2024, 4, 1)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn companies_have_their_own_periods() {
        let calendar = MonthlyCalendar::default();
        let a = calendar.find_period(CompanyId::new(), date(2024, 3, 1)).unwrap();
        let b = calendar.find_period(CompanyId::new(), date(2024, 3, 1)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn closed_periods_fail_lookup() {
        let calendar = MonthlyCalendar::open_from(date(2024, 1, 1));
        let company = CompanyId::new();

        let err = calendar.find_period(company, date(2023, 12, 31)).unwrap_err();
        assert!(matches!(err, CalendarError::NoOpenPeriod { .. }));
    }

    #[test]
    fn journals_resolve_by_kind() {
        let journal = JournalId::new();
        let calendar =
            MonthlyCalendar::open_from(NaiveDate::MIN).with_journal(JournalKind::Revenue, journal);

        assert_eq!(calendar.find_journal(JournalKind::Revenue), Some(journal));
        assert_eq!(calendar.find_journal(JournalKind::General), None);
    }
}
