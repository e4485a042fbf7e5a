//! Wired-up recognition harness
//!
//! Bundles the in-memory adapters behind one value so scenario tests can
//! run whole allocation/reconciliation cycles with two lines of setup.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::{AccountId, CompanyId, Currency, LedgerMoveId, OrderId};
use domain_orders::Order;
use domain_recognition::{
    AllocationEngine, ReconciliationMatcher, ReconciliationOutcome, RecognitionConfig,
    RecognitionError, RecognitionService,
};
use infra_mem::{FixedRateCurrencies, MemoryLedger, MemorySettings, MonthlyCalendar, UomRegistry};

use crate::fixtures::{DateFixtures, UNITS};

/// Everything needed to run the engine end-to-end in tests
pub struct RecognitionHarness {
    pub company: CompanyId,
    pub suspense_account: AccountId,
    pub settings: MemorySettings,
    pub units: UomRegistry,
    pub currencies: FixedRateCurrencies,
    pub calendar: MonthlyCalendar,
    pub ledger: MemoryLedger,
}

impl Default for RecognitionHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl RecognitionHarness {
    /// Creates a harness with the standard units, an empty rate table, an
    /// all-open calendar and a configured suspense account
    pub fn new() -> Self {
        let company = CompanyId::new();
        let suspense_account = AccountId::new();
        Self {
            company,
            suspense_account,
            settings: MemorySettings::new().with_suspense_account(company, suspense_account),
            units: UNITS.registry(),
            currencies: FixedRateCurrencies::new(),
            calendar: MonthlyCalendar::default(),
            ledger: MemoryLedger::new(),
        }
    }

    /// Adds an exchange rate
    pub fn with_rate(mut self, from: Currency, to: Currency, rate: Decimal) -> Self {
        self.currencies = self.currencies.with_rate(from, to, rate);
        self
    }

    /// Resolves the recognition configuration for the harness company
    pub fn config(&self) -> Result<RecognitionConfig, RecognitionError> {
        RecognitionConfig::resolve(self.company, &self.settings)
    }

    /// The service facade over the harness adapters
    pub fn service(&self) -> RecognitionService<'_> {
        RecognitionService::new(&self.units, &self.currencies, &self.calendar, &self.ledger)
    }

    /// The allocation engine over the harness adapters
    pub fn allocator(&self) -> AllocationEngine<'_> {
        AllocationEngine::new(&self.units, &self.currencies, &self.calendar, &self.ledger)
    }

    /// The reconciliation matcher over the harness adapters
    pub fn matcher(&self) -> ReconciliationMatcher<'_> {
        ReconciliationMatcher::new(&self.units, &self.currencies, &self.calendar, &self.ledger)
    }

    /// Runs one allocation cycle at the standard accounting date
    pub fn allocate(
        &self,
        order: &Order,
        config: &RecognitionConfig,
    ) -> Result<Option<LedgerMoveId>, RecognitionError> {
        self.allocator()
            .allocate(order, config, DateFixtures::accounting_date())
    }

    /// Runs one reconciliation cycle at the standard accounting date
    pub fn reconcile(
        &self,
        order: &Order,
        config: &RecognitionConfig,
    ) -> Result<Option<ReconciliationOutcome>, RecognitionError> {
        self.matcher()
            .reconcile(order, config, DateFixtures::accounting_date())
    }

    /// Net suspense balance attributable to an order
    pub fn suspense_balance(&self, order: OrderId) -> Decimal {
        self.ledger
            .account_balance(self.suspense_account, Some(order))
    }

    /// Accounting date used by the convenience runners
    pub fn as_of(&self) -> NaiveDate {
        DateFixtures::accounting_date()
    }
}
