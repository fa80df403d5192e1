//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the ledger. The identifiers are
//! deterministic so failures are reproducible.

use chrono::NaiveDate;
use core_kernel::{AccountId, ReportWindow, TenantContext, TenantId};
use domain_ledger::{Account, AccountType};
use uuid::Uuid;

fn fixed_uuid(suffix: u16) -> Uuid {
    Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440000 + suffix as u128)
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// The tenant most fixtures belong to
    pub fn tenant_id() -> TenantId {
        TenantId::from_uuid(fixed_uuid(1))
    }

    /// A second tenant for isolation tests
    pub fn other_tenant_id() -> TenantId {
        TenantId::from_uuid(fixed_uuid(2))
    }

    pub fn cash_account_id() -> AccountId {
        AccountId::from_uuid(fixed_uuid(101))
    }

    pub fn receivables_account_id() -> AccountId {
        AccountId::from_uuid(fixed_uuid(102))
    }

    pub fn payables_account_id() -> AccountId {
        AccountId::from_uuid(fixed_uuid(201))
    }

    pub fn capital_account_id() -> AccountId {
        AccountId::from_uuid(fixed_uuid(301))
    }

    pub fn sales_account_id() -> AccountId {
        AccountId::from_uuid(fixed_uuid(401))
    }

    pub fn rent_account_id() -> AccountId {
        AccountId::from_uuid(fixed_uuid(501))
    }
}

/// Fixture for report dates
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Shorthand for a calendar date
    ///
    /// # Panics
    ///
    /// Panics on an invalid date
    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    /// Start of the standard report window (Jan 1, 2024)
    pub fn from_date() -> NaiveDate {
        Self::date(2024, 1, 1)
    }

    /// End of the standard report window (Jun 30, 2024)
    pub fn as_of_date() -> NaiveDate {
        Self::date(2024, 6, 30)
    }

    /// The first half of 2024
    pub fn report_window() -> ReportWindow {
        ReportWindow::new(Self::from_date(), Self::as_of_date()).unwrap()
    }

    /// A date that falls in the opening balance
    pub fn before_window() -> NaiveDate {
        Self::date(2023, 12, 15)
    }

    /// A date inside the window
    pub fn mid_window() -> NaiveDate {
        Self::date(2024, 3, 15)
    }

    /// A date after the as-of date
    pub fn after_window() -> NaiveDate {
        Self::date(2024, 7, 15)
    }
}

/// Fixture for the chart of accounts
///
/// One postable account per account type, plus a receivables account and
/// two accounts that never appear in a report.
pub struct AccountFixtures;

impl AccountFixtures {
    pub fn cash() -> Account {
        Account::new(IdFixtures::cash_account_id(), "1001", "Cash", AccountType::Asset)
            .with_arabic_name("النقدية")
    }

    pub fn receivables() -> Account {
        Account::new(
            IdFixtures::receivables_account_id(),
            "1200",
            "Accounts Receivable",
            AccountType::Asset,
        )
        .with_arabic_name("الذمم المدينة")
    }

    pub fn payables() -> Account {
        Account::new(
            IdFixtures::payables_account_id(),
            "2001",
            "Accounts Payable",
            AccountType::Liability,
        )
        .with_arabic_name("الذمم الدائنة")
    }

    pub fn capital() -> Account {
        Account::new(IdFixtures::capital_account_id(), "3001", "Share Capital", AccountType::Equity)
            .with_arabic_name("رأس المال")
    }

    pub fn sales() -> Account {
        Account::new(IdFixtures::sales_account_id(), "4001", "Sales", AccountType::Revenue)
            .with_arabic_name("المبيعات")
    }

    pub fn rent_expense() -> Account {
        Account::new(IdFixtures::rent_account_id(), "5001", "Rent", AccountType::Expense)
            .with_arabic_name("الإيجار")
    }

    /// A grouping account that does not allow posting
    pub fn header() -> Account {
        Account::new(AccountId::from_uuid(fixed_uuid(100)), "1000", "Current Assets", AccountType::Asset)
            .as_header()
    }

    /// A closed account
    pub fn inactive() -> Account {
        let mut account =
            Account::new(AccountId::from_uuid(fixed_uuid(199)), "1999", "Old Bank", AccountType::Asset);
        account.deactivate();
        account
    }

    /// Every postable account, ordered by code
    pub fn chart() -> Vec<Account> {
        vec![
            Self::cash(),
            Self::receivables(),
            Self::payables(),
            Self::capital(),
            Self::sales(),
            Self::rent_expense(),
        ]
    }
}

/// Fixture for tenant contexts
pub struct ContextFixtures;

impl ContextFixtures {
    pub fn tenant() -> TenantContext {
        TenantContext::new(IdFixtures::tenant_id()).initiated_by("test-user")
    }

    pub fn other_tenant() -> TenantContext {
        TenantContext::new(IdFixtures::other_tenant_id()).initiated_by("test-user")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_is_reportable_and_ordered() {
        let chart = AccountFixtures::chart();

        assert!(chart.iter().all(|a| a.is_reportable()));
        assert!(chart.windows(2).all(|pair| pair[0].code < pair[1].code));
        assert!(!AccountFixtures::header().is_reportable());
        assert!(!AccountFixtures::inactive().is_reportable());
    }

    #[test]
    fn test_fixture_dates_straddle_window() {
        let window = TemporalFixtures::report_window();

        assert!(TemporalFixtures::before_window() < window.from_date());
        assert!(TemporalFixtures::after_window() > window.as_of_date());
        assert_ne!(IdFixtures::tenant_id(), IdFixtures::other_tenant_id());
    }
}
