//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::NaiveDate;
use core_kernel::{AccountId, JournalEntryId, TenantId};
use domain_ledger::{
    Account, AccountType, LegacyLine, LineRecord, LineShape, MockLedgerQuery, ModernLine,
    TrialBalanceRow,
};
use rust_decimal::Decimal;

use crate::fixtures::{AccountFixtures, IdFixtures, TemporalFixtures};

/// Builder for a raw journal line as the ledger tables return it
#[derive(Debug, Clone)]
pub struct TestLineBuilder {
    entry_id: Option<JournalEntryId>,
    account_id: AccountId,
    debit: Option<Decimal>,
    credit: Option<Decimal>,
    entry_date: Option<NaiveDate>,
    posting_date: Option<NaiveDate>,
    shape: LineShape,
}

impl TestLineBuilder {
    /// Creates a modern-schema line on `account_id` with no amounts, dated
    /// inside the standard window
    pub fn new(account_id: AccountId) -> Self {
        Self {
            entry_id: Some(JournalEntryId::new()),
            account_id,
            debit: None,
            credit: None,
            entry_date: Some(TemporalFixtures::mid_window()),
            posting_date: None,
            shape: LineShape::Modern,
        }
    }

    /// Sets the debit amount
    pub fn debit(mut self, amount: Decimal) -> Self {
        self.debit = Some(amount);
        self
    }

    /// Sets the credit amount
    pub fn credit(mut self, amount: Decimal) -> Self {
        self.credit = Some(amount);
        self
    }

    /// Sets the entry date
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.entry_date = Some(date);
        self
    }

    /// Sets the posting date
    pub fn posted_on(mut self, date: NaiveDate) -> Self {
        self.posting_date = Some(date);
        self
    }

    /// Removes both dates
    pub fn undated(mut self) -> Self {
        self.entry_date = None;
        self.posting_date = None;
        self
    }

    /// Uses the legacy column layout
    pub fn legacy(mut self) -> Self {
        self.shape = LineShape::Legacy;
        self
    }

    /// Builds the line in its schema shape
    pub fn build(self) -> LineRecord {
        match self.shape {
            LineShape::Modern => LineRecord::Modern(ModernLine {
                entry_id: self.entry_id,
                account_id: self.account_id,
                debit: self.debit,
                credit: self.credit,
                entry_date: self.entry_date,
                posting_date: self.posting_date,
            }),
            LineShape::Legacy => LineRecord::Legacy(LegacyLine {
                entry_id: self.entry_id,
                account_id: self.account_id,
                debit_amount: self.debit,
                credit_amount: self.credit,
                entry_date: self.entry_date,
                posting_date: self.posting_date,
            }),
        }
    }
}

/// Builder for a trial balance row as a balance service would return it
#[derive(Debug, Clone)]
pub struct TestRowBuilder {
    row: TrialBalanceRow,
}

impl Default for TestRowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRowBuilder {
    /// Creates an empty row for the cash account
    pub fn new() -> Self {
        Self::for_account(&AccountFixtures::cash())
    }

    /// Creates an empty row for `account`
    pub fn for_account(account: &Account) -> Self {
        Self {
            row: TrialBalanceRow::for_account(account),
        }
    }

    /// Sets the account code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.row.account_code = code.into();
        self
    }

    /// Sets the account type
    pub fn with_type(mut self, account_type: AccountType) -> Self {
        self.row.account_type = account_type;
        self
    }

    /// Sets the opening columns
    pub fn opening(mut self, debit: Decimal, credit: Decimal) -> Self {
        self.row.opening_debit = debit;
        self.row.opening_credit = credit;
        self
    }

    /// Sets the period columns
    pub fn period(mut self, debit: Decimal, credit: Decimal) -> Self {
        self.row.period_debit = debit;
        self.row.period_credit = credit;
        self
    }

    /// Builds the row with closing columns derived from the others
    pub fn build(mut self) -> TrialBalanceRow {
        self.row.close();
        self.row
    }

    /// Builds the row with explicit closing columns, consistent or not
    pub fn build_with_closing(mut self, debit: Decimal, credit: Decimal) -> TrialBalanceRow {
        self.row.closing_debit = debit;
        self.row.closing_credit = credit;
        self.row
    }
}

/// Builder for an in-memory ledger of one tenant
#[derive(Debug, Clone)]
pub struct TestLedgerBuilder {
    tenant_id: TenantId,
    accounts: Vec<Account>,
    lines: Vec<LineRecord>,
    without_modern_schema: bool,
}

impl Default for TestLedgerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLedgerBuilder {
    /// Creates an empty ledger for the fixture tenant
    pub fn new() -> Self {
        Self {
            tenant_id: IdFixtures::tenant_id(),
            accounts: Vec::new(),
            lines: Vec::new(),
            without_modern_schema: false,
        }
    }

    /// Sets the tenant
    pub fn for_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    /// Uses the full fixture chart of accounts
    pub fn with_fixture_chart(mut self) -> Self {
        self.accounts = AccountFixtures::chart();
        self
    }

    /// Adds an account
    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts.push(account);
        self
    }

    /// Adds a line
    pub fn with_line(mut self, line: TestLineBuilder) -> Self {
        self.lines.push(line.build());
        self
    }

    /// Makes the modern line table unavailable
    pub fn without_modern_schema(mut self) -> Self {
        self.without_modern_schema = true;
        self
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn lines(&self) -> &[LineRecord] {
        &self.lines
    }

    /// Loads the accounts and lines into a mock query port
    pub async fn build(self) -> MockLedgerQuery {
        let mut ledger = MockLedgerQuery::new();
        if self.without_modern_schema {
            ledger = ledger.without_modern_schema();
        }
        ledger
            .with_accounts(self.tenant_id, self.accounts)
            .await
            .with_lines(self.tenant_id, self.lines)
            .await
    }
}

/// The standard worked example: three accounts, three opening lines and
/// five period lines
///
/// Totals are 1000 / 2500 opening, 600 / 1500 period and 1300 / 3700
/// closing. The books are deliberately unbalanced.
pub fn worked_example_ledger() -> TestLedgerBuilder {
    use rust_decimal_macros::dec;

    let cash = IdFixtures::cash_account_id();
    let payables = IdFixtures::payables_account_id();
    let sales = IdFixtures::sales_account_id();
    let date = TemporalFixtures::date;

    TestLedgerBuilder::new()
        .with_account(AccountFixtures::cash())
        .with_account(AccountFixtures::payables())
        .with_account(AccountFixtures::sales())
        .with_line(TestLineBuilder::new(cash).debit(dec!(1000)).on(date(2023, 12, 15)))
        .with_line(TestLineBuilder::new(payables).credit(dec!(500)).on(date(2023, 11, 1)))
        .with_line(TestLineBuilder::new(sales).credit(dec!(2000)).on(date(2023, 10, 20)))
        .with_line(TestLineBuilder::new(cash).debit(dec!(500)).on(date(2024, 3, 1)))
        .with_line(TestLineBuilder::new(cash).credit(dec!(200)).on(date(2024, 3, 2)))
        .with_line(TestLineBuilder::new(payables).debit(dec!(100)).on(date(2024, 4, 1)))
        .with_line(TestLineBuilder::new(payables).credit(dec!(300)).on(date(2024, 4, 2)))
        .with_line(TestLineBuilder::new(sales).credit(dec!(1000)).on(date(2024, 5, 1)))
}
