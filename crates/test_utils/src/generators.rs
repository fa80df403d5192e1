//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::{Duration, NaiveDate};
use core_kernel::{AccountId, ReportWindow};
use domain_ledger::{Account, AccountType, TrialBalanceRow};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::builders::TestRowBuilder;

/// Strategy for generating account types
pub fn account_type_strategy() -> impl Strategy<Value = AccountType> {
    prop::sample::select(AccountType::ALL.to_vec())
}

/// Strategy for generating non-negative amounts with two decimal places
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for generating dates in 2023 and 2024
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..731).prop_map(|days| {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + Duration::days(days)
    })
}

/// Strategy for generating valid report windows
pub fn window_strategy() -> impl Strategy<Value = ReportWindow> {
    (date_strategy(), date_strategy()).prop_map(|(a, b)| {
        let (from, as_of) = if a <= b { (a, b) } else { (b, a) };
        ReportWindow::new(from, as_of).unwrap()
    })
}

/// Strategy for generating account codes
pub fn account_code_strategy() -> impl Strategy<Value = String> {
    "[1-5][0-9]{3}"
}

/// Strategy for generating postable accounts
pub fn account_strategy() -> impl Strategy<Value = Account> {
    (account_code_strategy(), "[A-Z][a-z]{2,12}", account_type_strategy())
        .prop_map(|(code, name, account_type)| Account::new(AccountId::new(), code, name, account_type))
}

/// Strategy for generating closed trial balance rows
pub fn row_strategy() -> impl Strategy<Value = TrialBalanceRow> {
    (
        account_strategy(),
        amount_strategy(),
        amount_strategy(),
        amount_strategy(),
        amount_strategy(),
    )
        .prop_map(|(account, opening_debit, opening_credit, period_debit, period_credit)| {
            TestRowBuilder::for_account(&account)
                .opening(opening_debit, opening_credit)
                .period(period_debit, period_credit)
                .build()
        })
}

/// Strategy for generating up to `max` rows
pub fn rows_strategy(max: usize) -> impl Strategy<Value = Vec<TrialBalanceRow>> {
    proptest::collection::vec(row_strategy(), 0..=max)
}
