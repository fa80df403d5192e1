//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for trial balance types that give
//! more meaningful error messages than standard assertions.

use domain_ledger::{calculate_totals, TrialBalanceRow, TrialBalanceTotals};

/// Asserts that closing debits equal closing credits
pub fn assert_balanced(totals: &TrialBalanceTotals) {
    assert!(
        totals.is_balanced(),
        "Trial balance is out of balance: opening {}/{}, period {}/{}, closing {}/{}",
        totals.opening_debit,
        totals.opening_credit,
        totals.period_debit,
        totals.period_credit,
        totals.closing_debit,
        totals.closing_credit
    );
}

/// Asserts that a row carries at most one non-zero closing side and that
/// the closing side equals the net of opening and period movement
pub fn assert_row_closed(row: &TrialBalanceRow) {
    assert!(
        row.closing_debit.is_zero() || row.closing_credit.is_zero(),
        "Account {} has both closing sides set: {} / {}",
        row.account_code,
        row.closing_debit,
        row.closing_credit
    );

    let net = row.opening_debit + row.period_debit - row.opening_credit - row.period_credit;
    assert_eq!(
        row.closing_debit - row.closing_credit,
        net,
        "Account {} closing balance does not match its movement",
        row.account_code
    );
}

/// Asserts that `totals` are the column sums of `rows`
pub fn assert_totals_match(rows: &[TrialBalanceRow], totals: &TrialBalanceTotals) {
    assert_eq!(
        &calculate_totals(rows),
        totals,
        "Totals do not match the sum of {} rows",
        rows.len()
    );
}

/// Asserts that rows are in ascending account code order
pub fn assert_sorted_by_code(rows: &[TrialBalanceRow]) {
    for pair in rows.windows(2) {
        assert!(
            pair[0].account_code <= pair[1].account_code,
            "Rows out of order: {} before {}",
            pair[0].account_code,
            pair[1].account_code
        );
    }
}
