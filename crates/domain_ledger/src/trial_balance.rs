//! Trial balance aggregation
//!
//! The [`BalanceAccumulator`] folds posted lines into one row per postable
//! account, split into opening and period columns by the report window, and
//! nets each account into a single-sided closing balance.
//!
//! # Invariants
//!
//! - For every produced row, at most one of `closing_debit` and
//!   `closing_credit` is nonzero
//! - Accounts without any opening or period movement are not reported
//! - Totals are a plain column sum; the report-level debit = credit
//!   equality is reported, never enforced

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::AddAssign;

use core_kernel::{AccountId, ReportWindow, WindowPosition};
use crate::account::{Account, AccountType, AccountTypeFilter};
use crate::journal::PostedLine;

/// One line of the trial balance report
///
/// Derived for a single window and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account_code: String,
    pub account_name: String,
    pub account_name_ar: Option<String>,
    pub account_type: AccountType,
    pub opening_debit: Decimal,
    pub opening_credit: Decimal,
    pub period_debit: Decimal,
    pub period_credit: Decimal,
    pub closing_debit: Decimal,
    pub closing_credit: Decimal,
}

impl TrialBalanceRow {
    /// Creates a zeroed row for an account
    pub fn for_account(account: &Account) -> Self {
        Self {
            account_code: account.code.clone(),
            account_name: account.name.clone(),
            account_name_ar: account.name_ar.clone(),
            account_type: account.account_type,
            opening_debit: Decimal::ZERO,
            opening_credit: Decimal::ZERO,
            period_debit: Decimal::ZERO,
            period_credit: Decimal::ZERO,
            closing_debit: Decimal::ZERO,
            closing_credit: Decimal::ZERO,
        }
    }

    /// Returns true if the account had any opening or period movement
    pub fn has_activity(&self) -> bool {
        !(self.opening_debit.is_zero()
            && self.opening_credit.is_zero()
            && self.period_debit.is_zero()
            && self.period_credit.is_zero())
    }

    /// Recomputes the closing columns from opening and period movement
    ///
    /// The larger side receives the difference and the other side is
    /// zeroed; equal sides leave both closing columns at zero.
    pub fn close(&mut self) {
        let total_debit = self.opening_debit + self.period_debit;
        let total_credit = self.opening_credit + self.period_credit;

        if total_debit > total_credit {
            self.closing_debit = total_debit - total_credit;
            self.closing_credit = Decimal::ZERO;
        } else if total_credit > total_debit {
            self.closing_debit = Decimal::ZERO;
            self.closing_credit = total_credit - total_debit;
        } else {
            self.closing_debit = Decimal::ZERO;
            self.closing_credit = Decimal::ZERO;
        }
    }

    /// Returns the display name for a language preference
    pub fn display_name(&self, prefer_arabic: bool) -> &str {
        match (&self.account_name_ar, prefer_arabic) {
            (Some(name_ar), true) if !name_ar.trim().is_empty() => name_ar,
            _ => &self.account_name,
        }
    }
}

/// Column sums over a set of rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    pub opening_debit: Decimal,
    pub opening_credit: Decimal,
    pub period_debit: Decimal,
    pub period_credit: Decimal,
    pub closing_debit: Decimal,
    pub closing_credit: Decimal,
}

impl TrialBalanceTotals {
    /// Returns true if closing debits equal closing credits
    pub fn is_balanced(&self) -> bool {
        self.closing_debit == self.closing_credit
    }
}

impl AddAssign<&TrialBalanceRow> for TrialBalanceTotals {
    fn add_assign(&mut self, row: &TrialBalanceRow) {
        self.opening_debit += row.opening_debit;
        self.opening_credit += row.opening_credit;
        self.period_debit += row.period_debit;
        self.period_credit += row.period_credit;
        self.closing_debit += row.closing_debit;
        self.closing_credit += row.closing_credit;
    }
}

/// Sums all six numeric columns in one pass. Empty input yields zeros.
pub fn calculate_totals(rows: &[TrialBalanceRow]) -> TrialBalanceTotals {
    rows.iter().fold(TrialBalanceTotals::default(), |mut totals, row| {
        totals += row;
        totals
    })
}

/// Keeps rows matching the account type filter, preserving order
pub fn filter_by_type(rows: &[TrialBalanceRow], filter: AccountTypeFilter) -> Vec<TrialBalanceRow> {
    rows.iter()
        .filter(|row| filter.matches(row.account_type))
        .cloned()
        .collect()
}

/// Keeps rows whose code, name or Arabic name contains `term`
/// (case-insensitive). A blank term keeps everything.
pub fn search_rows(rows: &[TrialBalanceRow], term: &str) -> Vec<TrialBalanceRow> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return rows.to_vec();
    }

    rows.iter()
        .filter(|row| {
            row.account_code.to_lowercase().contains(&needle)
                || row.account_name.to_lowercase().contains(&needle)
                || row
                    .account_name_ar
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Why a line did not contribute to the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The line's account is not a postable, active account
    UnknownAccount,
    /// Neither posting date nor entry date is set
    MissingDate,
    /// Dated after the as-of date
    FutureDated,
}

/// Counters describing one accumulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FoldStats {
    pub opening_lines: usize,
    pub period_lines: usize,
    pub skipped_unknown_account: usize,
    pub skipped_missing_date: usize,
    pub skipped_future: usize,
}

impl FoldStats {
    /// Total number of lines that were skipped
    pub fn skipped(&self) -> usize {
        self.skipped_unknown_account + self.skipped_missing_date + self.skipped_future
    }

    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::UnknownAccount => self.skipped_unknown_account += 1,
            SkipReason::MissingDate => self.skipped_missing_date += 1,
            SkipReason::FutureDated => self.skipped_future += 1,
        }
    }
}

/// Folds posted lines into per-account trial balance rows
#[derive(Debug)]
pub struct BalanceAccumulator {
    window: ReportWindow,
    rows: Vec<TrialBalanceRow>,
    index: HashMap<AccountId, usize>,
    stats: FoldStats,
}

impl BalanceAccumulator {
    /// Creates an accumulator with one zeroed row per account
    ///
    /// Accounts keep the order they are given in. A duplicated account id
    /// keeps its first row.
    pub fn new<'a>(window: ReportWindow, accounts: impl IntoIterator<Item = &'a Account>) -> Self {
        let mut rows = Vec::new();
        let mut index = HashMap::new();

        for account in accounts {
            if index.contains_key(&account.id) {
                continue;
            }
            index.insert(account.id, rows.len());
            rows.push(TrialBalanceRow::for_account(account));
        }

        Self {
            window,
            rows,
            index,
            stats: FoldStats::default(),
        }
    }

    /// Folds a single line
    ///
    /// # Returns
    ///
    /// `Err(reason)` if the line was skipped
    pub fn fold(&mut self, line: &PostedLine) -> Result<WindowPosition, SkipReason> {
        let outcome = self.place(line);
        match outcome {
            Ok(WindowPosition::Opening) => self.stats.opening_lines += 1,
            Ok(_) => self.stats.period_lines += 1,
            Err(reason) => self.stats.record_skip(reason),
        }
        outcome
    }

    fn place(&mut self, line: &PostedLine) -> Result<WindowPosition, SkipReason> {
        let slot = *self.index.get(&line.account_id).ok_or(SkipReason::UnknownAccount)?;
        let date = line.effective_date().ok_or(SkipReason::MissingDate)?;
        let row = &mut self.rows[slot];

        match self.window.position(date) {
            WindowPosition::Future => Err(SkipReason::FutureDated),
            WindowPosition::Period => {
                row.period_debit += line.debit;
                row.period_credit += line.credit;
                Ok(WindowPosition::Period)
            }
            WindowPosition::Opening => {
                row.opening_debit += line.debit;
                row.opening_credit += line.credit;
                Ok(WindowPosition::Opening)
            }
        }
    }

    /// Folds every line of an iterator
    pub fn fold_all<'a>(&mut self, lines: impl IntoIterator<Item = &'a PostedLine>) {
        for line in lines {
            let _ = self.fold(line);
        }
    }

    /// Returns the counters collected so far
    pub fn stats(&self) -> FoldStats {
        self.stats
    }

    /// Closes every row and drops accounts without movement
    pub fn finish(self) -> Vec<TrialBalanceRow> {
        self.rows
            .into_iter()
            .map(|mut row| {
                row.close();
                row
            })
            .filter(TrialBalanceRow::has_activity)
            .collect()
    }
}

/// Runs a full accumulation over accounts and lines
pub fn aggregate(
    window: ReportWindow,
    accounts: &[Account],
    lines: &[PostedLine],
) -> (Vec<TrialBalanceRow>, FoldStats) {
    let mut accumulator = BalanceAccumulator::new(window, accounts);
    accumulator.fold_all(lines);
    let stats = accumulator.stats();
    (accumulator.finish(), stats)
}
