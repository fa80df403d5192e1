//! Trial balance DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use domain_ledger::{AttemptRecord, BalanceSource, ResolutionNotice, TrialBalanceRow, TrialBalanceTotals};
use report_export::Language;

/// Query string of the report and export endpoints
///
/// Both dates are optional: the as-of date defaults to today in the
/// configured timezone, the start to January 1st of the as-of year.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrialBalanceQuery {
    pub from_date: Option<NaiveDate>,
    pub as_of_date: Option<NaiveDate>,
    /// Account type to keep, or `all`
    pub account_type: Option<String>,
    /// Case-insensitive match on account code and names
    pub search: Option<String>,
    /// Label language; `Accept-Language` is used when absent
    pub lang: Option<String>,
}

/// A resolved trial balance after filtering
#[derive(Debug, Clone, Serialize)]
pub struct TrialBalanceResponse {
    pub from_date: NaiveDate,
    pub as_of_date: NaiveDate,
    pub language: Language,
    pub rows: Vec<TrialBalanceRow>,
    pub totals: TrialBalanceTotals,
    pub is_balanced: bool,
    /// Source that produced the rows; absent if every source failed
    pub source: Option<BalanceSource>,
    pub attempts: Vec<AttemptRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<NoticeResponse>,
}

/// User-facing failure notice
#[derive(Debug, Clone, Serialize)]
pub struct NoticeResponse {
    pub code: ResolutionNotice,
    pub message: String,
}
