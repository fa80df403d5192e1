//! Posted journal lines
//!
//! Two generations of the journal schema are in use. The current one stores
//! lines in `gl_entry_lines` with `debit`/`credit` columns under
//! `gl_entries`; the legacy one stores them in `journal_lines` with
//! `debit_amount`/`credit_amount` under `journal_entries`. Adapters return
//! whichever shape they read as a [`LineRecord`], and the record is
//! normalised into a [`PostedLine`] before any arithmetic happens.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{AccountId, JournalEntryId};
use crate::error::LedgerError;

/// Lifecycle status of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Draft,
    Posted,
    Reversed,
    Cancelled,
}

impl EntryStatus {
    /// Returns true if lines of this entry count towards balances
    pub fn is_posted(&self) -> bool {
        matches!(self, EntryStatus::Posted)
    }

    /// Value of the `status` column in the given schema generation
    pub fn column_value(&self, shape: LineShape) -> &'static str {
        match (shape, self) {
            (LineShape::Modern, EntryStatus::Draft) => "DRAFT",
            (LineShape::Modern, EntryStatus::Posted) => "POSTED",
            (LineShape::Modern, EntryStatus::Reversed) => "REVERSED",
            (LineShape::Modern, EntryStatus::Cancelled) => "CANCELLED",
            (LineShape::Legacy, EntryStatus::Draft) => "draft",
            (LineShape::Legacy, EntryStatus::Posted) => "posted",
            (LineShape::Legacy, EntryStatus::Reversed) => "reversed",
            (LineShape::Legacy, EntryStatus::Cancelled) => "cancelled",
        }
    }
}

impl FromStr for EntryStatus {
    type Err = LedgerError;

    /// Parses both `POSTED` (current schema) and `posted` (legacy schema)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(EntryStatus::Draft),
            "posted" => Ok(EntryStatus::Posted),
            "reversed" => Ok(EntryStatus::Reversed),
            "cancelled" | "canceled" => Ok(EntryStatus::Cancelled),
            _ => Err(LedgerError::UnknownEntryStatus(s.to_string())),
        }
    }
}

/// Which table shape to read lines from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineShape {
    /// `gl_entry_lines` joined to `gl_entries`
    Modern,
    /// `journal_lines` joined to `journal_entries`
    Legacy,
}

impl fmt::Display for LineShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineShape::Modern => f.write_str("gl_entry_lines"),
            LineShape::Legacy => f.write_str("journal_lines"),
        }
    }
}

/// A line read from `gl_entry_lines` with its parent entry's dates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModernLine {
    pub entry_id: Option<JournalEntryId>,
    pub account_id: AccountId,
    pub debit: Option<Decimal>,
    pub credit: Option<Decimal>,
    pub entry_date: Option<NaiveDate>,
    pub posting_date: Option<NaiveDate>,
}

/// A line read from `journal_lines` with its parent entry's dates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyLine {
    pub entry_id: Option<JournalEntryId>,
    pub account_id: AccountId,
    pub debit_amount: Option<Decimal>,
    pub credit_amount: Option<Decimal>,
    pub entry_date: Option<NaiveDate>,
    pub posting_date: Option<NaiveDate>,
}

/// A journal line in whichever shape the backend returned it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum LineRecord {
    Modern(ModernLine),
    Legacy(LegacyLine),
}

impl LineRecord {
    /// Returns the shape this record was read in
    pub fn shape(&self) -> LineShape {
        match self {
            LineRecord::Modern(_) => LineShape::Modern,
            LineRecord::Legacy(_) => LineShape::Legacy,
        }
    }
}

impl From<LineRecord> for PostedLine {
    fn from(record: LineRecord) -> Self {
        match record {
            LineRecord::Modern(line) => PostedLine {
                account_id: line.account_id,
                debit: line.debit.unwrap_or_default(),
                credit: line.credit.unwrap_or_default(),
                entry_date: line.entry_date,
                posting_date: line.posting_date,
            },
            LineRecord::Legacy(line) => PostedLine {
                account_id: line.account_id,
                debit: line.debit_amount.unwrap_or_default(),
                credit: line.credit_amount.unwrap_or_default(),
                entry_date: line.entry_date,
                posting_date: line.posting_date,
            },
        }
    }
}

/// A posted line in the shape the accumulator folds
///
/// Well-formed data has at most one of `debit`/`credit` nonzero. This is a
/// convention of the posting side and is not checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedLine {
    pub account_id: AccountId,
    pub debit: Decimal,
    pub credit: Decimal,
    pub entry_date: Option<NaiveDate>,
    pub posting_date: Option<NaiveDate>,
}

impl PostedLine {
    /// Creates a debit line dated by its entry date
    pub fn debit(account_id: AccountId, amount: Decimal, entry_date: NaiveDate) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            entry_date: Some(entry_date),
            posting_date: None,
        }
    }

    /// Creates a credit line dated by its entry date
    pub fn credit(account_id: AccountId, amount: Decimal, entry_date: NaiveDate) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            entry_date: Some(entry_date),
            posting_date: None,
        }
    }

    /// Sets the posting date, which takes precedence over the entry date
    pub fn posted_on(mut self, posting_date: NaiveDate) -> Self {
        self.posting_date = Some(posting_date);
        self
    }

    /// The date the line counts on: posting date, else entry date
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.posting_date.or(self.entry_date)
    }
}

/// Normalises a batch of records read from one shape
pub fn normalize_lines(records: Vec<LineRecord>) -> Vec<PostedLine> {
    records.into_iter().map(PostedLine::from).collect()
}
