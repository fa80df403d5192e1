//! Chart of accounts
//!
//! Only postable, active leaf accounts take part in the trial balance.
//! Accounts are never deleted once postings reference them; they are
//! deactivated instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::AccountId;
use crate::error::LedgerError;

/// Types of accounts in the chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset accounts (debit normal balance)
    Asset,
    /// Liability accounts (credit normal balance)
    Liability,
    /// Equity accounts (credit normal balance)
    Equity,
    /// Revenue accounts (credit normal balance)
    Revenue,
    /// Expense accounts (debit normal balance)
    Expense,
}

impl AccountType {
    /// All account types in chart order
    pub const ALL: [AccountType; 5] = [
        AccountType::Asset,
        AccountType::Liability,
        AccountType::Equity,
        AccountType::Revenue,
        AccountType::Expense,
    ];

    /// Returns true if this account type has a debit normal balance
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }

    /// Returns the lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "asset",
            AccountType::Liability => "liability",
            AccountType::Equity => "equity",
            AccountType::Revenue => "revenue",
            AccountType::Expense => "expense",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LedgerError::UnknownAccountType(s.to_string()))
    }
}

/// Filter applied to trial balance rows by account type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccountTypeFilter {
    /// Keep every row
    #[default]
    All,
    /// Keep only rows of the given type
    Only(AccountType),
}

impl AccountTypeFilter {
    /// Returns true if a row of `account_type` passes the filter
    pub fn matches(&self, account_type: AccountType) -> bool {
        match self {
            AccountTypeFilter::All => true,
            AccountTypeFilter::Only(expected) => *expected == account_type,
        }
    }
}

impl FromStr for AccountTypeFilter {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(AccountTypeFilter::All);
        }
        s.parse().map(AccountTypeFilter::Only)
    }
}

/// An account in the chart of accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,
    /// Account code, unique per tenant (e.g., "1001")
    pub code: String,
    /// Account name
    pub name: String,
    /// Arabic account name
    pub name_ar: Option<String>,
    /// Account type
    pub account_type: AccountType,
    /// Whether journal lines may be posted to this account
    pub allow_posting: bool,
    /// Whether account is active
    pub is_active: bool,
}

impl Account {
    /// Creates a new postable, active account
    ///
    /// # Arguments
    ///
    /// * `id` - Unique identifier
    /// * `code` - Account code
    /// * `name` - Account name
    /// * `account_type` - Type of account
    pub fn new(id: AccountId, code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
            name_ar: None,
            account_type,
            allow_posting: true,
            is_active: true,
        }
    }

    /// Sets the Arabic name
    pub fn with_arabic_name(mut self, name_ar: impl Into<String>) -> Self {
        self.name_ar = Some(name_ar.into());
        self
    }

    /// Marks the account as a header (non-postable) account
    pub fn as_header(mut self) -> Self {
        self.allow_posting = false;
        self
    }

    /// Deactivates the account
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Returns true if the account participates in balances
    pub fn is_reportable(&self) -> bool {
        self.allow_posting && self.is_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_parsing_is_case_insensitive() {
        assert_eq!("ASSET".parse::<AccountType>().unwrap(), AccountType::Asset);
        assert_eq!(" revenue ".parse::<AccountType>().unwrap(), AccountType::Revenue);
        assert!(matches!(
            "income".parse::<AccountType>(),
            Err(LedgerError::UnknownAccountType(_))
        ));
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<AccountTypeFilter>().unwrap(), AccountTypeFilter::All);
        assert_eq!("".parse::<AccountTypeFilter>().unwrap(), AccountTypeFilter::All);
        assert_eq!("  ".parse::<AccountTypeFilter>().unwrap(), AccountTypeFilter::All);
        assert_eq!(
            "expense".parse::<AccountTypeFilter>().unwrap(),
            AccountTypeFilter::Only(AccountType::Expense)
        );
    }

    #[test]
    fn test_header_and_inactive_accounts_are_not_reportable() {
        let header = Account::new(AccountId::new(), "1000", "Current Assets", AccountType::Asset)
            .as_header();
        assert!(!header.is_reportable());

        let mut cash = Account::new(AccountId::new(), "1001", "Cash", AccountType::Asset);
        assert!(cash.is_reportable());
        cash.deactivate();
        assert!(!cash.is_reportable());
    }
}
