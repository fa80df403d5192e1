//! Ledger Domain - Trial Balance Reporting
//!
//! This crate turns a chart of accounts and posted journal lines into a
//! trial balance for a reporting window, and decides which backend source
//! the balance is taken from.
//!
//! # Trial Balance Columns
//!
//! For each postable account the report carries six figures:
//! - **Opening**: activity dated before the window start
//! - **Period**: activity dated inside the window, both ends inclusive
//! - **Closing**: net of opening plus period, placed on exactly one side
//!
//! Lines dated after the as-of date are ignored. Accounts with no activity
//! at all are left out of the report.
//!
//! # Sources
//!
//! The [`TrialBalanceResolver`] tries the precomputed service, then the
//! stored function, then local aggregation, and always returns a report.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{ResolverConfig, TrialBalanceResolver};
//!
//! let resolver = TrialBalanceResolver::standard(service, rpc, ledger, &ResolverConfig::default());
//! let resolved = resolver.resolve(&ctx, &window).await;
//!
//! let totals = resolved.totals();
//! assert!(totals.is_balanced());
//! ```

pub mod account;
pub mod journal;
pub mod trial_balance;
pub mod ports;
pub mod resolution;
pub mod error;

pub use account::{Account, AccountType, AccountTypeFilter};
pub use journal::{normalize_lines, EntryStatus, LegacyLine, LineRecord, LineShape, ModernLine, PostedLine};
pub use trial_balance::{
    aggregate, calculate_totals, filter_by_type, search_rows, BalanceAccumulator, FoldStats,
    SkipReason, TrialBalanceRow, TrialBalanceTotals,
};
pub use ports::{validate_function_name, BalanceServicePort, LedgerQueryPort, TrialBalanceRpcPort};
pub use resolution::{
    AttemptOutcome, AttemptRecord, BalanceSource, BalanceStrategy, EmptyResultPolicy,
    ManualAggregationStrategy, PrecomputedServiceStrategy, ResolutionNotice, ResolvedTrialBalance,
    ResolverConfig, RpcStrategy, TrialBalanceResolver, DEFAULT_RPC_FUNCTION,
};
pub use error::LedgerError;

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockBalanceService, MockLedgerQuery, MockResponse, MockTrialBalanceRpc};
