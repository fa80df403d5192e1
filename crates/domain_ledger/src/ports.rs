//! Ledger Domain Ports
//!
//! The three remote collaborators of the trial balance report:
//!
//! - [`BalanceServicePort`]: a precomputed aggregation service
//! - [`TrialBalanceRpcPort`]: a server-side stored function returning rows
//!   already in trial balance shape
//! - [`LedgerQueryPort`]: plain table queries used for local aggregation
//!
//! Their internals are opaque to this crate. Adapters live in `infra_db`;
//! the in-memory [`mock`] module backs tests.

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DomainPort, PortError, ReportWindow, TenantContext};

use crate::account::Account;
use crate::error::LedgerError;
use crate::journal::{LineRecord, LineShape};
use crate::trial_balance::TrialBalanceRow;

/// Precomputed trial balance service
#[async_trait]
pub trait BalanceServicePort: DomainPort {
    /// Returns the precomputed rows for a window
    ///
    /// An empty vector is a successful answer; whether it is trusted is the
    /// resolver's decision.
    async fn trial_balance(
        &self,
        ctx: &TenantContext,
        window: &ReportWindow,
    ) -> Result<Vec<TrialBalanceRow>, PortError>;
}

/// Server-side stored function producing trial balance rows
#[async_trait]
pub trait TrialBalanceRpcPort: DomainPort {
    /// Calls `function(p_tenant, p_as_of_date)`
    async fn call_trial_balance(
        &self,
        function: &str,
        ctx: &TenantContext,
        as_of_date: NaiveDate,
    ) -> Result<Vec<TrialBalanceRow>, PortError>;
}

/// Table queries over the chart of accounts and posted journal lines
#[async_trait]
pub trait LedgerQueryPort: DomainPort {
    /// Returns active accounts that allow posting, ordered by code
    async fn postable_accounts(&self, ctx: &TenantContext) -> Result<Vec<Account>, PortError>;

    /// Returns every line of posted entries, read in the given shape
    async fn posted_lines(
        &self,
        ctx: &TenantContext,
        shape: LineShape,
    ) -> Result<Vec<LineRecord>, PortError>;
}

/// Checks that a stored function name is a plain, optionally
/// schema-qualified, SQL identifier
///
/// The name is interpolated into the call statement, so anything else is
/// rejected before the port is reached.
///
/// # Errors
///
/// Returns `LedgerError::InvalidFunctionName` if any segment is empty, starts
/// with a digit, or contains characters other than ASCII alphanumerics and
/// underscores, or if there are more than two segments.
pub fn validate_function_name(name: &str) -> Result<(), LedgerError> {
    let segments: Vec<&str> = name.split('.').collect();
    let valid = segments.len() <= 2
        && segments.iter().all(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
                }
                _ => false,
            }
        });

    if valid {
        Ok(())
    } else {
        Err(LedgerError::InvalidFunctionName(name.to_string()))
    }
}

/// In-memory port implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::TenantId;

    /// Scripted answer of a mock port
    #[derive(Debug, Clone)]
    pub enum MockResponse<T> {
        /// Answer successfully
        Ok(T),
        /// Fail with a connection error carrying the message
        Fail(String),
    }

    impl<T: Clone> MockResponse<T> {
        fn answer(&self) -> Result<T, PortError> {
            match self {
                MockResponse::Ok(value) => Ok(value.clone()),
                MockResponse::Fail(message) => Err(PortError::connection(message.clone())),
            }
        }
    }

    /// Mock precomputed balance service
    #[derive(Debug)]
    pub struct MockBalanceService {
        response: MockResponse<Vec<TrialBalanceRow>>,
        calls: AtomicUsize,
    }

    impl MockBalanceService {
        pub fn returning(rows: Vec<TrialBalanceRow>) -> Self {
            Self { response: MockResponse::Ok(rows), calls: AtomicUsize::new(0) }
        }

        pub fn failing(message: impl Into<String>) -> Self {
            Self { response: MockResponse::Fail(message.into()), calls: AtomicUsize::new(0) }
        }

        /// Number of times the service was called
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DomainPort for MockBalanceService {}

    #[async_trait]
    impl BalanceServicePort for MockBalanceService {
        async fn trial_balance(
            &self,
            _ctx: &TenantContext,
            _window: &ReportWindow,
        ) -> Result<Vec<TrialBalanceRow>, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.answer()
        }
    }

    /// Mock stored-function endpoint
    #[derive(Debug)]
    pub struct MockTrialBalanceRpc {
        response: MockResponse<Vec<TrialBalanceRow>>,
        calls: Arc<RwLock<Vec<(String, NaiveDate)>>>,
    }

    impl MockTrialBalanceRpc {
        pub fn returning(rows: Vec<TrialBalanceRow>) -> Self {
            Self { response: MockResponse::Ok(rows), calls: Arc::default() }
        }

        pub fn failing(message: impl Into<String>) -> Self {
            Self { response: MockResponse::Fail(message.into()), calls: Arc::default() }
        }

        /// The `(function, as_of_date)` pairs the port was called with
        pub async fn calls(&self) -> Vec<(String, NaiveDate)> {
            self.calls.read().await.clone()
        }
    }

    impl DomainPort for MockTrialBalanceRpc {}

    #[async_trait]
    impl TrialBalanceRpcPort for MockTrialBalanceRpc {
        async fn call_trial_balance(
            &self,
            function: &str,
            _ctx: &TenantContext,
            as_of_date: NaiveDate,
        ) -> Result<Vec<TrialBalanceRow>, PortError> {
            self.calls.write().await.push((function.to_string(), as_of_date));
            self.response.answer()
        }
    }

    /// Mock ledger tables, partitioned by tenant
    #[derive(Debug, Default)]
    pub struct MockLedgerQuery {
        accounts: RwLock<HashMap<TenantId, Vec<Account>>>,
        modern: RwLock<HashMap<TenantId, Vec<LineRecord>>>,
        legacy: RwLock<HashMap<TenantId, Vec<LineRecord>>>,
        modern_failure: Option<String>,
        legacy_failure: Option<String>,
        accounts_failure: Option<String>,
    }

    impl MockLedgerQuery {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes the modern line query fail as if the join did not exist
        pub fn without_modern_schema(mut self) -> Self {
            self.modern_failure = Some("relation \"gl_entry_lines\" does not exist".to_string());
            self
        }

        /// Makes the legacy line query fail
        pub fn without_legacy_schema(mut self) -> Self {
            self.legacy_failure = Some("relation \"journal_lines\" does not exist".to_string());
            self
        }

        /// Makes the account query fail
        pub fn failing_accounts(mut self, message: impl Into<String>) -> Self {
            self.accounts_failure = Some(message.into());
            self
        }

        /// Stores accounts for a tenant; non-reportable ones are filtered
        /// out on read like the real query does
        pub async fn with_accounts(self, tenant: TenantId, accounts: Vec<Account>) -> Self {
            self.accounts.write().await.insert(tenant, accounts);
            self
        }

        /// Stores lines for a tenant, routed by their shape
        pub async fn with_lines(self, tenant: TenantId, lines: Vec<LineRecord>) -> Self {
            for line in lines {
                let table = match line.shape() {
                    LineShape::Modern => &self.modern,
                    LineShape::Legacy => &self.legacy,
                };
                table.write().await.entry(tenant).or_default().push(line);
            }
            self
        }
    }

    impl DomainPort for MockLedgerQuery {}

    #[async_trait]
    impl LedgerQueryPort for MockLedgerQuery {
        async fn postable_accounts(&self, ctx: &TenantContext) -> Result<Vec<Account>, PortError> {
            if let Some(message) = &self.accounts_failure {
                return Err(PortError::connection(message.clone()));
            }
            let mut accounts: Vec<Account> = self
                .accounts
                .read()
                .await
                .get(&ctx.tenant_id)
                .map(|accounts| accounts.iter().filter(|a| a.is_reportable()).cloned().collect())
                .unwrap_or_default();
            accounts.sort_by(|a, b| a.code.cmp(&b.code));
            Ok(accounts)
        }

        async fn posted_lines(
            &self,
            ctx: &TenantContext,
            shape: LineShape,
        ) -> Result<Vec<LineRecord>, PortError> {
            let table = match shape {
                LineShape::Modern => {
                    if let Some(message) = &self.modern_failure {
                        return Err(PortError::schema_mismatch(message.clone()));
                    }
                    &self.modern
                }
                LineShape::Legacy => {
                    if let Some(message) = &self.legacy_failure {
                        return Err(PortError::schema_mismatch(message.clone()));
                    }
                    &self.legacy
                }
            };
            Ok(table.read().await.get(&ctx.tenant_id).cloned().unwrap_or_default())
        }
    }
}
