//! Trial balance source resolution
//!
//! A trial balance can come from three places, tried in order:
//!
//! 1. the precomputed balance service
//! 2. the `rpc_get_trial_balance` stored function
//! 3. local aggregation over the chart of accounts and posted lines
//!
//! Each source is a [`BalanceStrategy`]. The [`TrialBalanceResolver`] walks
//! its strategies once each, in order, and stops at the first accepted
//! answer. There is no retry, backoff or timeout. Failures are logged and
//! recorded in the attempts log, never returned: the caller always gets a
//! [`ResolvedTrialBalance`], empty in the worst case.
//!
//! # Empty answers
//!
//! Whether an empty answer means "no movement" or "broken source" is a
//! per-source [`EmptyResultPolicy`]. The default configuration treats an
//! empty precomputed answer as a failure and accepts empty answers from the
//! stored function and from local aggregation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use core_kernel::{ReportWindow, TenantContext};

use crate::error::LedgerError;
use crate::journal::{normalize_lines, LineRecord, LineShape};
use crate::ports::{validate_function_name, BalanceServicePort, LedgerQueryPort, TrialBalanceRpcPort};
use crate::trial_balance::{aggregate, calculate_totals, TrialBalanceRow, TrialBalanceTotals};

/// Default name of the trial balance stored function
pub const DEFAULT_RPC_FUNCTION: &str = "rpc_get_trial_balance";

/// Where a trial balance came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceSource {
    PrecomputedService,
    Rpc,
    ManualAggregation,
}

impl fmt::Display for BalanceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceSource::PrecomputedService => f.write_str("precomputed_service"),
            BalanceSource::Rpc => f.write_str("rpc"),
            BalanceSource::ManualAggregation => f.write_str("manual_aggregation"),
        }
    }
}

/// How a source's successful-but-empty answer is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyResultPolicy {
    /// Treat as failure and try the next source
    FallThrough,
    /// Treat as a legitimate report with no rows
    Accept,
}

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Stored function called by the RPC tier
    pub rpc_function: String,
    /// Empty-answer policy of the precomputed service
    pub service_empty_result: EmptyResultPolicy,
    /// Empty-answer policy of the stored function
    pub rpc_empty_result: EmptyResultPolicy,
    /// Empty-answer policy of local aggregation
    pub manual_empty_result: EmptyResultPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            rpc_function: DEFAULT_RPC_FUNCTION.to_string(),
            service_empty_result: EmptyResultPolicy::FallThrough,
            rpc_empty_result: EmptyResultPolicy::Accept,
            manual_empty_result: EmptyResultPolicy::Accept,
        }
    }
}

/// One way of producing a trial balance
#[async_trait]
pub trait BalanceStrategy: Send + Sync {
    /// The source this strategy reads from
    fn source(&self) -> BalanceSource;

    /// How an empty answer from this strategy is treated
    fn empty_policy(&self) -> EmptyResultPolicy;

    /// Produces rows for the window, or fails
    async fn attempt(
        &self,
        ctx: &TenantContext,
        window: &ReportWindow,
    ) -> Result<Vec<TrialBalanceRow>, LedgerError>;
}

/// Reads the precomputed balance service
pub struct PrecomputedServiceStrategy {
    port: Arc<dyn BalanceServicePort>,
    empty_policy: EmptyResultPolicy,
}

impl PrecomputedServiceStrategy {
    pub fn new(port: Arc<dyn BalanceServicePort>, empty_policy: EmptyResultPolicy) -> Self {
        Self { port, empty_policy }
    }
}

#[async_trait]
impl BalanceStrategy for PrecomputedServiceStrategy {
    fn source(&self) -> BalanceSource {
        BalanceSource::PrecomputedService
    }

    fn empty_policy(&self) -> EmptyResultPolicy {
        self.empty_policy
    }

    async fn attempt(
        &self,
        ctx: &TenantContext,
        window: &ReportWindow,
    ) -> Result<Vec<TrialBalanceRow>, LedgerError> {
        Ok(self.port.trial_balance(ctx, window).await?)
    }
}

/// Calls the trial balance stored function
///
/// The function only receives the tenant and the as-of date; its rows are
/// used as returned, without a local opening/period split.
pub struct RpcStrategy {
    port: Arc<dyn TrialBalanceRpcPort>,
    function: String,
    empty_policy: EmptyResultPolicy,
}

impl RpcStrategy {
    pub fn new(
        port: Arc<dyn TrialBalanceRpcPort>,
        function: impl Into<String>,
        empty_policy: EmptyResultPolicy,
    ) -> Self {
        Self {
            port,
            function: function.into(),
            empty_policy,
        }
    }
}

#[async_trait]
impl BalanceStrategy for RpcStrategy {
    fn source(&self) -> BalanceSource {
        BalanceSource::Rpc
    }

    fn empty_policy(&self) -> EmptyResultPolicy {
        self.empty_policy
    }

    async fn attempt(
        &self,
        ctx: &TenantContext,
        window: &ReportWindow,
    ) -> Result<Vec<TrialBalanceRow>, LedgerError> {
        validate_function_name(&self.function)?;
        let rows = self
            .port
            .call_trial_balance(&self.function, ctx, window.as_of_date())
            .await?;
        Ok(rows)
    }
}

/// Aggregates locally from the chart of accounts and posted lines
///
/// Lines are read from the current schema first. If that query fails for
/// any reason the legacy tables are read once instead.
pub struct ManualAggregationStrategy {
    port: Arc<dyn LedgerQueryPort>,
    empty_policy: EmptyResultPolicy,
}

impl ManualAggregationStrategy {
    pub fn new(port: Arc<dyn LedgerQueryPort>, empty_policy: EmptyResultPolicy) -> Self {
        Self { port, empty_policy }
    }

    async fn fetch_lines(
        &self,
        ctx: &TenantContext,
    ) -> Result<(Vec<LineRecord>, LineShape), LedgerError> {
        match self.port.posted_lines(ctx, LineShape::Modern).await {
            Ok(records) => Ok((records, LineShape::Modern)),
            Err(e) => {
                warn!(
                    tenant = %ctx.tenant_id,
                    error = %e,
                    "Journal line query failed on {}, retrying on {}",
                    LineShape::Modern,
                    LineShape::Legacy
                );
                let records = self.port.posted_lines(ctx, LineShape::Legacy).await?;
                Ok((records, LineShape::Legacy))
            }
        }
    }
}

#[async_trait]
impl BalanceStrategy for ManualAggregationStrategy {
    fn source(&self) -> BalanceSource {
        BalanceSource::ManualAggregation
    }

    fn empty_policy(&self) -> EmptyResultPolicy {
        self.empty_policy
    }

    async fn attempt(
        &self,
        ctx: &TenantContext,
        window: &ReportWindow,
    ) -> Result<Vec<TrialBalanceRow>, LedgerError> {
        let accounts = self.port.postable_accounts(ctx).await?;
        let (records, shape) = self.fetch_lines(ctx).await?;
        let lines = normalize_lines(records);

        let (rows, stats) = aggregate(*window, &accounts, &lines);

        info!(
            tenant = %ctx.tenant_id,
            shape = %shape,
            accounts = accounts.len(),
            lines = lines.len(),
            opening_lines = stats.opening_lines,
            period_lines = stats.period_lines,
            skipped_unknown_account = stats.skipped_unknown_account,
            skipped_missing_date = stats.skipped_missing_date,
            skipped_future = stats.skipped_future,
            rows = rows.len(),
            "Aggregated trial balance locally"
        );

        Ok(rows)
    }
}

/// Outcome of one source attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The answer was used
    Accepted { rows: usize },
    /// The source answered with no rows and its policy rejected that
    Empty,
    /// The source failed
    Failed { message: String },
}

/// A line of the attempts log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub source: BalanceSource,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

/// User-facing notice attached to a degraded report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionNotice {
    /// Local aggregation, the last resort, failed; the report is empty
    ManualAggregationFailed,
}

/// The result of a resolution run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTrialBalance {
    pub window: ReportWindow,
    pub rows: Vec<TrialBalanceRow>,
    /// Source of `rows`, or `None` if every source failed
    pub source: Option<BalanceSource>,
    pub attempts: Vec<AttemptRecord>,
    pub notice: Option<ResolutionNotice>,
}

impl ResolvedTrialBalance {
    fn unresolved(window: ReportWindow) -> Self {
        Self {
            window,
            rows: Vec::new(),
            source: None,
            attempts: Vec::new(),
            notice: None,
        }
    }

    /// Column totals of the resolved rows
    pub fn totals(&self) -> TrialBalanceTotals {
        calculate_totals(&self.rows)
    }

    /// Returns true if some source produced the rows
    pub fn is_resolved(&self) -> bool {
        self.source.is_some()
    }
}

/// Runs balance strategies in order until one is accepted
#[derive(Default)]
pub struct TrialBalanceResolver {
    strategies: Vec<Box<dyn BalanceStrategy>>,
}

impl TrialBalanceResolver {
    /// Creates a resolver without strategies
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the standard service → RPC → manual chain
    pub fn standard(
        service: Arc<dyn BalanceServicePort>,
        rpc: Arc<dyn TrialBalanceRpcPort>,
        ledger: Arc<dyn LedgerQueryPort>,
        config: &ResolverConfig,
    ) -> Self {
        Self::new()
            .with_strategy(PrecomputedServiceStrategy::new(service, config.service_empty_result))
            .with_strategy(RpcStrategy::new(rpc, config.rpc_function.clone(), config.rpc_empty_result))
            .with_strategy(ManualAggregationStrategy::new(ledger, config.manual_empty_result))
    }

    /// Appends a strategy to the chain
    pub fn with_strategy(mut self, strategy: impl BalanceStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// The sources in the order they are tried
    pub fn sources(&self) -> Vec<BalanceSource> {
        self.strategies.iter().map(|s| s.source()).collect()
    }

    /// Produces a trial balance for the window
    ///
    /// Each strategy is tried at most once. The first accepted answer wins;
    /// if none is accepted the result is empty and `source` is `None`.
    pub async fn resolve(&self, ctx: &TenantContext, window: &ReportWindow) -> ResolvedTrialBalance {
        let mut resolved = ResolvedTrialBalance::unresolved(*window);

        for strategy in &self.strategies {
            let source = strategy.source();

            let outcome = match strategy.attempt(ctx, window).await {
                Ok(rows) if rows.is_empty() && strategy.empty_policy() == EmptyResultPolicy::FallThrough => {
                    info!(tenant = %ctx.tenant_id, %source, "Source returned no rows, trying next source");
                    AttemptOutcome::Empty
                }
                Ok(rows) => {
                    info!(tenant = %ctx.tenant_id, %source, rows = rows.len(), "Trial balance resolved");
                    resolved.attempts.push(AttemptRecord {
                        source,
                        outcome: AttemptOutcome::Accepted { rows: rows.len() },
                    });
                    resolved.rows = rows;
                    resolved.source = Some(source);
                    return resolved;
                }
                Err(e) => {
                    warn!(tenant = %ctx.tenant_id, %source, error = %e, "Source failed, trying next source");
                    if source == BalanceSource::ManualAggregation {
                        resolved.notice = Some(ResolutionNotice::ManualAggregationFailed);
                    }
                    AttemptOutcome::Failed { message: e.to_string() }
                }
            };

            resolved.attempts.push(AttemptRecord { source, outcome });
        }

        error!(
            tenant = %ctx.tenant_id,
            attempts = resolved.attempts.len(),
            "No source produced a trial balance, returning empty report"
        );
        resolved
    }
}
