//! PostgreSQL Ledger Adapter
//!
//! One adapter serves all three trial balance ports from the same database:
//!
//! - `BalanceServicePort` reads `gl_trial_balance_cache`
//! - `TrialBalanceRpcPort` calls the configured stored function
//! - `LedgerQueryPort` reads `gl_accounts` and the journal line tables
//!
//! Rows are converted into domain values here. A row that cannot be
//! converted fails the whole call with a transformation error.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AccountId, AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, JournalEntryId,
    PortError, ReportWindow, TenantContext,
};
use domain_ledger::{
    validate_function_name, Account, AccountType, BalanceServicePort, LedgerQueryPort, LegacyLine,
    LineRecord, LineShape, ModernLine, TrialBalanceRow, TrialBalanceRpcPort,
};

use crate::error::DatabaseError;
use crate::repositories::ledger::{
    AccountRow, EntryLineRow, JournalLineRow, LedgerRepository, TrialBalanceRecord,
};

const ADAPTER_ID: &str = "postgres-ledger-adapter";

/// PostgreSQL-backed implementation of the ledger ports
#[derive(Debug, Clone)]
pub struct PostgresLedgerAdapter {
    repository: LedgerRepository,
}

impl PostgresLedgerAdapter {
    /// Creates a new adapter over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: LedgerRepository::new(pool),
        }
    }
}

impl DomainPort for PostgresLedgerAdapter {}

#[async_trait]
impl HealthCheckable for PostgresLedgerAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = self.repository.ping().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(()) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };

        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl BalanceServicePort for PostgresLedgerAdapter {
    #[instrument(skip(self, ctx), fields(tenant = %ctx.tenant_id, request_id = ?ctx.correlation_id))]
    async fn trial_balance(
        &self,
        ctx: &TenantContext,
        window: &ReportWindow,
    ) -> Result<Vec<TrialBalanceRow>, PortError> {
        let records = self
            .repository
            .cached_trial_balance(
                *ctx.tenant_id.as_uuid(),
                window.from_date(),
                window.as_of_date(),
            )
            .await?;

        debug!(rows = records.len(), "Read precomputed trial balance");
        records.into_iter().map(record_to_row).collect()
    }
}

#[async_trait]
impl TrialBalanceRpcPort for PostgresLedgerAdapter {
    #[instrument(skip(self, ctx), fields(tenant = %ctx.tenant_id, request_id = ?ctx.correlation_id))]
    async fn call_trial_balance(
        &self,
        function: &str,
        ctx: &TenantContext,
        as_of_date: NaiveDate,
    ) -> Result<Vec<TrialBalanceRow>, PortError> {
        validate_function_name(function)
            .map_err(|e| PortError::validation_field(e.to_string(), "function"))?;

        let records = self
            .repository
            .call_trial_balance(function, *ctx.tenant_id.as_uuid(), as_of_date)
            .await?;

        debug!(rows = records.len(), "Stored function returned trial balance");
        records.into_iter().map(record_to_row).collect()
    }
}

#[async_trait]
impl LedgerQueryPort for PostgresLedgerAdapter {
    #[instrument(skip(self, ctx), fields(tenant = %ctx.tenant_id, request_id = ?ctx.correlation_id))]
    async fn postable_accounts(&self, ctx: &TenantContext) -> Result<Vec<Account>, PortError> {
        let rows = self.repository.postable_accounts(*ctx.tenant_id.as_uuid()).await?;
        rows.into_iter().map(row_to_account).collect()
    }

    #[instrument(skip(self, ctx), fields(tenant = %ctx.tenant_id, request_id = ?ctx.correlation_id))]
    async fn posted_lines(
        &self,
        ctx: &TenantContext,
        shape: LineShape,
    ) -> Result<Vec<LineRecord>, PortError> {
        let tenant = *ctx.tenant_id.as_uuid();
        let records = match shape {
            LineShape::Modern => self
                .repository
                .entry_lines(tenant)
                .await?
                .into_iter()
                .map(entry_line_to_record)
                .collect(),
            LineShape::Legacy => self
                .repository
                .journal_lines(tenant)
                .await?
                .into_iter()
                .map(journal_line_to_record)
                .collect(),
        };
        Ok(records)
    }
}

fn parse_account_type(value: &str) -> Result<AccountType, PortError> {
    value
        .parse()
        .map_err(|e: domain_ledger::LedgerError| DatabaseError::SerializationError(e.to_string()).into())
}

/// Converts a `gl_accounts` row to a domain account
fn row_to_account(row: AccountRow) -> Result<Account, PortError> {
    Ok(Account {
        id: AccountId::from(row.id),
        code: row.code,
        name: row.name,
        name_ar: row.name_ar,
        account_type: parse_account_type(&row.account_type)?,
        allow_posting: row.allow_posting,
        is_active: row.is_active,
    })
}

/// Converts a cached or stored-function row to a trial balance row
///
/// Rows are taken as returned; closing columns are not recomputed.
fn record_to_row(record: TrialBalanceRecord) -> Result<TrialBalanceRow, PortError> {
    Ok(TrialBalanceRow {
        account_type: parse_account_type(&record.account_type)?,
        account_code: record.account_code,
        account_name: record.account_name,
        account_name_ar: record.account_name_ar,
        opening_debit: record.opening_debit.unwrap_or_default(),
        opening_credit: record.opening_credit.unwrap_or_default(),
        period_debit: record.period_debit.unwrap_or_default(),
        period_credit: record.period_credit.unwrap_or_default(),
        closing_debit: record.closing_debit.unwrap_or_default(),
        closing_credit: record.closing_credit.unwrap_or_default(),
    })
}

fn entry_line_to_record(row: EntryLineRow) -> LineRecord {
    LineRecord::Modern(ModernLine {
        entry_id: row.entry_id.map(JournalEntryId::from),
        account_id: AccountId::from(row.account_id),
        debit: row.debit,
        credit: row.credit,
        entry_date: row.entry_date,
        posting_date: row.posting_date,
    })
}

fn journal_line_to_record(row: JournalLineRow) -> LineRecord {
    LineRecord::Legacy(LegacyLine {
        entry_id: row.entry_id.map(JournalEntryId::from),
        account_id: AccountId::from(row.account_id),
        debit_amount: row.debit_amount,
        credit_amount: row.credit_amount,
        entry_date: row.entry_date,
        posting_date: row.posting_date,
    })
}
