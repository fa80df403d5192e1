//! Ledger repository implementation
//!
//! Read-only access to the chart of accounts, posted journal lines in both
//! schema generations, the precomputed trial balance table and the trial
//! balance stored function.
//!
//! Queries are built at runtime because the legacy and current journal
//! tables are not guaranteed to both exist in a given database.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use domain_ledger::{EntryStatus, LineShape};

use crate::error::DatabaseError;

/// Row of `gl_accounts`
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub name_ar: Option<String>,
    pub account_type: String,
    pub allow_posting: bool,
    pub is_active: bool,
}

/// Line of `gl_entry_lines` joined to its posted `gl_entries` parent
#[derive(Debug, Clone, FromRow)]
pub struct EntryLineRow {
    pub entry_id: Option<Uuid>,
    pub account_id: Uuid,
    pub debit: Option<Decimal>,
    pub credit: Option<Decimal>,
    pub entry_date: Option<NaiveDate>,
    pub posting_date: Option<NaiveDate>,
}

/// Line of `journal_lines` joined to its posted `journal_entries` parent
#[derive(Debug, Clone, FromRow)]
pub struct JournalLineRow {
    pub entry_id: Option<Uuid>,
    pub account_id: Uuid,
    pub debit_amount: Option<Decimal>,
    pub credit_amount: Option<Decimal>,
    pub entry_date: Option<NaiveDate>,
    pub posting_date: Option<NaiveDate>,
}

/// A trial balance row as stored in the cache table or returned by the
/// stored function
#[derive(Debug, Clone, FromRow)]
pub struct TrialBalanceRecord {
    pub account_code: String,
    pub account_name: String,
    pub account_name_ar: Option<String>,
    pub account_type: String,
    pub opening_debit: Option<Decimal>,
    pub opening_credit: Option<Decimal>,
    pub period_debit: Option<Decimal>,
    pub period_credit: Option<Decimal>,
    pub closing_debit: Option<Decimal>,
    pub closing_credit: Option<Decimal>,
}

const TRIAL_BALANCE_COLUMNS: &str = "account_code, account_name, account_name_ar, account_type, \
     opening_debit, opening_credit, period_debit, period_credit, closing_debit, closing_credit";

/// Repository over the ledger tables of one database
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active accounts that allow posting, ordered by code
    pub async fn postable_accounts(&self, tenant_id: Uuid) -> Result<Vec<AccountRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, code, name, name_ar, account_type, allow_posting, is_active
            FROM gl_accounts
            WHERE tenant_id = $1
              AND allow_posting = true
              AND is_active = true
            ORDER BY code
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        debug!(tenant = %tenant_id, accounts = rows.len(), "Fetched postable accounts");
        Ok(rows)
    }

    /// Lines of posted entries from the current journal schema
    pub async fn entry_lines(&self, tenant_id: Uuid) -> Result<Vec<EntryLineRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, EntryLineRow>(
            r#"
            SELECT l.entry_id, l.account_id, l.debit, l.credit, e.entry_date, e.posting_date
            FROM gl_entry_lines l
            JOIN gl_entries e ON e.id = l.entry_id
            WHERE e.tenant_id = $1
              AND e.status::text = $2
            "#,
        )
        .bind(tenant_id)
        .bind(EntryStatus::Posted.column_value(LineShape::Modern))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        debug!(tenant = %tenant_id, lines = rows.len(), "Fetched gl_entry_lines");
        Ok(rows)
    }

    /// Lines of posted entries from the legacy journal schema
    pub async fn journal_lines(&self, tenant_id: Uuid) -> Result<Vec<JournalLineRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, JournalLineRow>(
            r#"
            SELECT l.entry_id, l.account_id, l.debit_amount, l.credit_amount,
                   e.entry_date, e.posting_date
            FROM journal_lines l
            JOIN journal_entries e ON e.id = l.entry_id
            WHERE e.tenant_id = $1
              AND e.status::text = $2
            "#,
        )
        .bind(tenant_id)
        .bind(EntryStatus::Posted.column_value(LineShape::Legacy))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        debug!(tenant = %tenant_id, lines = rows.len(), "Fetched journal_lines");
        Ok(rows)
    }

    /// Precomputed rows for exactly this window
    pub async fn cached_trial_balance(
        &self,
        tenant_id: Uuid,
        from_date: NaiveDate,
        as_of_date: NaiveDate,
    ) -> Result<Vec<TrialBalanceRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {TRIAL_BALANCE_COLUMNS} FROM gl_trial_balance_cache \
             WHERE tenant_id = $1 AND from_date = $2 AND as_of_date = $3 \
             ORDER BY account_code"
        );

        sqlx::query_as::<_, TrialBalanceRecord>(&sql)
            .bind(tenant_id)
            .bind(from_date)
            .bind(as_of_date)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::from(&e))
    }

    /// Calls a trial balance stored function
    ///
    /// `function` is interpolated into the statement and must already be a
    /// validated SQL identifier.
    pub async fn call_trial_balance(
        &self,
        function: &str,
        tenant_id: Uuid,
        as_of_date: NaiveDate,
    ) -> Result<Vec<TrialBalanceRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {TRIAL_BALANCE_COLUMNS} FROM {function}(p_tenant => $1, p_as_of_date => $2)"
        );

        sqlx::query_as::<_, TrialBalanceRecord>(&sql)
            .bind(tenant_id)
            .bind(as_of_date)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::from(&e))
    }

    /// Round-trips a trivial query
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| DatabaseError::from(&e))
    }
}
