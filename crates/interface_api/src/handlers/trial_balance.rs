//! Trial balance handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Extension, Json,
};
use tracing::{info, instrument};

use core_kernel::{ReportWindow, TenantSession};
use domain_ledger::{
    calculate_totals, filter_by_type, search_rows, AccountTypeFilter, ResolvedTrialBalance,
    TrialBalanceRow,
};
use report_export::{ExportFormat, Labels, Language, ReportDocument};

use crate::auth::{permissions, require, Claims};
use crate::dto::trial_balance::{NoticeResponse, TrialBalanceQuery, TrialBalanceResponse};
use crate::{error::ApiError, AppState};

/// Returns the trial balance for the requested window
#[instrument(skip_all, fields(user = %claims.sub))]
pub async fn get_trial_balance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Extension(session): Extension<TenantSession>,
    Query(query): Query<TrialBalanceQuery>,
    headers: HeaderMap,
) -> Result<Json<TrialBalanceResponse>, ApiError> {
    require(&claims, permissions::LEDGER_READ)?;
    let language = request_language(&query, &headers)?;

    let (resolved, rows) = load_report(&state, &session, &query).await?;

    let notice = match resolved.notice {
        Some(code) => Some(NoticeResponse {
            code,
            message: Labels::load(language, &resolved.window)?.load_failure,
        }),
        None => None,
    };
    let totals = calculate_totals(&rows);

    Ok(Json(TrialBalanceResponse {
        from_date: resolved.window.from_date(),
        as_of_date: resolved.window.as_of_date(),
        language,
        rows,
        totals,
        is_balanced: totals.is_balanced(),
        source: resolved.source,
        attempts: resolved.attempts,
        notice,
    }))
}

/// Downloads the trial balance as `xlsx` or `pdf`
#[instrument(skip_all, fields(user = %claims.sub, format = %format))]
pub async fn export_trial_balance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Extension(session): Extension<TenantSession>,
    Path(format): Path<String>,
    Query(query): Query<TrialBalanceQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require(&claims, permissions::REPORT_EXPORT)?;
    let format: ExportFormat = format.parse()?;
    let language = request_language(&query, &headers)?;

    let (resolved, rows) = load_report(&state, &session, &query).await?;
    let window = resolved.window;

    let exporter = Arc::clone(&state.exporter);
    let file = tokio::task::spawn_blocking(move || {
        exporter.export(&ReportDocument::new(window, &rows), format, language)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Export task failed: {}", e)))??;

    info!(
        file = %file.file_name,
        language = %file.language,
        size = file.bytes.len(),
        "Exported trial balance"
    );

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
            (header::CONTENT_LANGUAGE, file.language.code().to_string()),
        ],
        file.bytes,
    ))
}

/// Resolves the report, then applies the type filter and search term
async fn load_report(
    state: &AppState,
    session: &TenantSession,
    query: &TrialBalanceQuery,
) -> Result<(ResolvedTrialBalance, Vec<TrialBalanceRow>), ApiError> {
    let ctx = session.context()?;
    let window = ReportWindow::resolve(query.from_date, query.as_of_date, &state.config.timezone)?;
    let filter: AccountTypeFilter = match query.account_type.as_deref() {
        Some(value) => value.parse()?,
        None => AccountTypeFilter::All,
    };

    let resolved = state.resolver.resolve(ctx, &window).await;

    let rows = filter_by_type(&resolved.rows, filter);
    let rows = match query.search.as_deref() {
        Some(term) => search_rows(&rows, term),
        None => rows,
    };

    Ok((resolved, rows))
}

/// Picks the label language from `lang`, falling back to `Accept-Language`
fn request_language(query: &TrialBalanceQuery, headers: &HeaderMap) -> Result<Language, ApiError> {
    if let Some(lang) = query.lang.as_deref() {
        return Ok(lang.parse()?);
    }

    Ok(headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|h| h.to_str().ok())
        .map(Language::negotiate)
        .unwrap_or_default())
}
