//! HTTP API Layer
//!
//! This crate provides the REST API for trial balance reporting using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: the report, its file exports and health checks
//! - **Middleware**: Authentication, tenant session, request IDs, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Routes
//!
//! | Method | Path | Permission |
//! |--------|------|------------|
//! | GET | `/health` | none |
//! | GET | `/health/ready` | none |
//! | GET | `/api/v1/trial-balance` | `ledger:read` |
//! | GET | `/api/v1/trial-balance/export/:format` | `report:export` |
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(pool, config)?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_ledger::TrialBalanceResolver;
use infra_db::PostgresLedgerAdapter;
use report_export::{ExportError, ReportExporter};

use crate::config::ApiConfig;
use crate::handlers::{health, trial_balance};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
    pub ledger: Arc<PostgresLedgerAdapter>,
    pub resolver: Arc<TrialBalanceResolver>,
    pub exporter: Arc<ReportExporter>,
}

impl AppState {
    /// Wires the Postgres adapter into the standard resolver chain
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Font` if `pdf_font_path` is set but unreadable
    pub fn new(pool: PgPool, config: ApiConfig) -> Result<Self, ExportError> {
        let ledger = Arc::new(PostgresLedgerAdapter::new(pool.clone()));
        let resolver = TrialBalanceResolver::standard(
            ledger.clone(),
            ledger.clone(),
            ledger.clone(),
            &config.resolver_config(),
        );
        let exporter = match &config.pdf_font_path {
            Some(path) => ReportExporter::new().with_pdf_font_file(path)?,
            None => ReportExporter::new(),
        };

        Ok(Self {
            pool,
            config,
            ledger,
            resolver: Arc::new(resolver),
            exporter: Arc::new(exporter),
        })
    }

    /// Replaces the resolver chain
    pub fn with_resolver(mut self, resolver: TrialBalanceResolver) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let report_routes = Router::new()
        .route("/", get(trial_balance::get_trial_balance))
        .route("/export/:format", get(trial_balance::export_trial_balance));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/trial-balance", report_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
