//! Router tests
//!
//! The database pool is lazy and points at a closed port, so every ledger
//! read goes through the mock ports installed with `with_resolver`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;

use core_kernel::{AccountId, TenantId};
use domain_ledger::{
    Account, AccountType, MockBalanceService, MockLedgerQuery, MockTrialBalanceRpc,
    ResolverConfig, TrialBalanceResolver, TrialBalanceRow,
};
use infra_db::{create_lazy_pool, DatabaseConfig};
use interface_api::auth::{create_token, permissions};
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppState};

const SECRET: &str = "router-test-secret";
const WINDOW: &str = "from_date=2024-01-01&as_of_date=2024-06-30";

fn row(code: &str, name: &str, account_type: AccountType, amount: Decimal) -> TrialBalanceRow {
    let account = Account::new(AccountId::new(), code, name, account_type);
    let mut row = TrialBalanceRow::for_account(&account);
    if account_type.is_debit_normal() {
        row.period_debit = amount;
    } else {
        row.period_credit = amount;
    }
    row.close();
    row
}

fn balanced_rows() -> Vec<TrialBalanceRow> {
    vec![
        row("1001", "Cash", AccountType::Asset, dec!(1500)),
        row("1200", "Receivables", AccountType::Asset, dec!(500)),
        row("4001", "Sales", AccountType::Revenue, dec!(2000)),
    ]
}

fn resolver(
    service: MockBalanceService,
    rpc: MockTrialBalanceRpc,
    ledger: MockLedgerQuery,
) -> TrialBalanceResolver {
    TrialBalanceResolver::standard(
        Arc::new(service),
        Arc::new(rpc),
        Arc::new(ledger),
        &ResolverConfig::default(),
    )
}

fn app(resolver: TrialBalanceResolver) -> Router {
    let config = ApiConfig {
        jwt_secret: SECRET.to_string(),
        ..ApiConfig::default()
    };
    let database = DatabaseConfig::new("postgres://ledger@127.0.0.1:1/ledger")
        .connect_timeout(Duration::from_millis(200));
    let pool = create_lazy_pool(&database).unwrap();

    create_router(AppState::new(pool, config).unwrap().with_resolver(resolver))
}

fn precomputed_app() -> Router {
    app(resolver(
        MockBalanceService::returning(balanced_rows()),
        MockTrialBalanceRpc::failing("unused"),
        MockLedgerQuery::new(),
    ))
}

fn token(roles: &[&str]) -> String {
    create_token(
        "user-1",
        TenantId::new(),
        roles.iter().map(|r| r.to_string()).collect(),
        SECRET,
        300,
    )
    .unwrap()
}

async fn get(app: Router, uri: &str, bearer: Option<&str>) -> Response {
    let mut request = Request::builder().uri(uri);
    if let Some(token) = bearer {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap()
}

async fn json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Health Tests
// ============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_is_public() {
        let response = get(precomputed_app(), "/health", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_reports_unreachable_database() {
        let response = get(precomputed_app(), "/health/ready", None).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json(response).await;
        assert_eq!(body["status"], "unavailable");
        assert_eq!(body["checks"][0]["adapter_id"], "postgres-ledger-adapter");
        assert_eq!(body["checks"][0]["status"], "unhealthy");
    }
}

// ============================================================================
// Auth Tests
// ============================================================================

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let response = get(precomputed_app(), "/api/v1/trial-balance", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_foreign_token_is_unauthorized() {
        let foreign = create_token("user-1", TenantId::new(), vec![], "other-secret", 300).unwrap();
        let response = get(precomputed_app(), "/api/v1/trial-balance", Some(&foreign)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_permission_is_forbidden() {
        let reader = token(&[permissions::LEDGER_READ]);
        let uri = format!("/api/v1/trial-balance/export/xlsx?{WINDOW}");

        let response = get(precomputed_app(), &uri, Some(&reader)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}

// ============================================================================
// Report Tests
// ============================================================================

mod report_tests {
    use super::*;

    #[tokio::test]
    async fn test_report_from_precomputed_service() {
        let reader = token(&[permissions::LEDGER_READ]);
        let uri = format!("/api/v1/trial-balance?{WINDOW}");

        let response = get(precomputed_app(), &uri, Some(&reader)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["from_date"], "2024-01-01");
        assert_eq!(body["as_of_date"], "2024-06-30");
        assert_eq!(body["source"], "precomputed_service");
        assert_eq!(body["rows"].as_array().unwrap().len(), 3);
        assert_eq!(body["is_balanced"], true);
        assert_eq!(body["totals"]["closing_debit"], "2000");
        assert!(body.get("notice").is_none());
    }

    #[tokio::test]
    async fn test_filter_and_search_apply_to_rows_and_totals() {
        let reader = token(&[permissions::LEDGER_READ]);
        let uri = format!("/api/v1/trial-balance?{WINDOW}&account_type=asset&search=CASH");

        let body = json(get(precomputed_app(), &uri, Some(&reader)).await).await;

        let rows = body["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["account_code"], "1001");
        assert_eq!(body["totals"]["closing_debit"], "1500");
        assert_eq!(body["is_balanced"], false);
    }

    #[tokio::test]
    async fn test_inverted_window_is_bad_request() {
        let reader = token(&[permissions::LEDGER_READ]);
        let uri = "/api/v1/trial-balance?from_date=2024-07-01&as_of_date=2024-06-30";

        let response = get(precomputed_app(), uri, Some(&reader)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_blank_filters_keep_every_row() {
        let reader = token(&[permissions::LEDGER_READ]);
        let uri = format!("/api/v1/trial-balance?{WINDOW}&account_type=&search=");

        let response = get(precomputed_app(), &uri, Some(&reader)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["rows"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_account_type_is_bad_request() {
        let reader = token(&[permissions::LEDGER_READ]);
        let uri = format!("/api/v1/trial-balance?{WINDOW}&account_type=contra");

        let response = get(precomputed_app(), &uri, Some(&reader)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_total_failure_returns_localized_notice() {
        let app = app(resolver(
            MockBalanceService::failing("service down"),
            MockTrialBalanceRpc::failing("function missing"),
            MockLedgerQuery::new().failing_accounts("database down"),
        ));
        let reader = token(&[permissions::LEDGER_READ]);
        let uri = format!("/api/v1/trial-balance?{WINDOW}&lang=ar");

        let response = get(app, &uri, Some(&reader)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert!(body["source"].is_null());
        assert_eq!(body["rows"].as_array().unwrap().len(), 0);
        assert_eq!(body["attempts"].as_array().unwrap().len(), 3);
        assert_eq!(body["language"], "ar");
        assert_eq!(body["notice"]["code"], "manual_aggregation_failed");
        assert!(body["notice"]["message"].as_str().unwrap().contains("ميزان المراجعة"));
    }
}

// ============================================================================
// Export Tests
// ============================================================================

mod export_tests {
    use super::*;

    #[tokio::test]
    async fn test_xlsx_download() {
        let exporter = token(&[permissions::REPORT_EXPORT]);
        let uri = format!("/api/v1/trial-balance/export/xlsx?{WINDOW}");

        let response = get(precomputed_app(), &uri, Some(&exporter)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"trial-balance-2024-06-30.xlsx\""
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn test_pdf_download_negotiates_language() {
        let admin = token(&["admin"]);
        let request = Request::builder()
            .uri(format!("/api/v1/trial-balance/export/pdf?{WINDOW}"))
            .header(header::AUTHORIZATION, format!("Bearer {}", admin))
            .header(header::ACCEPT_LANGUAGE, "ar-SA")
            .body(Body::empty())
            .unwrap();

        let response = precomputed_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        // No Unicode font is configured, so labels fall back to English
        assert_eq!(response.headers()[header::CONTENT_LANGUAGE], "en");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_unknown_format_is_bad_request() {
        let exporter = token(&[permissions::REPORT_EXPORT]);
        let uri = format!("/api/v1/trial-balance/export/csv?{WINDOW}");

        let response = get(precomputed_app(), &uri, Some(&exporter)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
