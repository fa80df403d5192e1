//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, warn};

use core_kernel::TenantSession;

use crate::AppState;
use crate::auth::Claims;

/// Header carrying the request ID set by the request-id layer
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Authentication middleware
///
/// Validates JWT tokens, then opens the caller's tenant session for the
/// rest of the request. Handlers read the session, never the raw claims,
/// to scope ledger reads.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        warn!("Missing or invalid Authorization header");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let claims = crate::auth::validate_token(token, &state.config.jwt_secret).map_err(|e| {
        warn!("Token validation failed: {:?}", e);
        StatusCode::UNAUTHORIZED
    })?;

    let mut context = claims.tenant_context().map_err(|e| {
        warn!(user = %claims.sub, "Token carries no usable tenant: {}", e);
        StatusCode::UNAUTHORIZED
    })?;

    if let Some(request_id) = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
    {
        context = context.with_correlation_id(request_id);
    }

    let mut session = TenantSession::new();
    session.init(context);

    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Audit logging middleware
///
/// Logs all API requests for compliance and debugging
pub async fn audit_middleware(
    State(_state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let (user_id, tenant_id) = request
        .extensions()
        .get::<Claims>()
        .map(|c| (c.sub.clone(), c.tenant_id.clone()))
        .unwrap_or_else(|| ("anonymous".to_string(), "none".to_string()));

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        user = %user_id,
        tenant = %tenant_id,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
