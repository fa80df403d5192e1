//! Tenant session
//!
//! Every tenant-scoped operation receives an explicit [`TenantContext`].
//! A [`TenantSession`] owns the "current organization" for a caller and has
//! an explicit lifecycle: it starts empty, is initialised once the caller's
//! tenant is known, and is cleared on sign-out. Asking an empty session for
//! a context is an error rather than a silent default.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::identifiers::TenantId;

/// The tenant scope passed to every port call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    /// The organization whose books are being read
    pub tenant_id: TenantId,
    /// User or system acting on behalf of the tenant
    pub initiated_by: Option<String>,
    /// Correlation ID for tracing across systems
    pub correlation_id: Option<String>,
}

impl TenantContext {
    /// Creates a context for the given tenant
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            initiated_by: None,
            correlation_id: None,
        }
    }

    /// Sets the acting user
    pub fn initiated_by(mut self, user: impl Into<String>) -> Self {
        self.initiated_by = Some(user.into());
        self
    }

    /// Sets the correlation ID
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }
}

/// Holder of the caller's current organization
#[derive(Debug, Clone, Default)]
pub struct TenantSession {
    current: Option<TenantContext>,
}

impl TenantSession {
    /// Creates an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialises the session for a tenant, replacing any previous one
    pub fn init(&mut self, context: TenantContext) {
        self.current = Some(context);
    }

    /// Ends the session
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Returns true if a tenant has been selected
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Returns the active tenant context
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NoActiveSession` if the session was never
    /// initialised or has been cleared
    pub fn context(&self) -> Result<&TenantContext, CoreError> {
        self.current
            .as_ref()
            .ok_or_else(|| CoreError::no_session("no organization selected"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_session_has_no_context() {
        let session = TenantSession::new();
        assert!(!session.is_active());
        assert!(matches!(session.context(), Err(CoreError::NoActiveSession(_))));
    }

    #[test]
    fn test_session_lifecycle() {
        let tenant = TenantId::new();
        let mut session = TenantSession::new();

        session.init(TenantContext::new(tenant).initiated_by("user-1"));
        assert_eq!(session.context().unwrap().tenant_id, tenant);

        session.clear();
        assert!(session.context().is_err());
    }

    #[test]
    fn test_context_builder() {
        let tenant = TenantId::new();
        let context = TenantContext::new(tenant)
            .initiated_by("user-1")
            .with_correlation_id("req-9");

        assert_eq!(context.tenant_id, tenant);
        assert_eq!(context.initiated_by.as_deref(), Some("user-1"));
        assert_eq!(context.correlation_id.as_deref(), Some("req-9"));
    }
}
