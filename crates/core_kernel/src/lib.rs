//! Core Kernel - Foundational types for the ledger reporting system
//!
//! This crate provides the building blocks shared by every other crate:
//! - Strongly-typed identifiers for tenants, accounts and journal data
//! - Report windows and timezone handling for as-of reporting
//! - The tenant session that scopes every remote call
//! - Port error and health types for adapters

pub mod identifiers;
pub mod period;
pub mod session;
pub mod ports;
pub mod error;

pub use identifiers::{TenantId, AccountId, JournalEntryId};
pub use period::{ReportWindow, WindowPosition, Timezone, TemporalError};
pub use session::{TenantSession, TenantContext};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
pub use error::CoreError;
