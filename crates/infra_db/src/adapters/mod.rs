//! Domain Adapters
//!
//! Adapter implementations for domain ports, connecting the ledger port
//! traits to the PostgreSQL repository layer.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresLedgerAdapter;
//! use domain_ledger::{ResolverConfig, TrialBalanceResolver};
//!
//! let adapter = Arc::new(PostgresLedgerAdapter::new(pool));
//! let resolver = TrialBalanceResolver::standard(
//!     adapter.clone(),
//!     adapter.clone(),
//!     adapter,
//!     &ResolverConfig::default(),
//! );
//! ```

pub mod ledger;

pub use ledger::PostgresLedgerAdapter;
