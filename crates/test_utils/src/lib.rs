//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! ledger reporting test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built chart of accounts, dates and identifiers
//! - `builders`: Builder patterns for journal lines, rows and mock ledgers
//! - `assertions`: Custom assertion helpers for trial balance types
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
