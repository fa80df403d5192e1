//! Repository implementations
//!
//! Repositories encapsulate SQL and return plain row types; mapping rows to
//! domain values happens in the adapters.

pub mod ledger;

pub use ledger::LedgerRepository;
