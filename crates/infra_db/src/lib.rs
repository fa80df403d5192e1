//! Infrastructure Database Layer
//!
//! PostgreSQL implementations of the ledger ports, using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: [`repositories`] hold the SQL
//! and return plain rows, [`adapters`] implement the domain port traits on
//! top of them and translate rows and errors.
//!
//! # Schema generations
//!
//! Journal lines are read from either `gl_entry_lines`/`gl_entries` or the
//! legacy `journal_lines`/`journal_entries`. Querying a table that does not
//! exist yields [`DatabaseError::SchemaMismatch`], which the resolver uses
//! to fall back to the other shape.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PostgresLedgerAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/ledger")).await?;
//! let adapter = PostgresLedgerAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_lazy_pool, create_pool, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use repositories::LedgerRepository;
pub use adapters::PostgresLedgerAdapter;
