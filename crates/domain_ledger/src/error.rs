//! Ledger domain errors

use core_kernel::{CoreError, PortError};
use thiserror::Error;

/// Errors that can occur in the ledger reporting domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A remote collaborator failed
    #[error("Port error: {0}")]
    Port(#[from] PortError),

    /// An account type string was not recognised
    #[error("Unknown account type: {0}")]
    UnknownAccountType(String),

    /// An entry status string was not recognised
    #[error("Unknown entry status: {0}")]
    UnknownEntryStatus(String),

    /// The configured stored function name is not a plain SQL identifier
    #[error("Invalid function name: {0}")]
    InvalidFunctionName(String),

    /// A kernel error (window, session)
    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}
