//! Database error types
//!
//! This module defines the error types that can occur during database operations,
//! and their translation into the port errors seen by the domain.

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// A table, column or function the query relies on does not exist
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The database role lacks a privilege the query needs
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The server is shutting down or not yet accepting queries
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// The statement was cancelled by `statement_timeout`
    #[error("Statement timed out: {0}")]
    Timeout(String),

    /// A row could not be converted into a domain value
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Generic SQL error
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    ///
    /// # Example
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Account", "ACC-123");
    /// assert!(error.to_string().contains("Account"));
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    /// Maps a PostgreSQL SQLSTATE code to an error variant
    ///
    /// See <https://www.postgresql.org/docs/current/errcodes-appendix.html>
    pub fn from_sql_state(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            // undefined_table, undefined_column, undefined_function
            "42P01" | "42703" | "42883" => DatabaseError::SchemaMismatch(message),
            // insufficient_privilege
            "42501" => DatabaseError::PermissionDenied(message),
            // too_many_connections
            "53300" => DatabaseError::ConnectionFailed(message),
            // admin_shutdown, crash_shutdown, cannot_connect_now
            "57P01" | "57P02" | "57P03" => DatabaseError::Unavailable(message),
            // query_canceled
            "57014" => DatabaseError::Timeout(message),
            _ => DatabaseError::QueryFailed(message),
        }
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }

    /// Checks if the backend schema differs from what the query expects
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, DatabaseError::SchemaMismatch(_))
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }
}

/// Converts SQLx errors to more specific DatabaseError variants
///
/// This function analyzes the SQLx error and maps it to the appropriate
/// DatabaseError variant based on the PostgreSQL error code.
impl From<&sqlx::Error> for DatabaseError {
    fn from(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => {
                DatabaseError::NotFound("Record not found".to_string())
            }
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Io(e) => DatabaseError::ConnectionFailed(e.to_string()),
            sqlx::Error::Database(db_err) => match db_err.code() {
                Some(code) => DatabaseError::from_sql_state(code.as_ref(), db_err.message()),
                None => DatabaseError::QueryFailed(db_err.message().to_string()),
            },
            sqlx::Error::ColumnNotFound(column) => {
                DatabaseError::SchemaMismatch(format!("column {} not returned", column))
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DatabaseError::SerializationError(error.to_string())
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(message) => PortError::NotFound {
                entity_type: "row".to_string(),
                id: message,
            },
            DatabaseError::SchemaMismatch(message) => PortError::schema_mismatch(message),
            DatabaseError::SerializationError(message) => PortError::transformation(message),
            DatabaseError::PermissionDenied(message) => PortError::unauthorized(message),
            DatabaseError::Unavailable(message) => PortError::service_unavailable(message),
            DatabaseError::Timeout(message) => PortError::timeout(message),
            DatabaseError::PoolExhausted => PortError::timeout("acquire pooled connection"),
            DatabaseError::ConnectionFailed(_) => PortError::connection(error.to_string()),
            other => PortError::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_objects_are_schema_mismatches() {
        for code in ["42P01", "42703", "42883"] {
            let error = DatabaseError::from_sql_state(code, "relation does not exist");
            assert!(error.is_schema_mismatch(), "{code}");
        }
        assert!(matches!(
            DatabaseError::from_sql_state("22012", "division by zero"),
            DatabaseError::QueryFailed(_)
        ));
        assert!(DatabaseError::from_sql_state("53300", "too many").is_connection_error());
    }

    #[test]
    fn test_refusals_and_cancellations_reach_the_port() {
        let denied: PortError =
            DatabaseError::from_sql_state("42501", "permission denied for function rpc_get_trial_balance").into();
        assert!(matches!(denied, PortError::Unauthorized { .. }));
        assert!(!denied.is_transient());

        let shutting_down: PortError =
            DatabaseError::from_sql_state("57P01", "terminating connection").into();
        assert!(matches!(shutting_down, PortError::ServiceUnavailable { .. }));

        let cancelled: PortError =
            DatabaseError::from_sql_state("57014", "canceling statement due to statement timeout").into();
        assert!(matches!(cancelled, PortError::Timeout { .. }));
        assert!(cancelled.is_transient());
    }

    #[test]
    fn test_port_error_translation() {
        let port: PortError = DatabaseError::SchemaMismatch("no gl_entry_lines".into()).into();
        assert!(port.is_schema_mismatch());

        let port: PortError = DatabaseError::PoolExhausted.into();
        assert!(port.is_transient());

        let port: PortError = DatabaseError::SerializationError("bad type".into()).into();
        assert!(matches!(port, PortError::Transformation { .. }));

        let port: PortError = DatabaseError::QueryFailed("boom".into()).into();
        assert!(matches!(port, PortError::Internal { .. }));
    }

    #[test]
    fn test_row_not_found_mapping() {
        let error = DatabaseError::from(&sqlx::Error::RowNotFound);
        assert!(error.is_not_found());
        assert!(PortError::from(error).is_not_found());
    }
}
