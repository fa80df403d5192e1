//! API configuration
//!
//! Loaded from `API_*` environment variables; anything unset keeps its
//! default.

use serde::Deserialize;

use core_kernel::Timezone;
use domain_ledger::{EmptyResultPolicy, ResolverConfig, DEFAULT_RPC_FUNCTION};
use infra_db::DatabaseConfig;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// Database URL
    pub database_url: String,
    /// Maximum pooled database connections
    pub database_max_connections: u32,
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Timezone used to resolve "today" when no as-of date is given
    pub timezone: Timezone,
    /// Stored function called by the RPC tier
    pub trial_balance_rpc: String,
    /// Accept an empty answer from the precomputed service instead of
    /// falling through to the next source
    pub accept_empty_service_result: bool,
    /// TrueType font with Arabic coverage for PDF export
    pub pdf_font_path: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            database_url: "postgres://localhost/ledger".to_string(),
            database_max_connections: 10,
            log_level: "info".to_string(),
            log_json: false,
            timezone: Timezone::default(),
            trial_balance_rpc: DEFAULT_RPC_FUNCTION.to_string(),
            accept_empty_service_result: false,
            pdf_font_path: None,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pool settings for the ledger database
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database_url).max_connections(self.database_max_connections)
    }

    /// Source chain settings for the trial balance resolver
    pub fn resolver_config(&self) -> ResolverConfig {
        let service_empty_result = if self.accept_empty_service_result {
            EmptyResultPolicy::Accept
        } else {
            EmptyResultPolicy::FallThrough
        };

        ResolverConfig {
            rpc_function: self.trial_balance_rpc.clone(),
            service_empty_result,
            ..ResolverConfig::default()
        }
    }
}
