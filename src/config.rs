use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Configuration
// ============================================================================
//
// Loaded once at start-up from the environment (and a .env file if present).
//
//   ORDER_DB_URL          required
//   ORDER_PORT            gRPC port             (8080)
//   ACCOUNT_SERVICE_URL   account service       (http://account:9090)
//   CATALOG_SERVICE_URL   catalog service       (http://catalog:9091)
//   METRICS_PORT          /metrics + /health    (9100)
//   DB_MAX_CONNECTIONS    pool size             (10)
//   UPSTREAM_TIMEOUT_MS   collaborator deadline (5000)
//
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable '{0}'")]
    Missing(&'static str),

    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub grpc_port: u16,
    pub account_service_url: String,
    pub catalog_service_url: String,
    pub metrics_port: u16,
    pub db_max_connections: u32,
    pub upstream_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any name → value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("ORDER_DB_URL").ok_or(ConfigError::Missing("ORDER_DB_URL"))?;

        let config = Self {
            database_url,
            grpc_port: parse_or(&lookup, "ORDER_PORT", 8080)?,
            account_service_url: lookup("ACCOUNT_SERVICE_URL")
                .unwrap_or_else(|| "http://account:9090".to_string()),
            catalog_service_url: lookup("CATALOG_SERVICE_URL")
                .unwrap_or_else(|| "http://catalog:9091".to_string()),
            metrics_port: parse_or(&lookup, "METRICS_PORT", 9100)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            upstream_timeout: Duration::from_millis(parse_or(&lookup, "UPSTREAM_TIMEOUT_MS", 5000)?),
        };

        tracing::info!(
            grpc_port = config.grpc_port,
            metrics_port = config.metrics_port,
            account = %config.account_service_url,
            catalog = %config.catalog_service_url,
            "Configuration loaded"
        );

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
