//! Service configuration
//!
//! All settings are loaded from environment variables:
//!
//! ## Counter store
//! - `REDIS_URL`: store URL (default: `redis://localhost:6379/0`, `memory://` for in-process)
//! - `STATS_COMMAND_TIMEOUT_MS`: per-command timeout (default: 1000)
//! - `STATS_CONNECT_TIMEOUT_MS`: connection timeout (default: 5000)
//!
//! ## Server
//! - `PORT`: listen port (default: 8012)
//! - `DEFAULT_TOP_LIMIT`: TOPORGS limit when none is given (default: 10)
//! - `LOG_FORMAT`: `json` for JSON logs, anything else for text
//!
//! ## Statistics
//! - `ALLOW_STATS_RESET`: allow the RESET command (default: false)
//! - `SEED_ON_STARTUP`: seed baseline counters at startup (default: true)
//! - `CATALOG_PATH`: reference catalog TOML file (default: bundled catalog)
//! - `STATS_RETENTION_DAYS`, `REAL_TIME_ENABLED`, `AGGREGATION_INTERVAL`:
//!   reported by CONFIG for downstream consumers

use crate::store::StoreConfig;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Invalid configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Statistics service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub store: StoreConfig,
    pub port: u16,
    pub allow_reset: bool,
    pub seed_on_startup: bool,
    pub catalog_path: Option<PathBuf>,
    pub default_top_limit: i64,
    pub retention_days: u32,
    pub real_time_enabled: bool,
    /// Seconds between downstream aggregation runs
    pub aggregation_interval: u64,
    pub log_format: LogFormat,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            store: StoreConfig::default(),
            port: 8012,
            allow_reset: false,
            seed_on_startup: true,
            catalog_path: None,
            default_top_limit: 10,
            retention_days: 90,
            real_time_enabled: true,
            aggregation_interval: 300,
            log_format: LogFormat::Text,
        }
    }
}

fn parse_flag(value: Option<String>, default: bool) -> bool {
    value.map(|v| v == "true" || v == "1").unwrap_or(default)
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|s| s.parse().ok()).unwrap_or(default)
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServiceConfig::default();

        let store = StoreConfig::with_url(
            lookup("REDIS_URL").unwrap_or_else(|| defaults.store.url.clone()),
        )
        .command_timeout(Duration::from_millis(parse_or(
            lookup("STATS_COMMAND_TIMEOUT_MS"),
            1000,
        )))
        .connection_timeout(Duration::from_millis(parse_or(
            lookup("STATS_CONNECT_TIMEOUT_MS"),
            5000,
        )));

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        ServiceConfig {
            store,
            port: parse_or(lookup("PORT"), defaults.port),
            allow_reset: parse_flag(lookup("ALLOW_STATS_RESET"), defaults.allow_reset),
            seed_on_startup: parse_flag(lookup("SEED_ON_STARTUP"), defaults.seed_on_startup),
            catalog_path: lookup("CATALOG_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            default_top_limit: parse_or(lookup("DEFAULT_TOP_LIMIT"), defaults.default_top_limit),
            retention_days: parse_or(lookup("STATS_RETENTION_DAYS"), defaults.retention_days),
            real_time_enabled: parse_flag(
                lookup("REAL_TIME_ENABLED"),
                defaults.real_time_enabled,
            ),
            aggregation_interval: parse_or(
                lookup("AGGREGATION_INTERVAL"),
                defaults.aggregation_interval,
            ),
            log_format,
        }
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.url.trim().is_empty() {
            return Err(ConfigError {
                field: "REDIS_URL",
                message: "must not be empty".to_string(),
            });
        }
        if self.port == 0 {
            return Err(ConfigError {
                field: "PORT",
                message: "must be between 1 and 65535".to_string(),
            });
        }
        if self.store.command_timeout.is_zero() {
            return Err(ConfigError {
                field: "STATS_COMMAND_TIMEOUT_MS",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Settings as reported by the CONFIG command, with credentials redacted
    pub fn report(&self) -> Value {
        json!({
            "store_url": self.store.redacted_url(),
            "command_timeout_ms": self.store.command_timeout.as_millis() as u64,
            "connect_timeout_ms": self.store.connection_timeout.as_millis() as u64,
            "port": self.port,
            "allow_reset": self.allow_reset,
            "seed_on_startup": self.seed_on_startup,
            "catalog_path": self.catalog_path.as_ref().map(|p| p.display().to_string()),
            "default_top_limit": self.default_top_limit,
            "stats_retention_days": self.retention_days,
            "real_time_enabled": self.real_time_enabled,
            "aggregation_interval": self.aggregation_interval,
        })
    }
}
