//! Configuration loaded from the environment.
//!
//! A `.env` file in the working directory is read first (via `dotenvy`), then:
//!
//! - `DATABASE_URL`: PostgreSQL connection string. Unset means in-memory mode.
//! - `DATABASE_POOL_SIZE`: pool max size, default 8.
//! - `ADVISOR_HISTORY_LIMIT`: historical records per lookup, default and cap 10.
//! - `ADVISOR_LOOKUP_TIMEOUT_SECS`: per-lookup timeout before falling back, default 5.
//! - `ADVISOR_LOG_LEVEL`: default log level, default "info".
//! - `ADVISOR_LOG_FORMAT`: "pretty" or "json", default "pretty".

use std::env;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

/// Hard cap on historical records considered per request.
pub const MAX_HISTORY_LIMIT: usize = 10;

const DEFAULT_POOL_SIZE: usize = 8;
const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 5;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    url: SecretString,
    pub pool_size: usize,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>, pool_size: usize) -> Self {
        Self {
            url: SecretString::from(url.into()),
            pool_size,
        }
    }

    /// Connection string. Do not log this.
    pub fn url(&self) -> &str {
        self.url.expose_secret()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Top-level advisor configuration.
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    /// Present when a PostgreSQL store should back the collaborators.
    pub database: Option<DatabaseConfig>,
    /// Historical records fetched per request (never above [`MAX_HISTORY_LIMIT`]).
    pub history_limit: usize,
    /// Deadline for each collaborator lookup.
    pub lookup_timeout: Duration,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            database: None,
            history_limit: MAX_HISTORY_LIMIT,
            lookup_timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl AdvisorConfig {
    /// Load configuration from `.env` and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let pool_size = parse_var("DATABASE_POOL_SIZE", DEFAULT_POOL_SIZE)?;
        let database = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| DatabaseConfig::new(url, pool_size));

        let history_limit =
            parse_var("ADVISOR_HISTORY_LIMIT", MAX_HISTORY_LIMIT)?.min(MAX_HISTORY_LIMIT);
        let timeout_secs = parse_var("ADVISOR_LOOKUP_TIMEOUT_SECS", DEFAULT_LOOKUP_TIMEOUT_SECS)?;

        let log_level = env::var("ADVISOR_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let log_format = match env::var("ADVISOR_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "" | "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::Invalid {
                    key: "ADVISOR_LOG_FORMAT".to_string(),
                    message: format!("expected pretty or json, got {other}"),
                });
            }
        };

        let config = Self {
            database,
            history_limit,
            lookup_timeout: Duration::from_secs(timeout_secs),
            log_level,
            log_format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == 0 || self.history_limit > MAX_HISTORY_LIMIT {
            return Err(ConfigError::Invalid {
                key: "ADVISOR_HISTORY_LIMIT".to_string(),
                message: format!("must be between 1 and {MAX_HISTORY_LIMIT}"),
            });
        }

        if self.lookup_timeout.is_zero() || self.lookup_timeout > Duration::from_secs(120) {
            return Err(ConfigError::Invalid {
                key: "ADVISOR_LOOKUP_TIMEOUT_SECS".to_string(),
                message: "must be between 1 and 120 seconds".to_string(),
            });
        }

        if let Some(db) = &self.database {
            if db.pool_size == 0 {
                return Err(ConfigError::Invalid {
                    key: "DATABASE_POOL_SIZE".to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::Invalid {
                key: "ADVISOR_LOG_LEVEL".to_string(),
                message: format!("unknown level {other}"),
            }),
        }
    }

    /// The database settings, or an error naming the missing variable.
    pub fn require_database(&self) -> Result<&DatabaseConfig, ConfigError> {
        self.database
            .as_ref()
            .ok_or_else(|| ConfigError::MissingRequired("DATABASE_URL".to_string()))
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                key: key.to_string(),
                message: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}
