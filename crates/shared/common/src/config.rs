//! Process configuration.
//!
//! Built once at startup from environment variables and passed explicitly to
//! every component that needs it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Defaults
// =============================================================================

/// Default HTTP bind address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP port
pub const DEFAULT_SERVER_PORT: u16 = 3001;

/// Default database host
pub const DEFAULT_DATABASE_HOST: &str = "localhost";

/// Default database port
pub const DEFAULT_DATABASE_PORT: u16 = 5432;

/// Default database user
pub const DEFAULT_DATABASE_USER: &str = "postgres";

/// Default database name
pub const DEFAULT_DATABASE_NAME: &str = "app_db";

/// Default upper bound of the connection pool
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default lower bound of the connection pool
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;

/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Configuration loading errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl ServerConfig {
    /// Get the full bind address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
        }
    }
}

/// Database connection configuration.
#[derive(Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Create missing schema objects from entity definitions at startup.
    /// Unsafe for production.
    pub synchronize: bool,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("synchronize", &self.synchronize)
            .finish()
    }
}

impl DatabaseConfig {
    /// Postgres connection URL. Credentials are percent-encoded.
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            urlencoding::encode(&self.user),
            urlencoding::encode(&self.password),
            self.host,
            self.port,
            self.name
        )
    }

    /// Same as [`url`](Self::url) with the password masked, for logging.
    pub fn redacted_url(&self) -> String {
        format!(
            "postgres://{}:***@{}:{}/{}",
            urlencoding::encode(&self.user),
            self.host,
            self.port,
            self.name
        )
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// `EnvFilter` directive string
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl LogConfig {
    /// Read `RUST_LOG` and `LOG_FORMAT` from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Logging settings never fail to load; anything unset falls back to the
    /// defaults so that configuration errors can still be logged.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            filter: get("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            json: get("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            json: false,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    ///
    /// `DATABASE_PASSWORD` is mandatory; every other key falls back to a
    /// documented default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let password = get("DATABASE_PASSWORD").ok_or(ConfigError::Missing("DATABASE_PASSWORD"))?;

        let server = ServerConfig {
            host: get("HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            port: parse_or("PORT", get("PORT"), DEFAULT_SERVER_PORT)?,
        };

        let database = DatabaseConfig {
            host: get("DATABASE_HOST").unwrap_or_else(|| DEFAULT_DATABASE_HOST.to_string()),
            port: parse_or("DATABASE_PORT", get("DATABASE_PORT"), DEFAULT_DATABASE_PORT)?,
            user: get("DATABASE_USER").unwrap_or_else(|| DEFAULT_DATABASE_USER.to_string()),
            password,
            name: get("DATABASE_NAME").unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
            max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                get("DATABASE_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
            min_connections: parse_or(
                "DATABASE_MIN_CONNECTIONS",
                get("DATABASE_MIN_CONNECTIONS"),
                DEFAULT_MIN_CONNECTIONS,
            )?,
            synchronize: parse_flag("DATABASE_SYNCHRONIZE", get("DATABASE_SYNCHRONIZE"))?,
        };

        if database.min_connections > database.max_connections {
            return Err(ConfigError::Invalid {
                key: "DATABASE_MIN_CONNECTIONS",
                value: database.min_connections.to_string(),
            });
        }

        let log = LogConfig::from_lookup(&lookup);

        Ok(Self {
            server,
            database,
            log,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn parse_flag(key: &'static str, raw: Option<String>) -> Result<bool, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None => Ok(false),
        Some(v) if ["true", "1", "yes", "on"].iter().any(|t| v.eq_ignore_ascii_case(t)) => Ok(true),
        Some(v) if ["false", "0", "no", "off"].iter().any(|t| v.eq_ignore_ascii_case(t)) => {
            Ok(false)
        }
        Some(v) => Err(ConfigError::Invalid {
            key,
            value: v.to_string(),
        }),
    }
}
