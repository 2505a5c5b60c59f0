use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_attempts: u32,
    pub retry_delay_secs: u64,
}

impl DatabaseConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// Argon2 work factor.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub filter: String,
    pub json: bool,
    /// When set, logs are also appended to `<dir>/server.log`.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub hashing: HashConfig,
    pub log: LogConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let url = match get("DATABASE_URL") {
            Some(url) => url,
            None => format!(
                "postgres://{}:{}@{}:{}/{}?sslmode=disable",
                or("POSTGRES_USER", "user"),
                or("POSTGRES_PASSWORD", "password"),
                or("POSTGRES_HOST", "localhost"),
                or("POSTGRES_PORT", "5432"),
                or("POSTGRES_DB", "postgres"),
            ),
        };

        let defaults = HashConfig::default();
        let database = DatabaseConfig {
            url,
            max_connections: parse(&get, "DB_MAX_CONNECTIONS", 10)?,
            connect_attempts: parse(&get, "DB_CONNECT_ATTEMPTS", 10)?.max(1),
            retry_delay_secs: parse(&get, "DB_RETRY_DELAY_SECS", 3)?,
        };
        let hashing = HashConfig {
            memory_kib: parse(&get, "ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse(&get, "ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: parse(&get, "ARGON2_PARALLELISM", defaults.parallelism)?,
        };
        let log = LogConfig {
            filter: or(
                "RUST_LOG",
                "booking_service=debug,tower_http=info,axum=info,sqlx=warn",
            ),
            json: get("LOG_FORMAT").map(|v| v == "json").unwrap_or(false),
            dir: get("LOG_DIR").filter(|d| !d.is_empty()).map(PathBuf::from),
        };

        Ok(Self {
            host: or("APP_HOST", "0.0.0.0"),
            port: parse(&get, "APP_PORT", 8000)?,
            database,
            hashing,
            log,
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn parse<F, T>(get: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        None => Ok(default),
    }
}
