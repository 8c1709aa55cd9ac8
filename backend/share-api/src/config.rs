//! Configuration for the Share API
//!
//! Loads settings from:
//! 1. `variables.env` (the deployment config file)
//! 2. `.env` (local development)
//! 3. Process environment variables (which win over both files)

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use db_pool::env_utils::{first_env, parse_env_with_default};
use db_pool::DbConfig;
use std::fmt;
use std::str::FromStr;

/// Config file read before `.env`
pub const CONFIG_FILE: &str = "variables.env";

/// Variables consulted, in order, for the token signing secret
pub const SECRET_KEYS: &[&str] = &["SECRET", "JWT_SECRET"];

const SERVICE_NAME: &str = "share-api";

#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Persistence backend
    pub store: StoreConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// GraphQL configuration
    pub graphql: GraphQLConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!("Unknown STORE_BACKEND: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Present when `backend` is `Postgres`
    pub database: Option<DbConfig>,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_seconds: i64,
}

impl JwtConfig {
    /// Token lifetime; out-of-range values saturate and are refused at signing
    pub fn ttl(&self) -> Duration {
        Duration::try_seconds(self.expiry_seconds).unwrap_or(Duration::MAX)
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("expiry_seconds", &self.expiry_seconds)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GraphQLConfig {
    /// Serve the GraphiQL page at /playground
    pub playground: bool,
    /// Max query depth
    pub max_depth: usize,
    /// Max query complexity
    pub max_complexity: usize,
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            playground: true,
            max_depth: 10,
            max_complexity: 1000,
        }
    }
}

impl Config {
    /// Load configuration from the config file and environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::from_filename(CONFIG_FILE).ok();
        dotenvy::dotenv().ok();

        let graphql_defaults = GraphQLConfig::default();

        Ok(Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_with_default("SERVER_PORT", 4000),
                workers: parse_env_with_default("SERVER_WORKERS", num_cpus::get()),
            },
            store: Self::store_from_env()?,
            jwt: Self::jwt_from_env()?,
            graphql: GraphQLConfig {
                playground: parse_env_with_default("GRAPHQL_PLAYGROUND", graphql_defaults.playground),
                max_depth: parse_env_with_default("GRAPHQL_MAX_DEPTH", graphql_defaults.max_depth),
                max_complexity: parse_env_with_default(
                    "GRAPHQL_MAX_COMPLEXITY",
                    graphql_defaults.max_complexity,
                ),
            },
        })
    }

    fn store_from_env() -> Result<StoreConfig> {
        let backend = match std::env::var("STORE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StoreBackend::Postgres,
        };

        let database = match backend {
            StoreBackend::Postgres => Some(
                DbConfig::from_env(SERVICE_NAME)
                    .map_err(|e| anyhow!(e))
                    .context("DATABASE_URL (or MONGO_URI) must be set for the postgres backend")?,
            ),
            StoreBackend::Memory => None,
        };

        Ok(StoreConfig { backend, database })
    }

    /// Load JWT configuration from environment variables
    fn jwt_from_env() -> Result<JwtConfig> {
        let secret = first_env(SECRET_KEYS)
            .ok_or_else(|| anyhow!("SECRET (or JWT_SECRET) must be set"))?;

        let expiry_seconds = match std::env::var("JWT_EXPIRY_SECONDS") {
            Ok(raw) => parse_expiry_seconds(&raw)?,
            Err(_) => crypto_core::jwt::DEFAULT_TOKEN_TTL_SECONDS,
        };

        Ok(JwtConfig {
            secret,
            expiry_seconds,
        })
    }
}

/// Token lifetime must be positive and yield a representable expiry date
fn parse_expiry_seconds(raw: &str) -> Result<i64> {
    let seconds: i64 = raw
        .trim()
        .parse()
        .context("Invalid JWT_EXPIRY_SECONDS")?;

    if seconds <= 0 {
        return Err(anyhow!("JWT_EXPIRY_SECONDS must be positive, got {seconds}"));
    }

    Duration::try_seconds(seconds)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| anyhow!("JWT_EXPIRY_SECONDS is out of range: {seconds}"))?;

    Ok(seconds)
}
