use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

// ============================================================
// Application Configuration
// ============================================================

/// Top-level configuration, layered from `config/default.toml`, an
/// optional `config/{RUN_MODE}.toml`, an optional `config/local.toml`,
/// and finally `SKYLARK__`-prefixed environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub locking: LockingConfig,
    #[serde(default)]
    pub reservation: ReservationConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiration_seconds")]
    pub jwt_expiration_seconds: u64,
}

/// Tuning for the per-resource reservation lease.
#[derive(Debug, Deserialize, Clone)]
pub struct LockingConfig {
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_lease_duration_ms")]
    pub lease_duration_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReservationConfig {
    /// How many booking references to try before giving up on a request.
    #[serde(default = "default_reference_attempts")]
    pub reference_attempts: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_search_ttl_seconds")]
    pub search_ttl_seconds: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_jwt_expiration_seconds() -> u64 {
    86_400
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    200
}

fn default_lease_duration_ms() -> u64 {
    5_000
}

fn default_reference_attempts() -> u32 {
    3
}

fn default_search_ttl_seconds() -> u64 {
    300
}

impl Default for LockingConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
            lease_duration_ms: default_lease_duration_ms(),
        }
    }
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            reference_attempts: default_reference_attempts(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            search_ttl_seconds: default_search_ttl_seconds(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = ConfigBuilder::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("SKYLARK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
