//! Application configuration
//!
//! Configuration is assembled with the `config` crate from built-in defaults,
//! optional files under `config/`, and `SUBS__`-prefixed environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub pagination: PaginationConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Deadline for the storage work of one request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_request_timeout() -> u64 {
    30
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Idle connection timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Maximum lifetime of a connection in seconds
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,

    /// Number of ping attempts before giving up at startup
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,

    /// Delay between ping attempts in seconds
    #[serde(default = "default_connect_delay")]
    pub connect_delay_secs: u64,

    /// Apply embedded migrations at startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    4
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    900 // 15 minutes
}

fn default_max_lifetime() -> u64 {
    3600
}

fn default_connect_attempts() -> u32 {
    5
}

fn default_connect_delay() -> u64 {
    3
}

fn default_run_migrations() -> bool {
    true
}

/// Which storage adapter backs the repository
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Storage selection
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Postgres
}

/// Log output format
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "debug".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

/// Listing bounds
#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    /// Largest page size a client may request
    #[serde(default = "default_max_limit")]
    pub max_limit: i64,
}

fn default_max_limit() -> i64 {
    100
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Self::builder_with_defaults()?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with SUBS_ prefix
            .add_source(
                Environment::with_prefix("SUBS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Self::builder_with_defaults()?
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("SUBS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    fn builder_with_defaults(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("server.workers", default_workers() as i64)?
            .set_default("server.request_timeout_secs", default_request_timeout() as i64)?
            .set_default("database.url", "")?
            .set_default("database.max_connections", i64::from(default_max_connections()))?
            .set_default("database.min_connections", i64::from(default_min_connections()))?
            .set_default("storage.backend", "postgres")?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", "pretty")?
            .set_default("pagination.max_limit", default_max_limit())
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_limit: default_max_limit(),
        }
    }
}
