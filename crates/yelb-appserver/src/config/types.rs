//! Server configuration types.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Main server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server binding configuration.
    #[serde(default)]
    pub server: ServerBindConfig,
    /// Page-view counter backend.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Restaurant vote database.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Request routing.
    #[serde(default)]
    pub routing: RoutingConfig,
}

/// Server binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerBindConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerBindConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerBindConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Counter cache configuration.
///
/// A non-empty `table` selects the DynamoDB backend; the Redis settings are then unused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis cluster seed endpoint.
    #[serde(default = "default_cache_endpoint")]
    pub endpoint: String,
    /// Redis cluster port.
    #[serde(default = "default_cache_port")]
    pub port: u16,
    /// Connect over TLS (certificates are not verified).
    #[serde(default)]
    pub tls: bool,
    /// Redis password.
    #[serde(default)]
    pub password: Option<String>,
    /// DynamoDB table holding the counter.
    #[serde(default)]
    pub table: Option<String>,
}

fn default_cache_endpoint() -> String {
    "redis".to_string()
}

fn default_cache_port() -> u16 {
    6379
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            endpoint: default_cache_endpoint(),
            port: default_cache_port(),
            tls: false,
            password: None,
            table: None,
        }
    }
}

impl CacheConfig {
    /// Seed node URL for the cluster client.
    pub fn redis_url(&self) -> String {
        if self.tls {
            format!("rediss://{}:{}/#insecure", self.endpoint, self.port)
        } else {
            format!("redis://{}:{}", self.endpoint, self.port)
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database host.
    #[serde(default = "default_db_host")]
    pub host: String,
    /// Database port.
    #[serde(default = "default_db_port")]
    pub port: u16,
    /// Database name.
    #[serde(default = "default_db_name")]
    pub name: String,
    /// Username, sent only together with a password.
    #[serde(default = "default_db_username")]
    pub username: String,
    /// Password. Empty means connect without credentials.
    #[serde(default)]
    pub password: String,
    /// Maximum connections in pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_host() -> String {
    "postgres".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "yelb".to_string()
}

fn default_db_username() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_db_host(),
            port: default_db_port(),
            name: default_db_name(),
            username: default_db_username(),
            password: String::new(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty, compact or json).
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Enable request logging.
    #[serde(default = "default_true")]
    pub log_requests: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_requests: true,
        }
    }
}

/// Where the dispatcher finds the API path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathSource {
    /// The `api_path` query parameter; the platform only delivers requests to `/`.
    #[default]
    Query,
    /// The request path itself.
    Path,
}

/// Request routing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default)]
    pub path_source: PathSource,
}
