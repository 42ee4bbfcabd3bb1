//! Configuration validation.

use super::types::ServerConfig;
use crate::cache::BackendSelection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server address: {0}")]
    InvalidServerAddress(String),

    #[error("Invalid port for {0}: 0")]
    InvalidPort(&'static str),

    #[error("Cache endpoint must not be empty")]
    MissingCacheEndpoint,

    #[error("Database host must not be empty")]
    MissingDatabaseHost,

    #[error("Database name must not be empty")]
    MissingDatabaseName,

    #[error("Database pool needs at least one connection")]
    InvalidPoolSize,

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}")]
    InvalidLogFormat(String),
}

/// Validate server configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.server.socket_addr().is_err() {
        errors.push(ConfigError::InvalidServerAddress(format!(
            "{}:{}",
            config.server.host, config.server.port
        )));
    }

    if config.server.port == 0 {
        errors.push(ConfigError::InvalidPort("server"));
    }

    // Redis settings only matter for the cluster backend
    if BackendSelection::from_config(&config.cache) == BackendSelection::Cluster {
        if config.cache.endpoint.trim().is_empty() {
            errors.push(ConfigError::MissingCacheEndpoint);
        }
        if config.cache.port == 0 {
            errors.push(ConfigError::InvalidPort("cache"));
        }
    }

    if config.database.host.trim().is_empty() {
        errors.push(ConfigError::MissingDatabaseHost);
    }
    if config.database.name.trim().is_empty() {
        errors.push(ConfigError::MissingDatabaseName);
    }
    if config.database.port == 0 {
        errors.push(ConfigError::InvalidPort("database"));
    }
    if config.database.max_connections == 0 {
        errors.push(ConfigError::InvalidPoolSize);
    }

    let valid_levels = ["trace", "debug", "info", "warn", "warning", "error"];
    if !valid_levels.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(ConfigError::InvalidLogLevel(config.logging.level.clone()));
    }

    let valid_formats = ["pretty", "compact", "json"];
    if !valid_formats.contains(&config.logging.format.to_lowercase().as_str()) {
        errors.push(ConfigError::InvalidLogFormat(config.logging.format.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
