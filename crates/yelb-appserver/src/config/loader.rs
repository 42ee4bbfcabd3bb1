//! Configuration loading utilities.

use super::types::ServerConfig;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Deployment variables understood in addition to the prefixed ones.
const LEGACY_VARS: &[(&str, &str)] = &[
    ("REDIS_SERVER_ENDPOINT", "cache.endpoint"),
    ("REDIS_SERVER_PORT", "cache.port"),
    ("REDIS_PASSWORD", "cache.password"),
    ("DYNAMODB_SERVER_TABLE", "cache.table"),
    ("YELB_DB_SERVER_ENDPOINT", "database.host"),
    ("YELB_DB_SERVER_PORT", "database.port"),
    ("YELB_DB_NAME", "database.name"),
    ("YELB_DB_USERNAME", "database.username"),
    ("YELB_DB_PASSWORD", "database.password"),
    ("PORT", "server.port"),
];

/// Prefix of structured variables, `YELB__SECTION__KEY`.
const ENV_PREFIX: &str = "YELB";

/// Only this exact value turns cache TLS on.
const LEGACY_TLS_VAR: &str = "REDIS_TLS";

/// Load configuration from various sources.
pub struct ConfigLoader {
    config_path: Option<String>,
    env: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            env: None,
        }
    }

    /// Set config file path.
    pub fn with_config_path(mut self, path: impl Into<String>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Read variables from `vars` instead of the process environment.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    fn var(&self, name: &str) -> Option<String> {
        let value = match &self.env {
            Some(env) => env.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Load configuration.
    pub fn load(&self) -> Result<ServerConfig> {
        let mut builder = config::Config::builder();

        // Add default values
        builder = builder.add_source(config::File::from_str(
            include_str!("defaults.toml"),
            config::FileFormat::Toml,
        ));

        // Add config file if specified
        if let Some(path) = &self.config_path {
            if Path::new(path).exists() {
                info!(path = %path, "Loading config file");
                builder = builder.add_source(config::File::with_name(path));
            }
        }

        // Add environment variables
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(self.env.clone()),
        );

        // Legacy deployment variables win over everything else
        for (var, key) in LEGACY_VARS {
            if let Some(value) = self.var(var) {
                builder = builder
                    .set_override(*key, value)
                    .with_context(|| format!("Invalid value for {}", var))?;
            }
        }
        if let Some(value) = self.var(LEGACY_TLS_VAR) {
            builder = builder
                .set_override("cache.tls", value == "true")
                .with_context(|| format!("Invalid value for {}", LEGACY_TLS_VAR))?;
        }

        let config = builder
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Load configuration from environment.
pub fn load_config() -> Result<ServerConfig> {
    let config_path = std::env::var("CONFIG_PATH").ok();

    let mut loader = ConfigLoader::new();
    if let Some(path) = config_path {
        loader = loader.with_config_path(path);
    }

    loader.load()
}
