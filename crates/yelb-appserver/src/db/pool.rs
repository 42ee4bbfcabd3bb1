//! Database pool management.

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
    PgPool,
};
use tracing::info;

/// Connection options for `config`.
///
/// Credentials are only sent when a password is configured.
pub fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.name)
        .ssl_mode(PgSslMode::Disable);

    if config.password.is_empty() {
        options
    } else {
        options
            .username(&config.username)
            .password(&config.password)
    }
}

/// Create a database connection pool and verify it.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    info!(
        host = %config.host,
        port = config.port,
        database = %config.name,
        "Creating database connection pool..."
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connect_options(config))
        .await
        .context("Failed to create database pool")?;

    // Verify connection
    verify_connection(&pool).await?;

    info!(
        max_connections = config.max_connections,
        "Database pool created"
    );

    Ok(pool)
}

/// Verify database connection.
pub async fn verify_connection(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .context("Database connection verification failed")?;

    info!("Database connection verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_options_without_password() {
        let config = DatabaseConfig::default();
        let options = connect_options(&config);

        assert_eq!(options.get_host(), "postgres");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_database(), Some("yelb"));
    }

    #[test]
    fn test_connect_options_with_password() {
        let config = DatabaseConfig {
            username: "yelb".into(),
            password: "secret".into(),
            ..DatabaseConfig::default()
        };
        let options = connect_options(&config);

        assert_eq!(options.get_username(), "yelb");
    }
}
