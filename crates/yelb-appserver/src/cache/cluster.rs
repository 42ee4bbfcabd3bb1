//! Redis Cluster counter backend.

use super::r#trait::{parse_count, CounterError, CounterResult, CounterStore};
use super::PAGE_VIEWS_KEY;
use crate::config::CacheConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use redis::cluster::ClusterClientBuilder;
use redis::cluster_async::ClusterConnection;
use redis::{AsyncCommands, ErrorKind, RedisError};
use tracing::{debug, info};

/// The two commands the counter needs from a key-value cluster.
#[async_trait]
pub trait ClusterCommands: Send + Sync {
    /// Atomic server-side increment by one.
    async fn incr(&self, key: &str) -> CounterResult<i64>;

    /// Plain read of a key.
    async fn get(&self, key: &str) -> CounterResult<Option<String>>;

    /// Drop the connection, if any.
    async fn close(&self);
}

/// Connection to a Redis Cluster.
pub struct RedisCluster {
    connection: Mutex<Option<ClusterConnection>>,
}

impl RedisCluster {
    /// Connect to the cluster and verify it answers `PING`.
    pub async fn connect(config: &CacheConfig) -> Result<Self> {
        let url = config.redis_url();
        info!(
            endpoint = %config.endpoint,
            port = config.port,
            tls = config.tls,
            "Connecting to redis cluster"
        );

        let mut builder = ClusterClientBuilder::new(vec![url]);
        if let Some(password) = config.password.as_deref().filter(|p| !p.is_empty()) {
            builder = builder.password(password.to_string());
        }

        let client = builder.build().context("Invalid redis cluster configuration")?;
        let mut connection = client
            .get_async_connection()
            .await
            .context("Failed to connect to redis cluster")?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut connection)
            .await
            .context("Redis cluster did not answer PING")?;

        info!("Redis cluster connection verified");
        Ok(Self {
            connection: Mutex::new(Some(connection)),
        })
    }

    fn connection(&self) -> CounterResult<ClusterConnection> {
        self.connection
            .lock()
            .clone()
            .ok_or_else(|| CounterError::Unavailable("redis connection closed".into()))
    }
}

#[async_trait]
impl ClusterCommands for RedisCluster {
    async fn incr(&self, key: &str) -> CounterResult<i64> {
        let mut conn = self.connection()?;
        conn.incr(key, 1).await.map_err(|e| classify(key, e))
    }

    async fn get(&self, key: &str) -> CounterResult<Option<String>> {
        let mut conn = self.connection()?;
        conn.get(key).await.map_err(|e| classify(key, e))
    }

    async fn close(&self) {
        if self.connection.lock().take().is_some() {
            debug!("Redis cluster connection closed");
        }
    }
}

/// Errors caused by the stored value are fatal, everything else is transport.
fn classify(key: &str, err: RedisError) -> CounterError {
    let bad_value = err.kind() == ErrorKind::TypeError
        || err.code() == Some("WRONGTYPE")
        || (err.kind() == ErrorKind::ResponseError && {
            let detail = err.to_string();
            detail.contains("not an integer") || detail.contains("overflow")
        });

    if bad_value {
        CounterError::corrupt(key, err.to_string())
    } else {
        CounterError::Unavailable(err.to_string())
    }
}

/// Counter backed by a key-value cluster with atomic increments.
///
/// The increment and the follow-up read are separate round trips. A reader racing
/// between them sees the post-increment value, which is all this counter promises.
pub struct ClusterCache<C = RedisCluster> {
    commands: C,
    key: String,
}

impl<C: ClusterCommands> ClusterCache<C> {
    pub fn new(commands: C) -> Self {
        Self::with_key(commands, PAGE_VIEWS_KEY)
    }

    pub fn with_key(commands: C, key: impl Into<String>) -> Self {
        Self {
            commands,
            key: key.into(),
        }
    }

    async fn get_count(&self) -> CounterResult<i64> {
        match self.commands.get(&self.key).await? {
            Some(raw) => parse_count(&self.key, &raw),
            None => Err(CounterError::Unavailable(format!(
                "key {} not initialized",
                self.key
            ))),
        }
    }
}

#[async_trait]
impl<C: ClusterCommands> CounterStore for ClusterCache<C> {
    async fn read(&self) -> CounterResult<i64> {
        self.get_count().await
    }

    async fn increment_and_read(&self) -> CounterResult<i64> {
        self.commands.incr(&self.key).await?;
        let count = self.get_count().await?;
        debug!(key = %self.key, count = count, "Cluster counter incremented");
        Ok(count)
    }

    async fn close(&self) {
        self.commands.close().await;
    }
}
