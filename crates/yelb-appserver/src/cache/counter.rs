//! Page-view counter facade and backend selection.

use super::cluster::{ClusterCache, RedisCluster};
use super::memory::MemoryCluster;
use super::r#trait::{CounterResult, CounterStore};
use super::table::{DynamoTable, ManagedTableCache};
use crate::config::CacheConfig;
use crate::error::fatal;
use anyhow::Result;
use std::fmt;
use tracing::{error, info};

/// Which backend serves the counter for this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSelection {
    /// Redis Cluster with atomic `INCR`.
    Cluster,
    /// DynamoDB table with read-then-overwrite increments.
    ManagedTable { table: String },
}

impl BackendSelection {
    /// A configured table name wins; otherwise the cluster is used.
    pub fn from_config(config: &CacheConfig) -> Self {
        match config.table.as_deref().map(str::trim) {
            Some(table) if !table.is_empty() => Self::ManagedTable {
                table: table.to_string(),
            },
            _ => Self::Cluster,
        }
    }
}

impl fmt::Display for BackendSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cluster => write!(f, "redis-cluster"),
            Self::ManagedTable { table } => write!(f, "dynamodb:{}", table),
        }
    }
}

/// The page-view counter.
///
/// The backend is chosen once at construction and never re-evaluated. Recoverable
/// store failures are logged and read as zero; a corrupt stored value terminates
/// the process.
pub struct CounterCache {
    store: Box<dyn CounterStore>,
    backend: BackendSelection,
}

impl CounterCache {
    /// Connect the backend named by `config`.
    pub async fn connect(config: &CacheConfig) -> Result<Self> {
        let backend = BackendSelection::from_config(config);
        info!(backend = %backend, "Selecting counter backend");

        let store: Box<dyn CounterStore> = match &backend {
            BackendSelection::Cluster => {
                Box::new(ClusterCache::new(RedisCluster::connect(config).await?))
            }
            BackendSelection::ManagedTable { table } => {
                Box::new(ManagedTableCache::new(DynamoTable::connect(table).await))
            }
        };

        Ok(Self { store, backend })
    }

    /// Wrap an already constructed store.
    pub fn new(store: impl CounterStore + 'static, backend: BackendSelection) -> Self {
        Self {
            store: Box::new(store),
            backend,
        }
    }

    /// Cluster semantics over an in-process store.
    pub fn in_memory() -> Self {
        Self::new(
            ClusterCache::new(MemoryCluster::new()),
            BackendSelection::Cluster,
        )
    }

    pub fn backend(&self) -> &BackendSelection {
        &self.backend
    }

    /// Current value, or zero when the store cannot answer.
    pub async fn read(&self) -> i64 {
        settle("read", self.store.read().await)
    }

    /// Increment by one and return the new value, or zero when the store cannot answer.
    pub async fn increment_and_read(&self) -> i64 {
        settle("increment", self.store.increment_and_read().await)
    }

    pub async fn close(&self) {
        self.store.close().await;
        info!(backend = %self.backend, "Counter cache closed");
    }
}

fn settle(operation: &str, result: CounterResult<i64>) -> i64 {
    match result {
        Ok(count) => count,
        Err(e) if e.is_fatal() => fatal(&e),
        Err(e) => {
            error!(operation = operation, error = %e, "unable to get pageviews");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_selected_without_table() {
        let config = CacheConfig::default();
        assert_eq!(BackendSelection::from_config(&config), BackendSelection::Cluster);
    }

    #[test]
    fn test_blank_table_selects_cluster() {
        let config = CacheConfig {
            table: Some("   ".into()),
            ..CacheConfig::default()
        };
        assert_eq!(BackendSelection::from_config(&config), BackendSelection::Cluster);
    }

    #[test]
    fn test_table_selects_managed_table() {
        let config = CacheConfig {
            table: Some("yelb-pageviews".into()),
            ..CacheConfig::default()
        };
        assert_eq!(
            BackendSelection::from_config(&config),
            BackendSelection::ManagedTable {
                table: "yelb-pageviews".into()
            }
        );
    }

    #[tokio::test]
    async fn test_unset_counter_reads_zero() {
        let cache = CounterCache::in_memory();
        assert_eq!(cache.read().await, 0);
    }

    #[tokio::test]
    async fn test_closed_store_degrades_to_zero() {
        let cache = CounterCache::in_memory();
        assert_eq!(cache.increment_and_read().await, 1);
        cache.close().await;
        assert_eq!(cache.increment_and_read().await, 0);
        assert_eq!(cache.read().await, 0);
    }
}
