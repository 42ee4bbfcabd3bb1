//! In-process counter stores for local runs and tests.

use super::cluster::ClusterCommands;
use super::r#trait::{CounterError, CounterResult};
use super::table::CounterTable;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// In-memory stand-in for a Redis Cluster.
///
/// `incr` is atomic per key, like the server-side command.
#[derive(Default)]
pub struct MemoryCluster {
    entries: DashMap<String, String>,
    closed: AtomicBool,
}

impl MemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw value under `key`.
    pub fn seed(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn check_open(&self) -> CounterResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(CounterError::Unavailable("memory cluster closed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ClusterCommands for MemoryCluster {
    async fn incr(&self, key: &str) -> CounterResult<i64> {
        self.check_open()?;

        // The entry guard holds the shard lock for the whole read-modify-write.
        let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| "0".into());
        let current: i64 = entry
            .parse()
            .map_err(|_| CounterError::corrupt(key, "value is not an integer or out of range"))?;
        let next = current
            .checked_add(1)
            .ok_or_else(|| CounterError::corrupt(key, "increment or decrement would overflow"))?;
        *entry = next.to_string();

        debug!(key = key, value = next, "Memory cluster incr");
        Ok(next)
    }

    async fn get(&self, key: &str) -> CounterResult<Option<String>> {
        self.check_open()?;
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// In-memory stand-in for a single managed-table item.
#[derive(Default)]
pub struct MemoryTable {
    item: Mutex<Option<AttributeValue>>,
    writes: Mutex<Vec<AttributeValue>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `value` already stored.
    pub fn with_value(value: AttributeValue) -> Self {
        Self {
            item: Mutex::new(Some(value)),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Every value written so far, oldest first.
    pub fn writes(&self) -> Vec<AttributeValue> {
        self.writes.lock().clone()
    }
}

#[async_trait]
impl CounterTable for MemoryTable {
    async fn get_count(&self) -> CounterResult<Option<AttributeValue>> {
        Ok(self.item.lock().clone())
    }

    async fn put_count(&self, value: AttributeValue) -> CounterResult<()> {
        self.writes.lock().push(value.clone());
        *self.item.lock() = Some(value);
        Ok(())
    }
}
