//! DynamoDB counter backend.
//!
//! The item is addressed by partition key `counter = "pageviews"` and keeps the
//! count as a string attribute named `pageviewscount`.
//!
//! # Lost updates
//!
//! There is no native increment here. [`ManagedTableCache::increment_and_read`] reads
//! the current value, adds one, and overwrites the attribute without a condition
//! expression. Two concurrent increments that read the same value both write
//! `value + 1`, so one of them is lost. This is the established behavior of the
//! table backend and is kept as is; use the cluster backend when exact counts matter.

use super::r#trait::{parse_count, CounterError, CounterResult, CounterStore};
use super::PAGE_VIEWS_KEY;
use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use tracing::{debug, info};

/// Partition key attribute of the counter item.
pub const PARTITION_KEY_ATTR: &str = "counter";

/// Item-level access the table backend needs.
#[async_trait]
pub trait CounterTable: Send + Sync {
    /// Fetch the stored count attribute, `None` when the item or attribute is absent.
    async fn get_count(&self) -> CounterResult<Option<AttributeValue>>;

    /// Unconditionally overwrite the count attribute.
    async fn put_count(&self, value: AttributeValue) -> CounterResult<()>;
}

/// A DynamoDB table holding the counter item.
pub struct DynamoTable {
    client: Client,
    table: String,
    key: String,
}

impl DynamoTable {
    /// Build a client from the ambient AWS configuration.
    pub async fn connect(table: &str) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        info!(table = table, region = ?sdk_config.region(), "Using dynamodb counter table");
        Self::new(Client::new(&sdk_config), table)
    }

    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            key: PAGE_VIEWS_KEY.to_string(),
        }
    }

    fn count_attr(&self) -> String {
        count_attribute(&self.key)
    }

    fn partition_key(&self) -> AttributeValue {
        AttributeValue::S(self.key.clone())
    }
}

/// Attribute name holding the count for `key`.
pub fn count_attribute(key: &str) -> String {
    format!("{}count", key)
}

#[async_trait]
impl CounterTable for DynamoTable {
    async fn get_count(&self) -> CounterResult<Option<AttributeValue>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(PARTITION_KEY_ATTR, self.partition_key())
            .send()
            .await
            .map_err(|e| CounterError::Unavailable(DisplayErrorContext(&e).to_string()))?;

        Ok(output
            .item()
            .and_then(|item| item.get(&self.count_attr()))
            .cloned())
    }

    async fn put_count(&self, value: AttributeValue) -> CounterResult<()> {
        self.client
            .update_item()
            .table_name(&self.table)
            .key(PARTITION_KEY_ATTR, self.partition_key())
            .update_expression(format!("SET {} = :c", self.count_attr()))
            .expression_attribute_values(":c", value)
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .map_err(|e| CounterError::Unavailable(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}

/// Counter backed by a managed table with read-then-overwrite increments.
pub struct ManagedTableCache<T = DynamoTable> {
    table: T,
    key: String,
}

impl<T: CounterTable> ManagedTableCache<T> {
    pub fn new(table: T) -> Self {
        Self {
            table,
            key: PAGE_VIEWS_KEY.to_string(),
        }
    }

    /// Decode the stored attribute. Only the string representation is valid.
    fn decode(&self, value: &AttributeValue) -> CounterResult<i64> {
        match value {
            AttributeValue::S(raw) => parse_count(&self.key, raw),
            other => Err(CounterError::corrupt(
                &self.key,
                format!("unexpected attribute type {:?}", other),
            )),
        }
    }
}

#[async_trait]
impl<T: CounterTable> CounterStore for ManagedTableCache<T> {
    async fn read(&self) -> CounterResult<i64> {
        match self.table.get_count().await? {
            Some(value) => self.decode(&value),
            None => Err(CounterError::Unavailable(format!(
                "key {} not initialized",
                self.key
            ))),
        }
    }

    async fn increment_and_read(&self) -> CounterResult<i64> {
        let current = match self.table.get_count().await? {
            Some(value) => self.decode(&value)?,
            None => 0,
        };

        // Last writer wins; see the module docs.
        let next = current
            .checked_add(1)
            .ok_or_else(|| CounterError::corrupt(&self.key, "counter overflow"))?;
        self.table
            .put_count(AttributeValue::S(next.to_string()))
            .await?;

        debug!(key = %self.key, count = next, "Table counter overwritten");
        Ok(next)
    }

    async fn close(&self) {}
}
