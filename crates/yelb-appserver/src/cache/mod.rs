//! Page-view counter storage.
//!
//! Provides Redis Cluster and DynamoDB backends behind one counter interface.

pub mod r#trait;
pub mod cluster;
pub mod counter;
pub mod memory;
pub mod table;

pub use r#trait::{CounterError, CounterResult, CounterStore};
pub use cluster::{ClusterCache, ClusterCommands, RedisCluster};
pub use counter::{BackendSelection, CounterCache};
pub use memory::{MemoryCluster, MemoryTable};
pub use table::{CounterTable, DynamoTable, ManagedTableCache};

/// Key of the page-view counter in every backend.
pub const PAGE_VIEWS_KEY: &str = "pageviews";
