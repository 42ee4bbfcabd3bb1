//! Shared application state.

use crate::cache::CounterCache;
use crate::config::{PathSource, ServerConfig};
use crate::db::{create_pool, PgVoteStore, VoteStore};
use anyhow::Result;
use std::sync::Arc;

/// Handles to the external stores, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub counter: Arc<CounterCache>,
    pub votes: Arc<dyn VoteStore>,
    pub path_source: PathSource,
}

impl AppState {
    /// Connect every store named by `config`. Any failure here is fatal to startup.
    pub async fn new(config: &ServerConfig) -> Result<Self> {
        let counter = CounterCache::connect(&config.cache).await?;
        let pool = create_pool(&config.database).await?;

        Ok(Self::from_parts(
            counter,
            PgVoteStore::new(pool),
            config.routing.path_source,
        ))
    }

    pub fn from_parts(
        counter: CounterCache,
        votes: impl VoteStore + 'static,
        path_source: PathSource,
    ) -> Self {
        Self {
            counter: Arc::new(counter),
            votes: Arc::new(votes),
            path_source,
        }
    }

    /// Release store connections.
    pub async fn close(&self) {
        self.counter.close().await;
        self.votes.close().await;
    }
}
