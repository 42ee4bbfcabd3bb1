//! Restaurant vote storage.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use sqlx::PgPool;
use std::fmt;
use tracing::{debug, error, info};

/// The restaurants that can be voted for, in listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Restaurant {
    Ihop,
    Chipotle,
    Outback,
    BucaDiBeppo,
}

impl Restaurant {
    /// Every restaurant, in the order votes are listed.
    pub const ALL: [Restaurant; 4] = [
        Restaurant::Ihop,
        Restaurant::Chipotle,
        Restaurant::Outback,
        Restaurant::BucaDiBeppo,
    ];

    /// Row name in the `restaurants` table.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Ihop => "ihop",
            Self::Chipotle => "chipotle",
            Self::Outback => "outback",
            Self::BucaDiBeppo => "bucadibeppo",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.key() == key)
    }
}

impl fmt::Display for Restaurant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One entry of the vote listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vote {
    pub name: String,
    pub value: i64,
}

/// Per-restaurant vote counts.
///
/// Reads never fail: any store error is logged and reads as zero.
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Current count for `restaurant`.
    async fn read_count(&self, restaurant: Restaurant) -> i64;

    /// Add one vote, then read the count back with a separate statement.
    async fn increment_and_read_count(&self, restaurant: Restaurant) -> i64;

    /// Counts for every restaurant, read one at a time in [`Restaurant::ALL`] order.
    async fn list_votes(&self) -> Vec<Vote> {
        let mut votes = Vec::with_capacity(Restaurant::ALL.len());
        for restaurant in Restaurant::ALL {
            votes.push(Vote {
                name: restaurant.key().to_string(),
                value: self.read_count(restaurant).await,
            });
        }
        votes
    }

    /// Release pooled connections.
    async fn close(&self);
}

const READ_COUNT_SQL: &str = "SELECT count FROM restaurants WHERE name = $1";
const INCREMENT_COUNT_SQL: &str = "UPDATE restaurants SET count = count + 1 WHERE name = $1";

/// Vote store backed by the Postgres `restaurants` table.
///
/// The update and the follow-up read are not wrapped in a transaction, so a
/// concurrent voter's increment may already be included in the returned count.
pub struct PgVoteStore {
    pool: PgPool,
}

impl PgVoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VoteStore for PgVoteStore {
    async fn read_count(&self, restaurant: Restaurant) -> i64 {
        let result = sqlx::query_scalar::<_, i32>(READ_COUNT_SQL)
            .bind(restaurant.key())
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(count) => i64::from(count),
            Err(e) => {
                error!(restaurant = %restaurant, error = %e, "unable to read restaurant count");
                0
            }
        }
    }

    async fn increment_and_read_count(&self, restaurant: Restaurant) -> i64 {
        let result = sqlx::query(INCREMENT_COUNT_SQL)
            .bind(restaurant.key())
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => {
                debug!(restaurant = %restaurant, rows = done.rows_affected(), "Vote recorded");
                self.read_count(restaurant).await
            }
            Err(e) => {
                error!(restaurant = %restaurant, error = %e, "unable to update restaurant count");
                0
            }
        }
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// In-process vote store for local runs and tests.
///
/// Only restaurants that were seeded or voted for have a row; others read as zero.
#[derive(Default)]
pub struct MemoryVoteStore {
    counts: DashMap<Restaurant, i64>,
}

impl MemoryVoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate counts.
    pub fn with_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (Restaurant, i64)>,
    {
        Self {
            counts: counts.into_iter().collect(),
        }
    }
}

#[async_trait]
impl VoteStore for MemoryVoteStore {
    async fn read_count(&self, restaurant: Restaurant) -> i64 {
        self.counts.get(&restaurant).map(|c| *c).unwrap_or(0)
    }

    async fn increment_and_read_count(&self, restaurant: Restaurant) -> i64 {
        let mut count = self.counts.entry(restaurant).or_insert(0);
        *count += 1;
        *count
    }

    async fn close(&self) {}
}
