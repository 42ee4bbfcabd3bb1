//! Counter store trait definition.

use async_trait::async_trait;

/// Counter operation result.
pub type CounterResult<T> = Result<T, CounterError>;

/// Counter store errors.
#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    /// The store could not be reached or rejected the command.
    #[error("Counter store unavailable: {0}")]
    Unavailable(String),

    /// The stored value cannot be interpreted as a counter.
    #[error("Corrupt counter value for key {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

impl CounterError {
    /// Corrupt values must never be guessed at; everything else degrades.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }

    pub(crate) fn corrupt(key: &str, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// A backing store able to hold the page-view counter.
///
/// Implementations report every failure; the [`CounterCache`](super::CounterCache)
/// facade decides whether a failure degrades to zero or terminates the process.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Read the current value. An absent key reads as zero.
    async fn read(&self) -> CounterResult<i64>;

    /// Increase the counter by one and return the new value.
    async fn increment_and_read(&self) -> CounterResult<i64>;

    /// Release any held connection.
    async fn close(&self);
}

/// Parse a stored counter value.
pub(crate) fn parse_count(key: &str, raw: &str) -> CounterResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| CounterError::corrupt(key, format!("'{}' is not an integer: {}", raw, e)))
}
