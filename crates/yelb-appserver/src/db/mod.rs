//! Database connection management and restaurant vote storage.

pub mod pool;
pub mod votes;

pub use pool::{connect_options, create_pool, verify_connection};
pub use votes::{MemoryVoteStore, PgVoteStore, Restaurant, Vote, VoteStore};
