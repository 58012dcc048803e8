//! Profile cache adapters.

mod sharded;

pub use sharded::ShardedProfileCache;
