pub mod memory;
pub mod redis_store;

use std::time::Duration;

use async_trait::async_trait;
use pocketeer_core::error::Result;

pub use crate::memory::MemoryStore;
pub use crate::redis_store::RedisStore;

/// Well-known keys shared by every process pointing at the same store.
pub mod keys {
    /// Pending request token.
    pub const REQUEST_TOKEN: &str = "code";
    pub const ACCESS_TOKEN: &str = "access_token";
    /// Serialized `BookmarkCollection`.
    pub const BOOKMARKS: &str = "bookmarks";
}

/// String-to-string store with optional per-write expiry.
///
/// Entries past their expiry read as `None`.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;
}
