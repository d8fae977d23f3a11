//! Local persisted key/value state.

use async_trait::async_trait;

use crate::result::AppResult;

/// Small string key/value store that survives restarts.
///
/// Holds the auth token mirror and the scan counter; cleared on logout.
#[async_trait]
pub trait LocalStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a key.
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Remove every key.
    async fn clear(&self) -> AppResult<()>;

    /// Read an integer counter, treating a missing or garbled value as zero.
    async fn get_counter(&self, key: &str) -> AppResult<u64> {
        Ok(self
            .get(key)
            .await?
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0))
    }

    /// Increment an integer counter by 1. Returns the new value.
    async fn incr(&self, key: &str) -> AppResult<u64> {
        let next = self.get_counter(key).await? + 1;
        self.set(key, &next.to_string()).await?;
        Ok(next)
    }
}
