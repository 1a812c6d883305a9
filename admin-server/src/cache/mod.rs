//! Authorization cache
//!
//! The cache backend is an injected [`CacheStore`] capability; the engine
//! only talks to it through [`AuthzCache`], which serializes whole values
//! under typed [`CacheKey`]s.
//!
//! Entries are only ever fully replaced or fully removed. The TTL is a
//! safety net; correctness relies on explicit invalidation.

pub mod keys;
pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use keys::{CacheKey, KeyFamily};
pub use memory::MemoryCache;

/// Default safety-net TTL for authorization entries
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),

    #[error("Cache value encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Key/value store contract used by the engine
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    async fn remove(&self, key: &str) -> CacheResult<()>;

    /// Removes every key starting with `prefix`, returning the count
    async fn remove_by_prefix(&self, prefix: &str) -> CacheResult<usize>;
}

/// Typed view over a [`CacheStore`]
///
/// Reads and writes never fail the caller: a broken store degrades to
/// cache misses and skipped writes, both logged.
#[derive(Clone)]
pub struct AuthzCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl AuthzCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let key_str = key.to_string();
        match self.store.get(&key_str).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(key = %key_str, error = %e, "Discarding undecodable cache entry");
                    if let Err(e) = self.store.remove(&key_str).await {
                        tracing::warn!(key = %key_str, error = %e, "Cache remove failed");
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key_str, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    pub async fn put<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let key_str = key.to_string();
        let result = match serde_json::to_string(value) {
            Ok(raw) => self.store.set(&key_str, raw, self.ttl).await,
            Err(e) => Err(CacheError::from(e)),
        };
        if let Err(e) = result {
            tracing::warn!(key = %key_str, error = %e, "Cache write failed");
        }
    }

    /// Removes every entry cached for `user_id`
    ///
    /// All removals are attempted; the first error is returned.
    pub async fn invalidate_user(&self, user_id: i64) -> CacheResult<()> {
        let mut first_error = None;
        for key in CacheKey::all_for_user(user_id) {
            if let Err(e) = self.store.remove(&key.to_string()).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Removes one family of entries for every user
    pub async fn invalidate_family(&self, family: KeyFamily) -> CacheResult<usize> {
        self.store.remove_by_prefix(family.prefix()).await
    }
}
