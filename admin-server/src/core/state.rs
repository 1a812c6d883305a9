use std::sync::Arc;

use crate::authz::AuthzEngine;
use crate::authz::hierarchy::find_inconsistent;
use crate::cache::{AuthzCache, MemoryCache};
use crate::core::{Config, Result, ServerError};
use crate::db::{AdminStore, AuthzStore, SqliteStore};
use crate::services::AdminService;

/// Server state - shared handles to every service
///
/// Cloning is cheap; every field is reference counted.
///
/// | Field | Description |
/// |-------|-------------|
/// | config | Immutable configuration |
/// | store | Read access for the authorization engine |
/// | cache | Authorization cache (in-process backend) |
/// | authz | Resolvers, reducers and invalidation hooks |
/// | admin | Grant and hierarchy edits |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Arc<dyn AuthzStore>,
    pub cache: MemoryCache,
    pub authz: AuthzEngine,
    pub admin: AdminService,
}

impl ServerState {
    /// Builds the state around any store implementing both contracts
    pub fn with_store<S>(config: Config, store: Arc<S>) -> Self
    where
        S: AdminStore + 'static,
    {
        let cache = MemoryCache::new();
        let authz_cache = AuthzCache::new(Arc::new(cache.clone()), config.cache_ttl);

        let read: Arc<dyn AuthzStore> = store.clone();
        let write: Arc<dyn AdminStore> = store;
        let authz = AuthzEngine::new(read.clone(), authz_cache);
        let admin = AdminService::new(write, authz.invalidator.clone());

        Self {
            config,
            store: read,
            cache,
            authz,
            admin,
        }
    }

    /// Opens the configured database and wires every service
    pub async fn initialize(config: &Config) -> Result<Self> {
        let store = SqliteStore::connect(&config.database_url)
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;

        let departments = store
            .list_departments()
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;
        let inconsistent = find_inconsistent(&departments);
        if !inconsistent.is_empty() {
            tracing::warn!(
                departments = ?inconsistent,
                "Department ancestor chains disagree with their parents"
            );
        }

        Ok(Self::with_store(config.clone(), Arc::new(store)))
    }

    /// Periodically drops expired cache entries
    pub fn start_background_tasks(&self) {
        let cache = self.cache.clone();
        let period = self
            .config
            .cache_purge_interval
            .max(std::time::Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                let purged = cache.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "Purged expired cache entries");
                }
            }
        });
    }
}
