//! Location slug to id resolution.
//!
//! Rotation slots address locations by slug while menu plans reference them
//! by id. [`LocationResolver`] loads the mapping lazily on first use and
//! reloads it whenever a lookup misses, so a newly added location is picked
//! up without a restart. A recreated location keeps its old id in the cache
//! until [`LocationResolver::invalidate`] is called.

use std::collections::HashMap;

use galley_core::types::DbId;
use galley_db::repositories::LocationRepo;
use sqlx::PgPool;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct LocationResolver {
    cache: RwLock<Option<HashMap<String, DbId>>>,
}

impl LocationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `slug` to a location id, or `None` if no such location exists.
    pub async fn resolve(&self, pool: &PgPool, slug: &str) -> Result<Option<DbId>, sqlx::Error> {
        if let Some(id) = self.cached(slug).await {
            return Ok(Some(id));
        }

        let fresh = self.reload(pool).await?;
        Ok(fresh.get(slug).copied())
    }

    /// Resolve several slugs at once. Unknown slugs are absent from the map.
    pub async fn resolve_many(
        &self,
        pool: &PgPool,
        slugs: &[&str],
    ) -> Result<HashMap<String, DbId>, sqlx::Error> {
        let mut resolved = HashMap::new();
        for &slug in slugs {
            if resolved.contains_key(slug) {
                continue;
            }
            if let Some(id) = self.resolve(pool, slug).await? {
                resolved.insert(slug.to_string(), id);
            }
        }
        Ok(resolved)
    }

    /// Drop the cached mapping so the next lookup reloads it.
    ///
    /// A cache hit is never re-checked, so callers that see a foreign key
    /// failure on a resolved id must invalidate before retrying.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    async fn cached(&self, slug: &str) -> Option<DbId> {
        self.cache
            .read()
            .await
            .as_ref()
            .and_then(|map| map.get(slug).copied())
    }

    async fn reload(&self, pool: &PgPool) -> Result<HashMap<String, DbId>, sqlx::Error> {
        let map: HashMap<String, DbId> = LocationRepo::list(pool)
            .await?
            .into_iter()
            .map(|l| (l.slug, l.id))
            .collect();

        tracing::debug!(locations = map.len(), "Location resolver reloaded");
        *self.cache.write().await = Some(map.clone());
        Ok(map)
    }
}
