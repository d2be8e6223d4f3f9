use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    db::error::DbResult,
    models::{AnalyticsCacheEntry, CacheFilters, CacheType},
};

/// Durable store for precomputed analytics payloads.
///
/// The single-validity invariant lives here: `put` must invalidate every
/// prior valid entry sharing the entry's (cache_type, period_type,
/// data_type, category, company, location_id) tuple and insert the new one
/// inside one transaction. That transaction is the only concurrency guard
/// between competing refreshes.
#[async_trait]
pub trait AnalyticsCacheRepo: Send + Sync {
    /// Most recently created valid entry for the key, regardless of age.
    async fn get_latest_valid(&self, cache_key: &str) -> DbResult<Option<AnalyticsCacheEntry>>;

    /// Atomic invalidate-then-insert.
    async fn put(&self, entry: &AnalyticsCacheEntry) -> DbResult<()>;

    /// Bulk-mark matching valid entries invalid. Dimensions set to `None`
    /// are wildcards. Returns the number of entries invalidated.
    async fn invalidate(
        &self,
        cache_type: Option<CacheType>,
        filters: Option<&CacheFilters>,
    ) -> DbResult<u64>;

    /// Physically delete entries created before `cutoff`, valid or not.
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> DbResult<u64>;

    /// All entries for a key, newest first. Used by tests and audits.
    async fn list_by_key(&self, cache_key: &str) -> DbResult<Vec<AnalyticsCacheEntry>>;
}
