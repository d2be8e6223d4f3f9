//! Database-backed analytics cache.
//!
//! Precomputed view payloads are stored as JSON rows keyed by a hash of the
//! request dimensions. Reads are staleness-bounded: a valid entry older than
//! the caller's `max_age` is treated as a miss, and the read path never
//! blocks waiting for a recomputation. Writes go through the repository's
//! atomic invalidate-then-insert, retried a bounded number of times; a write
//! that ultimately fails leaves the previously valid entry in place.

mod keys;

pub use keys::CacheKeys;

use std::sync::Arc;

use chrono::{Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    db::{AnalyticsCacheRepo, DbError},
    models::{AnalyticsCacheEntry, CacheFilters, CacheType},
};

/// Attempts for the transactional invalidate-then-insert before giving up.
const PUT_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache write failed after {attempts} attempts: {source}")]
    WriteConflict { attempts: u32, source: DbError },

    #[error(transparent)]
    Db(#[from] DbError),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Result of a cache lookup.
#[derive(Debug)]
pub enum CacheLookupResult {
    /// A valid entry within `max_age` exists.
    Hit(AnalyticsCacheEntry),
    /// No valid entry, or the newest valid entry is too old.
    Miss,
}

/// Staleness-bounded cache over the analytics cache repository.
pub struct AnalyticsCacheService {
    repo: Arc<dyn AnalyticsCacheRepo>,
}

impl AnalyticsCacheService {
    pub fn new(repo: Arc<dyn AnalyticsCacheRepo>) -> Self {
        Self { repo }
    }

    /// Look up the newest valid entry for the dimension tuple.
    ///
    /// Repository errors are logged and reported as a miss so a flaky read
    /// degrades to a recomputation instead of failing the request.
    pub async fn get(
        &self,
        cache_type: CacheType,
        filters: &CacheFilters,
        max_age: Duration,
    ) -> CacheLookupResult {
        let cache_key = CacheKeys::analytics(cache_type, filters);
        match self.repo.get_latest_valid(&cache_key).await {
            Ok(Some(entry)) => {
                let age = entry.age(Utc::now());
                if age <= max_age {
                    tracing::debug!(
                        cache_key = %cache_key,
                        cache_type = %cache_type.as_str(),
                        age_secs = age.num_seconds(),
                        "Analytics cache hit"
                    );
                    CacheLookupResult::Hit(entry)
                } else {
                    tracing::debug!(
                        cache_key = %cache_key,
                        age_secs = age.num_seconds(),
                        max_age_secs = max_age.num_seconds(),
                        "Analytics cache entry too old, treating as miss"
                    );
                    CacheLookupResult::Miss
                }
            }
            Ok(None) => CacheLookupResult::Miss,
            Err(e) => {
                tracing::warn!(
                    cache_key = %cache_key,
                    error = %e,
                    "Analytics cache lookup error, treating as miss"
                );
                CacheLookupResult::Miss
            }
        }
    }

    /// Store a freshly computed payload, superseding any prior valid entry
    /// for the same dimension tuple.
    pub async fn put(
        &self,
        cache_type: CacheType,
        filters: CacheFilters,
        payload: serde_json::Value,
        total_count: i64,
    ) -> CacheResult<AnalyticsCacheEntry> {
        let cache_key = CacheKeys::analytics(cache_type, &filters);
        let entry = AnalyticsCacheEntry {
            id: Uuid::new_v4(),
            cache_key: cache_key.clone(),
            cache_type,
            filters,
            payload,
            total_count,
            valid: true,
            created_at: Utc::now(),
        };

        let mut last_err = None;
        for attempt in 1..=PUT_ATTEMPTS {
            match self.repo.put(&entry).await {
                Ok(()) => {
                    tracing::debug!(
                        cache_key = %cache_key,
                        cache_type = %cache_type.as_str(),
                        total_count,
                        attempt,
                        "Analytics cache entry stored"
                    );
                    return Ok(entry);
                }
                Err(e) => {
                    tracing::warn!(
                        cache_key = %cache_key,
                        attempt,
                        error = %e,
                        "Analytics cache write failed"
                    );
                    last_err = Some(e);
                }
            }
        }

        Err(CacheError::WriteConflict {
            attempts: PUT_ATTEMPTS,
            source: last_err.unwrap_or_else(|| {
                DbError::Internal("cache write failed without an error".to_string())
            }),
        })
    }

    /// Bulk-invalidate entries matching the given dimensions. `None`
    /// dimensions are wildcards.
    pub async fn invalidate(
        &self,
        cache_type: Option<CacheType>,
        filters: Option<&CacheFilters>,
    ) -> CacheResult<u64> {
        let invalidated = self.repo.invalidate(cache_type, filters).await?;
        tracing::info!(
            cache_type = cache_type.map(|t| t.as_str()),
            invalidated,
            "Analytics cache invalidated"
        );
        Ok(invalidated)
    }
}
