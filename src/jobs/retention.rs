//! Retention sweep for superseded cache entries.
//!
//! Invalidated entries stay queryable for audit until they pass the
//! retention window, then this worker deletes them for good.

use std::{sync::Arc, time::Instant};

use chrono::{Duration, Utc};

use crate::{config::AnalyticsConfig, db::DbPool};

/// Results from a single sweep.
#[derive(Debug, Default)]
pub struct SweepRunResult {
    pub entries_purged: u64,
    pub duration_ms: u64,
}

/// Run the retention sweep at the configured interval, indefinitely.
pub async fn start_retention_sweep_worker(db: Arc<DbPool>, config: AnalyticsConfig) {
    tracing::info!(
        retention_days = config.retention_days,
        interval_secs = config.sweep_interval_secs,
        "Starting cache retention sweep worker"
    );
    let interval = std::time::Duration::from_secs(config.sweep_interval_secs);

    loop {
        match run_sweep(&db, config.retention_days).await {
            Ok(result) if result.entries_purged > 0 => {
                tracing::info!(
                    entries_purged = result.entries_purged,
                    duration_ms = result.duration_ms,
                    "Cache retention sweep complete"
                );
            }
            Ok(_) => {
                tracing::debug!("Cache retention sweep complete, nothing to purge");
            }
            Err(e) => {
                tracing::error!(error = %e, "Error running cache retention sweep");
            }
        }

        tokio::time::sleep(interval).await;
    }
}

/// A single sweep pass: delete entries older than the retention window.
async fn run_sweep(db: &Arc<DbPool>, retention_days: u32) -> crate::db::DbResult<SweepRunResult> {
    let start = Instant::now();
    let cutoff = Utc::now() - Duration::days(retention_days as i64);
    let entries_purged = db.analytics_cache().purge_older_than(cutoff).await?;
    Ok(SweepRunResult {
        entries_purged,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::{
        db::tests::harness::create_test_db,
        models::{AnalyticsCacheEntry, CacheFilters, CacheType},
    };

    #[tokio::test]
    async fn sweep_purges_only_expired_entries() {
        let db = Arc::new(create_test_db().await);

        let old = AnalyticsCacheEntry {
            id: Uuid::new_v4(),
            cache_key: "tg:analytics:old".to_string(),
            cache_type: CacheType::AccountView,
            filters: CacheFilters::default(),
            payload: json!([]),
            total_count: 0,
            valid: true,
            created_at: Utc::now() - Duration::days(45),
        };
        let fresh = AnalyticsCacheEntry {
            id: Uuid::new_v4(),
            cache_key: "tg:analytics:fresh".to_string(),
            created_at: Utc::now(),
            ..old.clone()
        };
        db.analytics_cache().put(&old).await.expect("put old");
        db.analytics_cache().put(&fresh).await.expect("put fresh");

        let result = run_sweep(&db, 30).await.expect("sweep");
        assert_eq!(result.entries_purged, 1);

        let remaining = db
            .analytics_cache()
            .list_by_key("tg:analytics:fresh")
            .await
            .expect("list");
        assert_eq!(remaining.len(), 1);
    }
}
