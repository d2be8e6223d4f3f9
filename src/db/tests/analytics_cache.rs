use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use super::harness::create_test_db;
use crate::models::{AnalyticsCacheEntry, CacheFilters, CacheType, Granularity};

fn entry(cache_key: &str, cache_type: CacheType, filters: CacheFilters) -> AnalyticsCacheEntry {
    AnalyticsCacheEntry {
        id: Uuid::new_v4(),
        cache_key: cache_key.to_string(),
        cache_type,
        filters,
        payload: json!({"rows": []}),
        total_count: 0,
        valid: true,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn put_leaves_exactly_one_valid_entry() {
    let db = create_test_db().await;
    let repo = db.analytics_cache();

    for offset in 0..3 {
        let mut e = entry("key-1", CacheType::AccountView, CacheFilters::default());
        e.created_at = Utc::now() + Duration::seconds(offset);
        repo.put(&e).await.unwrap();
    }

    let all = repo.list_by_key("key-1").await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all.iter().filter(|e| e.valid).count(), 1);
    // The surviving valid entry is the newest.
    assert!(all[0].valid);
}

#[tokio::test]
async fn put_does_not_invalidate_other_dimension_tuples() {
    let db = create_test_db().await;
    let repo = db.analytics_cache();

    let daily = CacheFilters {
        period_type: Some(Granularity::Daily),
        ..Default::default()
    };
    let weekly = CacheFilters {
        period_type: Some(Granularity::Weekly),
        ..Default::default()
    };
    repo.put(&entry("key-daily", CacheType::BarGraph, daily))
        .await
        .unwrap();
    repo.put(&entry("key-weekly", CacheType::BarGraph, weekly))
        .await
        .unwrap();

    assert!(
        repo.get_latest_valid("key-daily").await.unwrap().is_some(),
        "sibling tuple must stay valid"
    );
    assert!(repo.get_latest_valid("key-weekly").await.unwrap().is_some());
}

#[tokio::test]
async fn get_latest_valid_ignores_invalidated_entries() {
    let db = create_test_db().await;
    let repo = db.analytics_cache();

    repo.put(&entry("key-2", CacheType::CompanyView, CacheFilters::default()))
        .await
        .unwrap();
    let count = repo.invalidate(Some(CacheType::CompanyView), None).await.unwrap();
    assert_eq!(count, 1);

    assert!(repo.get_latest_valid("key-2").await.unwrap().is_none());
    // The row itself is preserved for audit.
    assert_eq!(repo.list_by_key("key-2").await.unwrap().len(), 1);
}

#[tokio::test]
async fn invalidate_with_filter_dimensions() {
    let db = create_test_db().await;
    let repo = db.analytics_cache();

    let location_id = Uuid::new_v4();
    let scoped = CacheFilters {
        location_id: Some(location_id),
        ..Default::default()
    };
    repo.put(&entry("key-scoped", CacheType::AccountView, scoped.clone()))
        .await
        .unwrap();
    repo.put(&entry("key-global", CacheType::AccountView, CacheFilters::default()))
        .await
        .unwrap();

    let count = repo
        .invalidate(Some(CacheType::AccountView), Some(&scoped))
        .await
        .unwrap();
    assert_eq!(count, 1);
    assert!(repo.get_latest_valid("key-scoped").await.unwrap().is_none());
    assert!(repo.get_latest_valid("key-global").await.unwrap().is_some());
}

#[tokio::test]
async fn purge_removes_old_entries_regardless_of_validity() {
    let db = create_test_db().await;
    let repo = db.analytics_cache();

    let mut old = entry("key-old", CacheType::AccountView, CacheFilters::default());
    old.created_at = Utc::now() - Duration::days(45);
    repo.put(&old).await.unwrap();
    repo.put(&entry("key-new", CacheType::CompanyView, CacheFilters::default()))
        .await
        .unwrap();

    let purged = repo
        .purge_older_than(Utc::now() - Duration::days(30))
        .await
        .unwrap();
    assert_eq!(purged, 1);
    assert!(repo.list_by_key("key-old").await.unwrap().is_empty());
    assert_eq!(repo.list_by_key("key-new").await.unwrap().len(), 1);
}

#[tokio::test]
async fn payload_round_trips_as_json() {
    let db = create_test_db().await;
    let repo = db.analytics_cache();

    let mut e = entry("key-3", CacheType::BarGraph, CacheFilters::default());
    e.payload = json!({"buckets": [{"period_key": "2024-03-01", "total": "0.06"}]});
    e.total_count = 1;
    repo.put(&e).await.unwrap();

    let fetched = repo.get_latest_valid("key-3").await.unwrap().unwrap();
    assert_eq!(fetched.payload, e.payload);
    assert_eq!(fetched.total_count, 1);
    assert_eq!(fetched.cache_type, CacheType::BarGraph);
}
