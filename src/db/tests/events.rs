use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use super::harness::create_test_db;
use crate::{
    db::{DateRange, EventFilter},
    models::{CallEvent, CreateLocation, Direction, MessageEvent},
};

async fn seed_location(db: &crate::db::DbPool, name: &str) -> Uuid {
    db.locations()
        .create(CreateLocation {
            name: name.to_string(),
            company_name: None,
            category: None,
            approved: true,
        })
        .await
        .expect("Failed to create location")
        .id
}

fn message(location_id: Uuid, y: i32, m: u32, d: u32, h: u32) -> MessageEvent {
    MessageEvent {
        id: Uuid::new_v4(),
        location_id,
        direction: Direction::Inbound,
        segment_count: 1,
        occurred_at: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn insert_is_idempotent_on_id() {
    let db = create_test_db().await;
    let location_id = seed_location(&db, "loc").await;

    let event = message(location_id, 2024, 3, 1, 9);
    db.events().insert_message(&event).await.unwrap();
    db.events().insert_message(&event).await.unwrap();

    let stored = db
        .events()
        .query_messages(&EventFilter::default())
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn date_range_is_inclusive_on_both_ends() {
    let db = create_test_db().await;
    let location_id = seed_location(&db, "loc").await;

    // Before, at start-of-range, at end-of-range (23:00), after.
    db.events()
        .insert_message(&message(location_id, 2024, 2, 29, 12))
        .await
        .unwrap();
    db.events()
        .insert_message(&message(location_id, 2024, 3, 1, 0))
        .await
        .unwrap();
    db.events()
        .insert_message(&message(location_id, 2024, 3, 2, 23))
        .await
        .unwrap();
    db.events()
        .insert_message(&message(location_id, 2024, 3, 3, 0))
        .await
        .unwrap();

    let filter = EventFilter {
        range: Some(DateRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
        }),
        ..Default::default()
    };
    let stored = db.events().query_messages(&filter).await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn location_filter_restricts_and_empty_set_matches_nothing() {
    let db = create_test_db().await;
    let a = seed_location(&db, "a").await;
    let b = seed_location(&db, "b").await;

    db.events()
        .insert_message(&message(a, 2024, 3, 1, 9))
        .await
        .unwrap();
    db.events()
        .insert_message(&message(b, 2024, 3, 1, 9))
        .await
        .unwrap();

    let only_a = EventFilter {
        location_ids: Some(vec![a]),
        ..Default::default()
    };
    assert_eq!(db.events().query_messages(&only_a).await.unwrap().len(), 1);

    let none = EventFilter {
        location_ids: Some(vec![]),
        ..Default::default()
    };
    assert!(db.events().query_messages(&none).await.unwrap().is_empty());
}

#[tokio::test]
async fn calls_round_trip_with_duration() {
    let db = create_test_db().await;
    let location_id = seed_location(&db, "loc").await;

    let event = CallEvent {
        id: Uuid::new_v4(),
        location_id,
        direction: Direction::Outbound,
        duration_seconds: 185,
        occurred_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap(),
    };
    db.events().insert_call(&event).await.unwrap();

    let stored = db
        .events()
        .query_calls(&EventFilter::default())
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].duration_seconds, 185);
    assert_eq!(stored[0].direction, Direction::Outbound);
}
