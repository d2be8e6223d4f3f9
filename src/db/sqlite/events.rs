use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveTime, Utc};
use sqlx::{Row, SqlitePool};

use super::common::{in_placeholders, parse_uuid};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{DateRange, EventFilter, EventRepo},
    },
    models::{CallEvent, Direction, MessageEvent},
};

pub struct SqliteEventRepo {
    pool: SqlitePool,
}

impl SqliteEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inclusive calendar range as a half-open UTC timestamp interval.
    fn range_bounds(range: &DateRange) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = range.start.and_time(NaiveTime::MIN).and_utc();
        let end_exclusive = (range.end + Days::new(1)).and_time(NaiveTime::MIN).and_utc();
        (start, end_exclusive)
    }

    fn parse_direction(raw: &str) -> DbResult<Direction> {
        Direction::from_str(raw)
            .ok_or_else(|| DbError::Internal(format!("Invalid direction in database: {raw}")))
    }

    fn build_query(table: &str, value_column: &str, filter: &EventFilter) -> String {
        let mut sql = format!(
            "SELECT id, location_id, direction, {value_column}, occurred_at
             FROM {table} WHERE 1 = 1"
        );
        if let Some(ids) = &filter.location_ids {
            sql.push_str(&format!(
                " AND location_id IN ({})",
                in_placeholders(ids.len())
            ));
        }
        if filter.range.is_some() {
            sql.push_str(" AND occurred_at >= ? AND occurred_at < ?");
        }
        sql.push_str(" ORDER BY occurred_at ASC");
        sql
    }

    fn bind_filter<'q>(
        mut query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
        filter: &EventFilter,
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        if let Some(ids) = &filter.location_ids {
            for id in ids {
                query = query.bind(id.to_string());
            }
        }
        if let Some(range) = &filter.range {
            let (start, end_exclusive) = Self::range_bounds(range);
            query = query.bind(start).bind(end_exclusive);
        }
        query
    }
}

#[async_trait]
impl EventRepo for SqliteEventRepo {
    async fn insert_message(&self, event: &MessageEvent) -> DbResult<()> {
        // INSERT OR IGNORE keeps upstream re-syncs idempotent.
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO message_events
                (id, location_id, direction, segment_count, occurred_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.to_string())
        .bind(event.location_id.to_string())
        .bind(event.direction.as_str())
        .bind(event.segment_count)
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_call(&self, event: &CallEvent) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO call_events
                (id, location_id, direction, duration_seconds, occurred_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.to_string())
        .bind(event.location_id.to_string())
        .bind(event.direction.as_str())
        .bind(event.duration_seconds)
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn query_messages(&self, filter: &EventFilter) -> DbResult<Vec<MessageEvent>> {
        if let Some(ids) = &filter.location_ids
            && ids.is_empty()
        {
            return Ok(Vec::new());
        }

        let sql = Self::build_query("message_events", "segment_count", filter);
        let query = Self::bind_filter(sqlx::query(&sql), filter);
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                Ok(MessageEvent {
                    id: parse_uuid(&row.get::<String, _>("id"))?,
                    location_id: parse_uuid(&row.get::<String, _>("location_id"))?,
                    direction: Self::parse_direction(&row.get::<String, _>("direction"))?,
                    segment_count: row.get("segment_count"),
                    occurred_at: row.get("occurred_at"),
                })
            })
            .collect()
    }

    async fn query_calls(&self, filter: &EventFilter) -> DbResult<Vec<CallEvent>> {
        if let Some(ids) = &filter.location_ids
            && ids.is_empty()
        {
            return Ok(Vec::new());
        }

        let sql = Self::build_query("call_events", "duration_seconds", filter);
        let query = Self::bind_filter(sqlx::query(&sql), filter);
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                Ok(CallEvent {
                    id: parse_uuid(&row.get::<String, _>("id"))?,
                    location_id: parse_uuid(&row.get::<String, _>("location_id"))?,
                    direction: Self::parse_direction(&row.get::<String, _>("direction"))?,
                    duration_seconds: row.get("duration_seconds"),
                    occurred_at: row.get("occurred_at"),
                })
            })
            .collect()
    }
}
