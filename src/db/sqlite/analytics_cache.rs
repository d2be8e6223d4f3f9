use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use super::common::parse_uuid;
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::AnalyticsCacheRepo,
    },
    models::{AnalyticsCacheEntry, CacheFilters, CacheType, DataType, Granularity},
};

pub struct SqliteAnalyticsCacheRepo {
    pool: SqlitePool,
}

const ENTRY_COLUMNS: &str = "id, cache_key, cache_type, period_type, data_type, category, \
     company, location_id, range_start, range_end, payload, total_count, valid, created_at";

impl SqliteAnalyticsCacheRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> DbResult<AnalyticsCacheEntry> {
        let cache_type_raw: String = row.get("cache_type");
        let cache_type = CacheType::from_str(&cache_type_raw).ok_or_else(|| {
            DbError::Internal(format!("Invalid cache_type in database: {cache_type_raw}"))
        })?;
        let payload_raw: String = row.get("payload");

        Ok(AnalyticsCacheEntry {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            cache_key: row.get("cache_key"),
            cache_type,
            filters: CacheFilters {
                period_type: row
                    .get::<Option<String>, _>("period_type")
                    .as_deref()
                    .and_then(Granularity::from_str),
                data_type: row
                    .get::<Option<String>, _>("data_type")
                    .as_deref()
                    .and_then(DataType::from_str),
                category: row.get("category"),
                company: row.get("company"),
                location_id: row
                    .get::<Option<String>, _>("location_id")
                    .as_deref()
                    .map(parse_uuid)
                    .transpose()?,
                range_start: row.get("range_start"),
                range_end: row.get("range_end"),
            },
            payload: serde_json::from_str(&payload_raw)?,
            total_count: row.get("total_count"),
            valid: row.get("valid"),
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl AnalyticsCacheRepo for SqliteAnalyticsCacheRepo {
    async fn get_latest_valid(&self, cache_key: &str) -> DbResult<Option<AnalyticsCacheEntry>> {
        let row = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM analytics_cache
             WHERE cache_key = ? AND valid = 1
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(cache_key)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    async fn put(&self, entry: &AnalyticsCacheEntry) -> DbResult<()> {
        let payload = serde_json::to_string(&entry.payload)?;

        // Invalidate-then-insert in one transaction: at no point does a
        // concurrent reader see zero valid entries for an existing key, and
        // two concurrent refreshes cannot both stay "primary".
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE analytics_cache SET valid = 0
            WHERE valid = 1
              AND cache_type = ?
              AND period_type IS ?
              AND data_type IS ?
              AND category IS ?
              AND company IS ?
              AND location_id IS ?
            "#,
        )
        .bind(entry.cache_type.as_str())
        .bind(entry.filters.period_type.map(|g| g.as_str()))
        .bind(entry.filters.data_type.map(|d| d.as_str()))
        .bind(&entry.filters.category)
        .bind(&entry.filters.company)
        .bind(entry.filters.location_id.map(|id| id.to_string()))
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            "INSERT INTO analytics_cache ({ENTRY_COLUMNS})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(entry.id.to_string())
        .bind(&entry.cache_key)
        .bind(entry.cache_type.as_str())
        .bind(entry.filters.period_type.map(|g| g.as_str()))
        .bind(entry.filters.data_type.map(|d| d.as_str()))
        .bind(&entry.filters.category)
        .bind(&entry.filters.company)
        .bind(entry.filters.location_id.map(|id| id.to_string()))
        .bind(entry.filters.range_start)
        .bind(entry.filters.range_end)
        .bind(payload)
        .bind(entry.total_count)
        .bind(entry.valid)
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn invalidate(
        &self,
        cache_type: Option<CacheType>,
        filters: Option<&CacheFilters>,
    ) -> DbResult<u64> {
        let mut sql = String::from("UPDATE analytics_cache SET valid = 0 WHERE valid = 1");
        if cache_type.is_some() {
            sql.push_str(" AND cache_type = ?");
        }
        if let Some(filters) = filters {
            if filters.period_type.is_some() {
                sql.push_str(" AND period_type = ?");
            }
            if filters.data_type.is_some() {
                sql.push_str(" AND data_type = ?");
            }
            if filters.category.is_some() {
                sql.push_str(" AND category = ?");
            }
            if filters.company.is_some() {
                sql.push_str(" AND company = ?");
            }
            if filters.location_id.is_some() {
                sql.push_str(" AND location_id = ?");
            }
        }

        let mut query = sqlx::query(&sql);
        if let Some(cache_type) = cache_type {
            query = query.bind(cache_type.as_str());
        }
        if let Some(filters) = filters {
            if let Some(period) = filters.period_type {
                query = query.bind(period.as_str());
            }
            if let Some(data_type) = filters.data_type {
                query = query.bind(data_type.as_str());
            }
            if let Some(category) = &filters.category {
                query = query.bind(category);
            }
            if let Some(company) = &filters.company {
                query = query.bind(company);
            }
            if let Some(location_id) = filters.location_id {
                query = query.bind(location_id.to_string());
            }
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM analytics_cache WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_by_key(&self, cache_key: &str) -> DbResult<Vec<AnalyticsCacheEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM analytics_cache
             WHERE cache_key = ? ORDER BY created_at DESC"
        ))
        .bind(cache_key)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_entry).collect()
    }
}
