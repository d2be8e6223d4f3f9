use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::common::{in_placeholders, parse_uuid};
use crate::{
    db::{error::DbResult, repos::{LocationFilter, LocationRepo}},
    models::{CreateLocation, Location},
};

pub struct SqliteLocationRepo {
    pool: SqlitePool,
}

impl SqliteLocationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_location(row: &sqlx::sqlite::SqliteRow) -> DbResult<Location> {
        Ok(Location {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            name: row.get("name"),
            company_name: row.get("company_name"),
            category: row.get("category"),
            approved: row.get("approved"),
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl LocationRepo for SqliteLocationRepo {
    async fn create(&self, input: CreateLocation) -> DbResult<Location> {
        let location = Location {
            id: Uuid::new_v4(),
            name: input.name,
            company_name: input.company_name,
            category: input.category,
            approved: input.approved,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO locations (id, name, company_name, category, approved, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(location.id.to_string())
        .bind(&location.name)
        .bind(&location.company_name)
        .bind(&location.category)
        .bind(location.approved)
        .bind(location.created_at)
        .execute(&self.pool)
        .await?;

        Ok(location)
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Location>> {
        let row = sqlx::query(
            "SELECT id, name, company_name, category, approved, created_at
             FROM locations WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_location).transpose()
    }

    async fn list(&self, filter: &LocationFilter) -> DbResult<Vec<Location>> {
        // An explicitly empty id set matches nothing.
        if let Some(ids) = &filter.location_ids
            && ids.is_empty()
        {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            "SELECT id, name, company_name, category, approved, created_at
             FROM locations WHERE 1 = 1",
        );
        if filter.approved_only {
            sql.push_str(" AND approved = 1");
        }
        if filter.category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if filter.company_name.is_some() {
            sql.push_str(" AND company_name = ?");
        }
        if let Some(ids) = &filter.location_ids {
            sql.push_str(&format!(" AND id IN ({})", in_placeholders(ids.len())));
        }

        let mut query = sqlx::query(&sql);
        if let Some(category) = &filter.category {
            query = query.bind(category);
        }
        if let Some(company) = &filter.company_name {
            query = query.bind(company);
        }
        if let Some(ids) = &filter.location_ids {
            for id in ids {
                query = query.bind(id.to_string());
            }
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_location).collect()
    }
}
