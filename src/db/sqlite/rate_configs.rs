use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::common::{parse_decimal, parse_opt_decimal, parse_uuid};
use crate::{
    db::{error::DbResult, repos::RateConfigRepo},
    models::{DefaultRates, RateCard, UpdateRates},
};

pub struct SqliteRateConfigRepo {
    pool: SqlitePool,
}

impl SqliteRateConfigRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_card(row: &sqlx::sqlite::SqliteRow) -> DbResult<RateCard> {
        Ok(RateCard {
            location_id: parse_uuid(&row.get::<String, _>("location_id"))?,
            inbound_msg_rate: parse_opt_decimal(
                row.get::<Option<String>, _>("inbound_msg_rate").as_deref(),
            )?,
            outbound_msg_rate: parse_opt_decimal(
                row.get::<Option<String>, _>("outbound_msg_rate").as_deref(),
            )?,
            inbound_call_rate: parse_opt_decimal(
                row.get::<Option<String>, _>("inbound_call_rate").as_deref(),
            )?,
            outbound_call_rate: parse_opt_decimal(
                row.get::<Option<String>, _>("outbound_call_rate")
                    .as_deref(),
            )?,
            call_price_ratio: parse_decimal(&row.get::<String, _>("call_price_ratio"))?,
            updated_at: row.get("updated_at"),
        })
    }

    fn row_to_defaults(row: &sqlx::sqlite::SqliteRow) -> DbResult<DefaultRates> {
        Ok(DefaultRates {
            inbound_msg_rate: parse_decimal(&row.get::<String, _>("inbound_msg_rate"))?,
            outbound_msg_rate: parse_decimal(&row.get::<String, _>("outbound_msg_rate"))?,
            inbound_call_rate: parse_decimal(&row.get::<String, _>("inbound_call_rate"))?,
            outbound_call_rate: parse_decimal(&row.get::<String, _>("outbound_call_rate"))?,
            call_price_ratio: parse_decimal(&row.get::<String, _>("call_price_ratio"))?,
            updated_at: row.get("updated_at"),
        })
    }
}

const CARD_COLUMNS: &str = "location_id, inbound_msg_rate, outbound_msg_rate, \
     inbound_call_rate, outbound_call_rate, call_price_ratio, updated_at";

#[async_trait]
impl RateConfigRepo for SqliteRateConfigRepo {
    async fn get_rate_card(&self, location_id: Uuid) -> DbResult<Option<RateCard>> {
        let row = sqlx::query(&format!(
            "SELECT {CARD_COLUMNS} FROM rate_cards WHERE location_id = ?"
        ))
        .bind(location_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_card).transpose()
    }

    async fn list_rate_cards(&self) -> DbResult<Vec<RateCard>> {
        let rows = sqlx::query(&format!("SELECT {CARD_COLUMNS} FROM rate_cards"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_card).collect()
    }

    async fn upsert_rate_card(
        &self,
        location_id: Uuid,
        update: UpdateRates,
    ) -> DbResult<RateCard> {
        let existing = self.get_rate_card(location_id).await?;
        let merged = RateCard {
            location_id,
            inbound_msg_rate: update
                .inbound_msg_rate
                .or(existing.as_ref().and_then(|c| c.inbound_msg_rate)),
            outbound_msg_rate: update
                .outbound_msg_rate
                .or(existing.as_ref().and_then(|c| c.outbound_msg_rate)),
            inbound_call_rate: update
                .inbound_call_rate
                .or(existing.as_ref().and_then(|c| c.inbound_call_rate)),
            outbound_call_rate: update
                .outbound_call_rate
                .or(existing.as_ref().and_then(|c| c.outbound_call_rate)),
            call_price_ratio: update.call_price_ratio.unwrap_or_else(|| {
                existing
                    .as_ref()
                    .map(|c| c.call_price_ratio)
                    .unwrap_or(Decimal::ONE)
            }),
            updated_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO rate_cards
                (location_id, inbound_msg_rate, outbound_msg_rate,
                 inbound_call_rate, outbound_call_rate, call_price_ratio, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(location_id) DO UPDATE SET
                inbound_msg_rate = excluded.inbound_msg_rate,
                outbound_msg_rate = excluded.outbound_msg_rate,
                inbound_call_rate = excluded.inbound_call_rate,
                outbound_call_rate = excluded.outbound_call_rate,
                call_price_ratio = excluded.call_price_ratio,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(merged.location_id.to_string())
        .bind(merged.inbound_msg_rate.map(|d| d.to_string()))
        .bind(merged.outbound_msg_rate.map(|d| d.to_string()))
        .bind(merged.inbound_call_rate.map(|d| d.to_string()))
        .bind(merged.outbound_call_rate.map(|d| d.to_string()))
        .bind(merged.call_price_ratio.to_string())
        .bind(merged.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(merged)
    }

    async fn get_or_create_default(&self) -> DbResult<DefaultRates> {
        // INSERT OR IGNORE against the fixed id keeps concurrent first
        // accesses from racing to two rows.
        let baseline = DefaultRates::baseline();
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO default_rates
                (id, inbound_msg_rate, outbound_msg_rate,
                 inbound_call_rate, outbound_call_rate, call_price_ratio, updated_at)
            VALUES (1, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(baseline.inbound_msg_rate.to_string())
        .bind(baseline.outbound_msg_rate.to_string())
        .bind(baseline.inbound_call_rate.to_string())
        .bind(baseline.outbound_call_rate.to_string())
        .bind(baseline.call_price_ratio.to_string())
        .bind(baseline.updated_at)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            "SELECT inbound_msg_rate, outbound_msg_rate, inbound_call_rate,
                    outbound_call_rate, call_price_ratio, updated_at
             FROM default_rates WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_defaults(&row)
    }

    async fn update_default(&self, update: UpdateRates) -> DbResult<DefaultRates> {
        let current = self.get_or_create_default().await?;
        let merged = DefaultRates {
            inbound_msg_rate: update.inbound_msg_rate.unwrap_or(current.inbound_msg_rate),
            outbound_msg_rate: update
                .outbound_msg_rate
                .unwrap_or(current.outbound_msg_rate),
            inbound_call_rate: update
                .inbound_call_rate
                .unwrap_or(current.inbound_call_rate),
            outbound_call_rate: update
                .outbound_call_rate
                .unwrap_or(current.outbound_call_rate),
            call_price_ratio: update.call_price_ratio.unwrap_or(current.call_price_ratio),
            updated_at: Utc::now(),
        };

        sqlx::query(
            r#"
            UPDATE default_rates SET
                inbound_msg_rate = ?, outbound_msg_rate = ?,
                inbound_call_rate = ?, outbound_call_rate = ?,
                call_price_ratio = ?, updated_at = ?
            WHERE id = 1
            "#,
        )
        .bind(merged.inbound_msg_rate.to_string())
        .bind(merged.outbound_msg_rate.to_string())
        .bind(merged.inbound_call_rate.to_string())
        .bind(merged.outbound_call_rate.to_string())
        .bind(merged.call_price_ratio.to_string())
        .bind(merged.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(merged)
    }
}
