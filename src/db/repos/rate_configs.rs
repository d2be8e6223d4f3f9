use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{DefaultRates, RateCard, UpdateRates},
};

#[async_trait]
pub trait RateConfigRepo: Send + Sync {
    /// Explicit rate card for a location, if one exists.
    async fn get_rate_card(&self, location_id: Uuid) -> DbResult<Option<RateCard>>;

    /// All explicit rate cards, keyed by location downstream.
    async fn list_rate_cards(&self) -> DbResult<Vec<RateCard>>;

    /// Create or partially update a location's rate card.
    async fn upsert_rate_card(&self, location_id: Uuid, update: UpdateRates)
    -> DbResult<RateCard>;

    /// The global default rates, created from the baseline on first access.
    /// The fixed-id row enforces the singleton at the store level.
    async fn get_or_create_default(&self) -> DbResult<DefaultRates>;

    /// Partially update the default rates.
    async fn update_default(&self, update: UpdateRates) -> DbResult<DefaultRates>;
}
