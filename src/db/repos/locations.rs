use async_trait::async_trait;
use uuid::Uuid;

use super::LocationFilter;
use crate::{
    db::error::DbResult,
    models::{CreateLocation, Location},
};

#[async_trait]
pub trait LocationRepo: Send + Sync {
    /// Create a location record (ingestion/test seam).
    async fn create(&self, input: CreateLocation) -> DbResult<Location>;

    /// Get a location by id.
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Location>>;

    /// List locations matching the filter, unordered.
    async fn list(&self, filter: &LocationFilter) -> DbResult<Vec<Location>>;
}
