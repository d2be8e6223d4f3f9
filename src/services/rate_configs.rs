use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{DbError, DbPool, DbResult},
    jobs::{RefreshJob, RefreshQueue},
    models::{DefaultRates, RateCard, UpdateRates},
};

/// Service layer for rate configuration.
///
/// Rate changes invalidate by enqueueing a full refresh rather than
/// touching cache rows directly; the refreshed payloads supersede the stale
/// ones through the normal put path.
#[derive(Clone)]
pub struct RateConfigService {
    db: Arc<DbPool>,
    refresh_queue: RefreshQueue,
}

impl RateConfigService {
    pub fn new(db: Arc<DbPool>, refresh_queue: RefreshQueue) -> Self {
        Self { db, refresh_queue }
    }

    pub async fn get_default(&self) -> DbResult<DefaultRates> {
        self.db.rate_configs().get_or_create_default().await
    }

    pub async fn update_default(&self, update: UpdateRates) -> DbResult<DefaultRates> {
        update.validate().map_err(DbError::Validation)?;
        let rates = self.db.rate_configs().update_default(update).await?;
        tracing::info!("Default rates updated");
        self.refresh_queue.enqueue(RefreshJob::all());
        Ok(rates)
    }

    pub async fn get_rate_card(&self, location_id: Uuid) -> DbResult<Option<RateCard>> {
        self.db.rate_configs().get_rate_card(location_id).await
    }

    pub async fn upsert_rate_card(
        &self,
        location_id: Uuid,
        update: UpdateRates,
    ) -> DbResult<RateCard> {
        update.validate().map_err(DbError::Validation)?;
        let card = self
            .db
            .rate_configs()
            .upsert_rate_card(location_id, update)
            .await?;
        tracing::info!(location_id = %location_id, "Rate card updated");
        self.refresh_queue.enqueue(RefreshJob::all());
        Ok(card)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;
    use crate::db::tests::harness::create_test_db;

    fn service(db: Arc<DbPool>) -> (RateConfigService, tokio::sync::mpsc::UnboundedReceiver<RefreshJob>) {
        let (queue, rx) = RefreshQueue::new();
        (RateConfigService::new(db, queue), rx)
    }

    #[tokio::test]
    async fn negative_rate_is_rejected_before_the_store() {
        let db = Arc::new(create_test_db().await);
        let (svc, _rx) = service(db);

        let err = svc
            .update_default(UpdateRates {
                inbound_msg_rate: Some(dec!(-0.01)),
                ..UpdateRates::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn rate_change_enqueues_a_full_refresh() {
        let db = Arc::new(create_test_db().await);
        let (svc, mut rx) = service(db);

        svc.update_default(UpdateRates {
            outbound_msg_rate: Some(dec!(0.01)),
            ..UpdateRates::default()
        })
        .await
        .expect("update default");

        let job = rx.recv().await.expect("refresh job");
        assert_eq!(job.cache_types.len(), 3);
    }
}
