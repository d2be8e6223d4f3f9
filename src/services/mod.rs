mod analytics;
mod rate_configs;

use std::sync::Arc;

pub use analytics::{
    AccountViewParams, AnalyticsError, AnalyticsResult, AnalyticsService, BarGraphParams,
    CompanyViewParams, RefreshRunResult,
};
pub use rate_configs::RateConfigService;

use crate::{cache::AnalyticsCacheService, db::DbPool, jobs::RefreshQueue};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub analytics: AnalyticsService,
    pub rate_configs: RateConfigService,
}

impl Services {
    pub fn new(
        db: Arc<DbPool>,
        cache: Arc<AnalyticsCacheService>,
        refresh_queue: RefreshQueue,
        max_age: chrono::Duration,
    ) -> Self {
        Self {
            analytics: AnalyticsService::new(
                db.clone(),
                cache,
                refresh_queue.clone(),
                max_age,
            ),
            rate_configs: RateConfigService::new(db, refresh_queue),
        }
    }
}
