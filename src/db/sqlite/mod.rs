mod analytics_cache;
mod common;
mod events;
mod locations;
mod rate_configs;

pub use analytics_cache::SqliteAnalyticsCacheRepo;
pub use events::SqliteEventRepo;
pub use locations::SqliteLocationRepo;
pub use rate_configs::SqliteRateConfigRepo;
