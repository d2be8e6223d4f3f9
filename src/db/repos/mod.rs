mod analytics_cache;
mod events;
mod locations;
mod rate_configs;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use analytics_cache::AnalyticsCacheRepo;
pub use events::EventRepo;
pub use locations::LocationRepo;
pub use rate_configs::RateConfigRepo;

/// Inclusive date range `[start, end]` applied to event timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end < start {
            return Err("end date must not precede start date".to_string());
        }
        Ok(Self { start, end })
    }
}

/// Filters for the location roster.
#[derive(Debug, Clone, Default)]
pub struct LocationFilter {
    pub location_ids: Option<Vec<Uuid>>,
    pub company_name: Option<String>,
    pub category: Option<String>,
    /// When true (the analytics default), only approved locations match.
    pub approved_only: bool,
}

/// Filters for raw event queries. All dimensions are conjunctive; absent
/// dimensions are unbounded.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub location_ids: Option<Vec<Uuid>>,
    pub range: Option<DateRange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        assert!(DateRange::new(date(2024, 2, 1), date(2024, 1, 1)).is_err());
        assert!(DateRange::new(date(2024, 1, 1), date(2024, 1, 1)).is_ok());
    }
}
