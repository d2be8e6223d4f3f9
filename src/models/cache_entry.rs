use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DataType, Granularity};

/// Kinds of precomputed analytics payloads the cache holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    AccountView,
    CompanyView,
    BarGraph,
}

impl CacheType {
    pub const ALL: [CacheType; 3] = [
        CacheType::AccountView,
        CacheType::CompanyView,
        CacheType::BarGraph,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheType::AccountView => "account_view",
            CacheType::CompanyView => "company_view",
            CacheType::BarGraph => "bar_graph",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "account_view" => Some(CacheType::AccountView),
            "company_view" => Some(CacheType::CompanyView),
            "bar_graph" => Some(CacheType::BarGraph),
            _ => None,
        }
    }
}

/// Filter dimensions a cache entry was computed under. These are the fields
/// that participate in key derivation and invalidation matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheFilters {
    pub period_type: Option<Granularity>,
    pub data_type: Option<DataType>,
    pub category: Option<String>,
    pub company: Option<String>,
    pub location_id: Option<Uuid>,
    pub range_start: Option<NaiveDate>,
    pub range_end: Option<NaiveDate>,
}

/// A stored analytics payload. At most one entry per cache key has
/// `valid = true`; superseded entries are kept invalid for audit until the
/// retention sweep purges them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsCacheEntry {
    pub id: Uuid,
    pub cache_key: String,
    pub cache_type: CacheType,
    pub filters: CacheFilters,
    pub payload: serde_json::Value,
    /// Row count of the payload, for quick dashboards.
    pub total_count: i64,
    pub valid: bool,
    pub created_at: DateTime<Utc>,
}

impl AnalyticsCacheEntry {
    /// Age of the entry relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }
}
