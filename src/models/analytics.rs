use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Time bucket width for time-series aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Granularity::Daily),
            "weekly" => Some(Granularity::Weekly),
            "monthly" => Some(Granularity::Monthly),
            _ => None,
        }
    }
}

/// Which metric families a request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Sms,
    Calls,
    Both,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Sms => "sms",
            DataType::Calls => "calls",
            DataType::Both => "both",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sms" => Some(DataType::Sms),
            "calls" => Some(DataType::Calls),
            "both" => Some(DataType::Both),
            _ => None,
        }
    }

    pub fn includes_sms(&self) -> bool {
        matches!(self, DataType::Sms | DataType::Both)
    }

    pub fn includes_calls(&self) -> bool {
        matches!(self, DataType::Calls | DataType::Both)
    }
}

/// Aggregation dimension: per-location or per-company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    Account,
    Company,
}

impl ViewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewType::Account => "account",
            ViewType::Company => "company",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "account" => Some(ViewType::Account),
            "company" => Some(ViewType::Company),
            _ => None,
        }
    }
}

/// SMS metric family. All fields are always present; a scope with no
/// message traffic carries zeros, never missing keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmsMetrics {
    pub inbound_messages: i64,
    pub outbound_messages: i64,
    pub inbound_segments: i64,
    pub outbound_segments: i64,
    pub inbound_usage: Decimal,
    pub outbound_usage: Decimal,
    pub total_usage: Decimal,
}

/// Call metric family. Same always-present contract as [`SmsMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallMetrics {
    pub inbound_calls: i64,
    pub outbound_calls: i64,
    pub inbound_seconds: i64,
    pub outbound_seconds: i64,
    pub inbound_usage: Decimal,
    pub outbound_usage: Decimal,
    pub total_usage: Decimal,
}

/// Elementwise sum of the SMS and call families.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedMetrics {
    pub inbound_usage: Decimal,
    pub outbound_usage: Decimal,
    pub total_usage: Decimal,
}

impl CombinedMetrics {
    pub fn from_families(sms: &SmsMetrics, calls: &CallMetrics) -> Self {
        Self {
            inbound_usage: sms.inbound_usage + calls.inbound_usage,
            outbound_usage: sms.outbound_usage + calls.outbound_usage,
            total_usage: sms.total_usage + calls.total_usage,
        }
    }
}

/// One period of the time-series output. `period_key` is the bucket start
/// (day, Monday of the week, or first of the month).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageBucket {
    pub period_key: NaiveDate,
    pub sms: SmsMetrics,
    pub calls: CallMetrics,
    pub combined: CombinedMetrics,
}

impl UsageBucket {
    pub fn empty(period_key: NaiveDate) -> Self {
        Self {
            period_key,
            sms: SmsMetrics::default(),
            calls: CallMetrics::default(),
            combined: CombinedMetrics::default(),
        }
    }
}

/// Account view row: usage for a single approved location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationUsageRow {
    pub location_id: Uuid,
    pub location_name: String,
    pub company_name: Option<String>,
    pub category: Option<String>,
    pub sms: SmsMetrics,
    pub calls: CallMetrics,
    pub combined: CombinedMetrics,
}

/// Company view row: volumes summed over member locations, priced at the
/// blended (mean) rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyUsageRow {
    pub company_name: String,
    /// Distinct member locations, including ones with zero usage.
    pub locations_count: i64,
    pub sms: SmsMetrics,
    pub calls: CallMetrics,
    pub combined: CombinedMetrics,
}

/// Time-series payload for the bar-graph endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarGraphData {
    pub buckets: Vec<UsageBucket>,
    pub meta: BarGraphMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarGraphMeta {
    pub granularity: Granularity,
    pub data_type: DataType,
    pub view_type: ViewType,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    /// Locations contributing to the scope.
    pub locations_count: i64,
}
