use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a message or call relative to the location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "inbound" => Some(Direction::Inbound),
            "outbound" => Some(Direction::Outbound),
            _ => None,
        }
    }
}

/// A single SMS event. Immutable once ingested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    pub id: Uuid,
    pub location_id: Uuid,
    pub direction: Direction,
    /// Billing segments derived from body length (~160 chars per segment).
    pub segment_count: i64,
    pub occurred_at: DateTime<Utc>,
}

/// A single voice-call event. Immutable once ingested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEvent {
    pub id: Uuid,
    pub location_id: Uuid,
    pub direction: Direction,
    pub duration_seconds: i64,
    pub occurred_at: DateTime<Utc>,
}
