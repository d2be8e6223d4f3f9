use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, dec};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-location rate overrides. NULL fields fall back to [`DefaultRates`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateCard {
    pub location_id: Uuid,
    pub inbound_msg_rate: Option<Decimal>,
    pub outbound_msg_rate: Option<Decimal>,
    /// Per-minute rate for inbound calls, before the price ratio.
    pub inbound_call_rate: Option<Decimal>,
    /// Per-minute rate for outbound calls, before the price ratio.
    pub outbound_call_rate: Option<Decimal>,
    /// Uniform surcharge/discount multiplier applied to both call rates.
    pub call_price_ratio: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// Process-wide fallback rates. Exactly one row exists, created lazily.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultRates {
    pub inbound_msg_rate: Decimal,
    pub outbound_msg_rate: Decimal,
    pub inbound_call_rate: Decimal,
    pub outbound_call_rate: Decimal,
    pub call_price_ratio: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl DefaultRates {
    /// Baseline values seeded when no default row exists yet.
    pub fn baseline() -> Self {
        Self {
            inbound_msg_rate: dec!(0.0075),
            outbound_msg_rate: dec!(0.0079),
            inbound_call_rate: dec!(0.0085),
            outbound_call_rate: dec!(0.014),
            call_price_ratio: Decimal::ONE,
            updated_at: Utc::now(),
        }
    }
}

/// Partial update for a rate card or the defaults. `None` leaves the field
/// untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRates {
    pub inbound_msg_rate: Option<Decimal>,
    pub outbound_msg_rate: Option<Decimal>,
    pub inbound_call_rate: Option<Decimal>,
    pub outbound_call_rate: Option<Decimal>,
    pub call_price_ratio: Option<Decimal>,
}

impl UpdateRates {
    /// Rates are monetary amounts and the ratio a multiplier; none of them
    /// may be negative.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("inbound_msg_rate", self.inbound_msg_rate),
            ("outbound_msg_rate", self.outbound_msg_rate),
            ("inbound_call_rate", self.inbound_call_rate),
            ("outbound_call_rate", self.outbound_call_rate),
            ("call_price_ratio", self.call_price_ratio),
        ];
        for (name, value) in fields {
            if let Some(v) = value
                && v < Decimal::ZERO
            {
                return Err(format!("{name} must be non-negative"));
            }
        }
        Ok(())
    }
}

/// Fully-resolved rates for a scope, with defaults substituted and the call
/// price ratio already applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveRates {
    pub inbound_msg_rate: Decimal,
    pub outbound_msg_rate: Decimal,
    pub inbound_call_rate: Decimal,
    pub outbound_call_rate: Decimal,
}

impl EffectiveRates {
    pub const ZERO: EffectiveRates = EffectiveRates {
        inbound_msg_rate: Decimal::ZERO,
        outbound_msg_rate: Decimal::ZERO,
        inbound_call_rate: Decimal::ZERO,
        outbound_call_rate: Decimal::ZERO,
    };
}
