//! Rate resolution for locations and multi-location scopes.
//!
//! A location's effective rates are its rate-card fields with the global
//! defaults substituted for nulls, call rates multiplied by the location's
//! `call_price_ratio`. A multi-location scope (company view, arbitrary
//! filter) uses the unweighted arithmetic mean of the member locations'
//! effective rates; this deliberately ignores traffic distribution and is
//! kept for compatibility with existing reports.

use rust_decimal::Decimal;

use crate::models::{DefaultRates, EffectiveRates, RateCard};

/// Decimal places for monetary usage amounts in presented output.
pub const USAGE_DP: u32 = 3;
/// Decimal places for presented rates.
pub const RATE_DP: u32 = 7;

pub fn round_usage(value: Decimal) -> Decimal {
    value.round_dp(USAGE_DP)
}

pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp(RATE_DP)
}

/// Resolves effective rates against an injected default set.
///
/// Pure reads only: the model never writes configuration, and an empty scope
/// resolves to zero rates rather than an error so downstream cost math
/// degrades to zero instead of failing the whole aggregation.
#[derive(Debug, Clone)]
pub struct RateModel {
    defaults: DefaultRates,
}

impl RateModel {
    pub fn new(defaults: DefaultRates) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &DefaultRates {
        &self.defaults
    }

    /// Effective rates for a single location. `card` is `None` when the
    /// location has no explicit rate card at all.
    pub fn for_location(&self, card: Option<&RateCard>) -> EffectiveRates {
        let d = &self.defaults;
        match card {
            Some(card) => EffectiveRates {
                inbound_msg_rate: card.inbound_msg_rate.unwrap_or(d.inbound_msg_rate),
                outbound_msg_rate: card.outbound_msg_rate.unwrap_or(d.outbound_msg_rate),
                inbound_call_rate: card.inbound_call_rate.unwrap_or(d.inbound_call_rate)
                    * card.call_price_ratio,
                outbound_call_rate: card.outbound_call_rate.unwrap_or(d.outbound_call_rate)
                    * card.call_price_ratio,
            },
            None => EffectiveRates {
                inbound_msg_rate: d.inbound_msg_rate,
                outbound_msg_rate: d.outbound_msg_rate,
                inbound_call_rate: d.inbound_call_rate * d.call_price_ratio,
                outbound_call_rate: d.outbound_call_rate * d.call_price_ratio,
            },
        }
    }

    /// Unweighted arithmetic mean across member locations. An empty scope
    /// yields zero rates, making cost zero regardless of volume.
    pub fn blended(&self, members: &[EffectiveRates]) -> EffectiveRates {
        if members.is_empty() {
            return EffectiveRates::ZERO;
        }
        let count = Decimal::from(members.len() as u64);
        let mut sum = EffectiveRates::ZERO;
        for rates in members {
            sum.inbound_msg_rate += rates.inbound_msg_rate;
            sum.outbound_msg_rate += rates.outbound_msg_rate;
            sum.inbound_call_rate += rates.inbound_call_rate;
            sum.outbound_call_rate += rates.outbound_call_rate;
        }
        EffectiveRates {
            inbound_msg_rate: sum.inbound_msg_rate / count,
            outbound_msg_rate: sum.outbound_msg_rate / count,
            inbound_call_rate: sum.inbound_call_rate / count,
            outbound_call_rate: sum.outbound_call_rate / count,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::dec;
    use uuid::Uuid;

    use super::*;

    fn defaults() -> DefaultRates {
        DefaultRates {
            inbound_msg_rate: dec!(0.01),
            outbound_msg_rate: dec!(0.02),
            inbound_call_rate: dec!(0.03),
            outbound_call_rate: dec!(0.04),
            call_price_ratio: Decimal::ONE,
            updated_at: Utc::now(),
        }
    }

    fn card(
        inbound_msg: Option<Decimal>,
        outbound_msg: Option<Decimal>,
        ratio: Decimal,
    ) -> RateCard {
        RateCard {
            location_id: Uuid::new_v4(),
            inbound_msg_rate: inbound_msg,
            outbound_msg_rate: outbound_msg,
            inbound_call_rate: None,
            outbound_call_rate: None,
            call_price_ratio: ratio,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn missing_card_uses_defaults() {
        let model = RateModel::new(defaults());
        let rates = model.for_location(None);
        assert_eq!(rates.inbound_msg_rate, dec!(0.01));
        assert_eq!(rates.outbound_call_rate, dec!(0.04));
    }

    #[test]
    fn null_fields_fall_back_per_field() {
        let model = RateModel::new(defaults());
        let rates = model.for_location(Some(&card(Some(dec!(0.05)), None, Decimal::ONE)));
        assert_eq!(rates.inbound_msg_rate, dec!(0.05));
        assert_eq!(rates.outbound_msg_rate, dec!(0.02));
    }

    #[test]
    fn call_price_ratio_scales_both_call_rates() {
        let model = RateModel::new(defaults());
        let rates = model.for_location(Some(&card(None, None, dec!(1.5))));
        assert_eq!(rates.inbound_call_rate, dec!(0.045));
        assert_eq!(rates.outbound_call_rate, dec!(0.06));
        // Message rates are untouched by the ratio.
        assert_eq!(rates.inbound_msg_rate, dec!(0.01));
    }

    #[test]
    fn blended_is_unweighted_mean() {
        let model = RateModel::new(defaults());
        let a = EffectiveRates {
            inbound_msg_rate: dec!(0.05),
            ..EffectiveRates::ZERO
        };
        let b = EffectiveRates {
            inbound_msg_rate: dec!(0.15),
            ..EffectiveRates::ZERO
        };
        let blended = model.blended(&[a, b]);
        assert_eq!(blended.inbound_msg_rate, dec!(0.10));
    }

    #[test]
    fn empty_scope_blends_to_zero() {
        let model = RateModel::new(defaults());
        assert_eq!(model.blended(&[]), EffectiveRates::ZERO);
    }

    #[test]
    fn rounding_precision() {
        assert_eq!(round_usage(dec!(0.0614999)), dec!(0.061));
        assert_eq!(round_rate(dec!(0.012345678)), dec!(0.0123457));
    }
}
