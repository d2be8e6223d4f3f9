//! Directional aggregation of raw events into per-location totals.
//!
//! Grouping is by location id; company-level grouping happens later in the
//! view composer by summing member locations. Every requested location key
//! is present in the output map even with zero traffic, so callers never
//! have to distinguish "no events" from "absent key".

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{CallEvent, CallMetrics, Direction, EffectiveRates, MessageEvent, SmsMetrics};

use super::rates::round_usage;

const SECONDS_PER_MINUTE: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// Raw SMS totals for one group, split by direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageTotals {
    pub inbound_count: i64,
    pub outbound_count: i64,
    pub inbound_segments: i64,
    pub outbound_segments: i64,
}

impl MessageTotals {
    pub fn add(&mut self, event: &MessageEvent) {
        match event.direction {
            Direction::Inbound => {
                self.inbound_count += 1;
                self.inbound_segments += event.segment_count;
            }
            Direction::Outbound => {
                self.outbound_count += 1;
                self.outbound_segments += event.segment_count;
            }
        }
    }

    pub fn merge(&mut self, other: &MessageTotals) {
        self.inbound_count += other.inbound_count;
        self.outbound_count += other.outbound_count;
        self.inbound_segments += other.inbound_segments;
        self.outbound_segments += other.outbound_segments;
    }
}

/// Raw call totals for one group, split by direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallTotals {
    pub inbound_count: i64,
    pub outbound_count: i64,
    pub inbound_seconds: i64,
    pub outbound_seconds: i64,
}

impl CallTotals {
    pub fn add(&mut self, event: &CallEvent) {
        match event.direction {
            Direction::Inbound => {
                self.inbound_count += 1;
                self.inbound_seconds += event.duration_seconds;
            }
            Direction::Outbound => {
                self.outbound_count += 1;
                self.outbound_seconds += event.duration_seconds;
            }
        }
    }

    pub fn merge(&mut self, other: &CallTotals) {
        self.inbound_count += other.inbound_count;
        self.outbound_count += other.outbound_count;
        self.inbound_seconds += other.inbound_seconds;
        self.outbound_seconds += other.outbound_seconds;
    }
}

/// Group message events by location. `roster` seeds zero-valued entries for
/// explicitly requested locations.
pub fn aggregate_messages(
    events: &[MessageEvent],
    roster: &[Uuid],
) -> HashMap<Uuid, MessageTotals> {
    let mut totals: HashMap<Uuid, MessageTotals> = roster
        .iter()
        .map(|id| (*id, MessageTotals::default()))
        .collect();
    for event in events {
        totals.entry(event.location_id).or_default().add(event);
    }
    totals
}

/// Group call events by location, seeding zero entries from `roster`.
pub fn aggregate_calls(events: &[CallEvent], roster: &[Uuid]) -> HashMap<Uuid, CallTotals> {
    let mut totals: HashMap<Uuid, CallTotals> = roster
        .iter()
        .map(|id| (*id, CallTotals::default()))
        .collect();
    for event in events {
        totals.entry(event.location_id).or_default().add(event);
    }
    totals
}

/// Price message totals. Usage is rate x message count; segments are
/// reported but not billed. Amounts are rounded to presentation precision
/// here, and the family total is the sum of the rounded directions so the
/// in/out/total identity always holds.
pub fn sms_metrics(totals: &MessageTotals, rates: &EffectiveRates) -> SmsMetrics {
    let inbound_usage = round_usage(rates.inbound_msg_rate * Decimal::from(totals.inbound_count));
    let outbound_usage =
        round_usage(rates.outbound_msg_rate * Decimal::from(totals.outbound_count));
    SmsMetrics {
        inbound_messages: totals.inbound_count,
        outbound_messages: totals.outbound_count,
        inbound_segments: totals.inbound_segments,
        outbound_segments: totals.outbound_segments,
        inbound_usage,
        outbound_usage,
        total_usage: inbound_usage + outbound_usage,
    }
}

/// Price call totals. Usage is per-minute rate x duration/60 with exact
/// decimal division; rounding happens only at this presentation boundary.
pub fn call_metrics(totals: &CallTotals, rates: &EffectiveRates) -> CallMetrics {
    let inbound_usage = round_usage(
        rates.inbound_call_rate * Decimal::from(totals.inbound_seconds) / SECONDS_PER_MINUTE,
    );
    let outbound_usage = round_usage(
        rates.outbound_call_rate * Decimal::from(totals.outbound_seconds) / SECONDS_PER_MINUTE,
    );
    CallMetrics {
        inbound_calls: totals.inbound_count,
        outbound_calls: totals.outbound_count,
        inbound_seconds: totals.inbound_seconds,
        outbound_seconds: totals.outbound_seconds,
        inbound_usage,
        outbound_usage,
        total_usage: inbound_usage + outbound_usage,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::dec;

    use super::*;

    fn msg(location_id: Uuid, direction: Direction, segments: i64) -> MessageEvent {
        MessageEvent {
            id: Uuid::new_v4(),
            location_id,
            direction,
            segment_count: segments,
            occurred_at: Utc::now(),
        }
    }

    fn call(location_id: Uuid, direction: Direction, seconds: i64) -> CallEvent {
        CallEvent {
            id: Uuid::new_v4(),
            location_id,
            direction,
            duration_seconds: seconds,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn groups_by_direction_and_location() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let events = vec![
            msg(a, Direction::Inbound, 1),
            msg(a, Direction::Inbound, 3),
            msg(a, Direction::Outbound, 2),
            msg(b, Direction::Outbound, 1),
        ];
        let totals = aggregate_messages(&events, &[a, b]);
        assert_eq!(totals[&a].inbound_count, 2);
        assert_eq!(totals[&a].inbound_segments, 4);
        assert_eq!(totals[&a].outbound_count, 1);
        assert_eq!(totals[&b].inbound_count, 0);
        assert_eq!(totals[&b].outbound_count, 1);
    }

    #[test]
    fn roster_location_with_no_events_still_appears() {
        let quiet = Uuid::new_v4();
        let totals = aggregate_messages(&[], &[quiet]);
        assert_eq!(totals[&quiet], MessageTotals::default());

        let calls = aggregate_calls(&[], &[quiet]);
        assert_eq!(calls[&quiet], CallTotals::default());
    }

    #[test]
    fn message_cost_uses_count_not_segments() {
        let rates = EffectiveRates {
            inbound_msg_rate: dec!(0.02),
            ..EffectiveRates::ZERO
        };
        // 3 messages totalling 9 segments: billed per message.
        let totals = MessageTotals {
            inbound_count: 3,
            inbound_segments: 9,
            ..Default::default()
        };
        let metrics = sms_metrics(&totals, &rates);
        assert_eq!(metrics.inbound_usage, dec!(0.06));
        assert_eq!(metrics.inbound_segments, 9);
    }

    #[test]
    fn call_cost_divides_exactly() {
        let rates = EffectiveRates {
            outbound_call_rate: dec!(0.03),
            ..EffectiveRates::ZERO
        };
        // 90 seconds = 1.5 minutes.
        let totals = CallTotals {
            outbound_count: 1,
            outbound_seconds: 90,
            ..Default::default()
        };
        let metrics = call_metrics(&totals, &rates);
        assert_eq!(metrics.outbound_usage, dec!(0.045));
        assert_eq!(metrics.total_usage, dec!(0.045));
    }

    #[test]
    fn aggregation_is_deterministic() {
        let a = Uuid::new_v4();
        let events = vec![
            call(a, Direction::Inbound, 30),
            call(a, Direction::Outbound, 125),
        ];
        let first = aggregate_calls(&events, &[a]);
        let second = aggregate_calls(&events, &[a]);
        assert_eq!(first[&a], second[&a]);
    }
}
