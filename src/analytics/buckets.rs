//! Time-series bucketing of events at daily/weekly/monthly granularity.
//!
//! Bucket keys are the period start: the calendar date, the Monday of the
//! week, or the first of the month. When a date range is supplied, every
//! period the range touches appears in the output zero-filled; unbounded
//! requests return only periods with traffic. Output is ordered ascending
//! by period key.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};

use crate::{
    db::DateRange,
    models::{
        CallEvent, CallMetrics, CombinedMetrics, DataType, EffectiveRates, Granularity,
        MessageEvent, SmsMetrics, UsageBucket,
    },
};

use super::aggregator::{CallTotals, MessageTotals, call_metrics, sms_metrics};

/// Start of the period containing `date`.
pub fn period_key(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Daily => date,
        Granularity::Weekly => date - Days::new(u64::from(date.weekday().num_days_from_monday())),
        Granularity::Monthly => date.with_day(1).unwrap_or(date),
    }
}

/// Start of the period following the one keyed by `key`.
fn next_period(key: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Daily => key + Days::new(1),
        Granularity::Weekly => key + Days::new(7),
        Granularity::Monthly => {
            let (year, month) = if key.month() == 12 {
                (key.year() + 1, 1)
            } else {
                (key.year(), key.month() + 1)
            };
            NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(key)
        }
    }
}

/// Bucketize events across the scope into priced [`UsageBucket`]s.
///
/// `rates` are the scope-level effective rates (single-location or blended).
/// Families excluded by `data_type` stay present but zeroed, so consumers
/// never branch on missing keys.
pub fn bucketize(
    messages: &[MessageEvent],
    calls: &[CallEvent],
    granularity: Granularity,
    range: Option<DateRange>,
    rates: &EffectiveRates,
    data_type: DataType,
) -> Vec<UsageBucket> {
    let mut periods: BTreeMap<NaiveDate, (MessageTotals, CallTotals)> = BTreeMap::new();

    // Gap fill: seed every period the range touches.
    if let Some(range) = range {
        let mut key = period_key(range.start, granularity);
        while key <= range.end {
            periods.insert(key, (MessageTotals::default(), CallTotals::default()));
            key = next_period(key, granularity);
        }
    }

    let in_range = |date: NaiveDate| match range {
        Some(r) => date >= r.start && date <= r.end,
        None => true,
    };

    if data_type.includes_sms() {
        for event in messages {
            let date = event.occurred_at.date_naive();
            if !in_range(date) {
                continue;
            }
            periods
                .entry(period_key(date, granularity))
                .or_default()
                .0
                .add(event);
        }
    }
    if data_type.includes_calls() {
        for event in calls {
            let date = event.occurred_at.date_naive();
            if !in_range(date) {
                continue;
            }
            periods
                .entry(period_key(date, granularity))
                .or_default()
                .1
                .add(event);
        }
    }

    periods
        .into_iter()
        .map(|(key, (msg_totals, call_totals))| {
            let sms = if data_type.includes_sms() {
                sms_metrics(&msg_totals, rates)
            } else {
                SmsMetrics::default()
            };
            let calls = if data_type.includes_calls() {
                call_metrics(&call_totals, rates)
            } else {
                CallMetrics::default()
            };
            let combined = CombinedMetrics::from_families(&sms, &calls);
            UsageBucket {
                period_key: key,
                sms,
                calls,
                combined,
            }
        })
        .collect()
}

/// Number of periods a range spans at the given granularity. Used by
/// metadata and sanity checks.
pub fn periods_in_range(range: DateRange, granularity: Granularity) -> usize {
    let mut count = 0;
    let mut key = period_key(range.start, granularity);
    while key <= range.end {
        count += 1;
        key = next_period(key, granularity);
    }
    count
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use rust_decimal::dec;
    use uuid::Uuid;

    use crate::models::Direction;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn msg_at(y: i32, m: u32, d: u32, h: u32, min: u32, direction: Direction) -> MessageEvent {
        MessageEvent {
            id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            direction,
            segment_count: 1,
            occurred_at: Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap(),
        }
    }

    // 2024-03-15 is a Friday; its week starts Monday 2024-03-11.
    #[rstest]
    #[case::daily(Granularity::Daily, (2024, 3, 15), (2024, 3, 15))]
    #[case::weekly_mid_week(Granularity::Weekly, (2024, 3, 15), (2024, 3, 11))]
    #[case::weekly_monday_maps_to_itself(Granularity::Weekly, (2024, 3, 11), (2024, 3, 11))]
    #[case::monthly(Granularity::Monthly, (2024, 3, 15), (2024, 3, 1))]
    fn period_key_snaps_to_bucket_start(
        #[case] granularity: Granularity,
        #[case] input: (i32, u32, u32),
        #[case] expected: (i32, u32, u32),
    ) {
        assert_eq!(
            period_key(date(input.0, input.1, input.2), granularity),
            date(expected.0, expected.1, expected.2)
        );
    }

    #[test]
    fn monthly_advance_crosses_year_boundary() {
        assert_eq!(
            next_period(date(2025, 12, 1), Granularity::Monthly),
            date(2026, 1, 1)
        );
    }

    #[test]
    fn zero_fill_covers_every_period_in_range() {
        let range = DateRange {
            start: date(2024, 1, 1),
            end: date(2024, 1, 5),
        };
        let buckets = bucketize(
            &[],
            &[],
            Granularity::Daily,
            Some(range),
            &EffectiveRates::ZERO,
            DataType::Both,
        );
        assert_eq!(buckets.len(), 5);
        assert_eq!(buckets[0].period_key, date(2024, 1, 1));
        assert_eq!(buckets[4].period_key, date(2024, 1, 5));
        for bucket in &buckets {
            assert_eq!(bucket.sms, SmsMetrics::default());
            assert_eq!(bucket.calls, CallMetrics::default());
        }
    }

    #[test]
    fn weekly_zero_fill_spans_partial_weeks() {
        // Wed 2024-03-06 .. Tue 2024-03-12 touches two Monday-keyed weeks.
        let range = DateRange {
            start: date(2024, 3, 6),
            end: date(2024, 3, 12),
        };
        let buckets = bucketize(
            &[],
            &[],
            Granularity::Weekly,
            Some(range),
            &EffectiveRates::ZERO,
            DataType::Both,
        );
        let keys: Vec<NaiveDate> = buckets.iter().map(|b| b.period_key).collect();
        assert_eq!(keys, vec![date(2024, 3, 4), date(2024, 3, 11)]);
    }

    #[test]
    fn unbounded_request_returns_only_populated_periods() {
        let events = vec![msg_at(2024, 3, 1, 9, 0, Direction::Inbound)];
        let buckets = bucketize(
            &events,
            &[],
            Granularity::Daily,
            None,
            &EffectiveRates::ZERO,
            DataType::Both,
        );
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].period_key, date(2024, 3, 1));
    }

    #[test]
    fn structural_symmetry_for_single_family_request() {
        let events = vec![msg_at(2024, 3, 1, 9, 0, Direction::Inbound)];
        let rates = EffectiveRates {
            inbound_msg_rate: dec!(0.02),
            inbound_call_rate: dec!(1.00),
            ..EffectiveRates::ZERO
        };
        let buckets = bucketize(&events, &[], Granularity::Daily, None, &rates, DataType::Sms);
        // The call family is present and zeroed even for an sms-only request.
        assert_eq!(buckets[0].calls, CallMetrics::default());
        assert_eq!(buckets[0].sms.inbound_usage, dec!(0.02));
        assert_eq!(buckets[0].combined.total_usage, dec!(0.02));
    }

    #[test]
    fn daily_scenario_two_days() {
        // 3 inbound messages on 2024-03-01 (09:00, 14:00, 23:59 UTC) and one
        // outbound at 00:01 on 2024-03-02, rates $0.02 in / $0.03 out.
        let events = vec![
            msg_at(2024, 3, 1, 9, 0, Direction::Inbound),
            msg_at(2024, 3, 1, 14, 0, Direction::Inbound),
            msg_at(2024, 3, 1, 23, 59, Direction::Inbound),
            msg_at(2024, 3, 2, 0, 1, Direction::Outbound),
        ];
        let rates = EffectiveRates {
            inbound_msg_rate: dec!(0.02),
            outbound_msg_rate: dec!(0.03),
            ..EffectiveRates::ZERO
        };
        let range = DateRange {
            start: date(2024, 3, 1),
            end: date(2024, 3, 2),
        };
        let buckets = bucketize(
            &events,
            &[],
            Granularity::Daily,
            Some(range),
            &rates,
            DataType::Both,
        );
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].sms.inbound_messages, 3);
        assert_eq!(buckets[0].sms.outbound_messages, 0);
        assert_eq!(buckets[0].sms.total_usage, dec!(0.06));
        assert_eq!(buckets[1].sms.inbound_messages, 0);
        assert_eq!(buckets[1].sms.outbound_messages, 1);
        assert_eq!(buckets[1].sms.total_usage, dec!(0.03));
    }

    #[test]
    fn periods_in_range_counts() {
        let range = DateRange {
            start: date(2024, 1, 1),
            end: date(2024, 3, 15),
        };
        assert_eq!(periods_in_range(range, Granularity::Monthly), 3);
        assert_eq!(periods_in_range(range, Granularity::Daily), 75);
    }
}
