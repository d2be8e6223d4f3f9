//! Account and company view composition.
//!
//! The account view is anchored on the location roster: one row per approved
//! location, zero usage included. The company view sums member-location
//! volumes but prices them at the blended (mean) rate from the rate model;
//! volumes aggregate by sum, prices by mean, and the asymmetry is a product
//! decision carried over from existing reports.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::models::{
    CombinedMetrics, CompanyUsageRow, EffectiveRates, Location, LocationUsageRow,
};

use super::{
    aggregator::{CallTotals, MessageTotals, call_metrics, sms_metrics},
    rates::RateModel,
};

/// One row per location, roster-driven, sorted by (company, location) with
/// null company sorting as the empty string.
pub fn compose_account_view(
    locations: &[Location],
    msg_totals: &HashMap<Uuid, MessageTotals>,
    call_totals: &HashMap<Uuid, CallTotals>,
    rates_by_location: &HashMap<Uuid, EffectiveRates>,
) -> Vec<LocationUsageRow> {
    let mut rows: Vec<LocationUsageRow> = locations
        .iter()
        .map(|location| {
            let rates = rates_by_location
                .get(&location.id)
                .copied()
                .unwrap_or(EffectiveRates::ZERO);
            let message_totals = msg_totals.get(&location.id).copied().unwrap_or_default();
            let location_calls = call_totals.get(&location.id).copied().unwrap_or_default();
            let sms = sms_metrics(&message_totals, &rates);
            let calls = call_metrics(&location_calls, &rates);
            let combined = CombinedMetrics::from_families(&sms, &calls);
            LocationUsageRow {
                location_id: location.id,
                location_name: location.name.clone(),
                company_name: location.company_name.clone(),
                category: location.category.clone(),
                sms,
                calls,
                combined,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        let company_a = a.company_name.as_deref().unwrap_or("");
        let company_b = b.company_name.as_deref().unwrap_or("");
        company_a
            .cmp(company_b)
            .then_with(|| a.location_name.cmp(&b.location_name))
    });
    rows
}

/// One row per distinct company among the given locations. Locations with
/// no company group under the empty company name so their usage is never
/// dropped.
pub fn compose_company_view(
    locations: &[Location],
    msg_totals: &HashMap<Uuid, MessageTotals>,
    call_totals: &HashMap<Uuid, CallTotals>,
    rates_by_location: &HashMap<Uuid, EffectiveRates>,
    rate_model: &RateModel,
) -> Vec<CompanyUsageRow> {
    struct CompanyAccumulator {
        locations: Vec<Uuid>,
        messages: MessageTotals,
        calls: CallTotals,
    }

    let mut companies: BTreeMap<String, CompanyAccumulator> = BTreeMap::new();
    for location in locations {
        let company = location.company_name.clone().unwrap_or_default();
        let acc = companies.entry(company).or_insert_with(|| CompanyAccumulator {
            locations: Vec::new(),
            messages: MessageTotals::default(),
            calls: CallTotals::default(),
        });
        acc.locations.push(location.id);
        if let Some(totals) = msg_totals.get(&location.id) {
            acc.messages.merge(totals);
        }
        if let Some(totals) = call_totals.get(&location.id) {
            acc.calls.merge(totals);
        }
    }

    companies
        .into_iter()
        .map(|(company_name, acc)| {
            let member_rates: Vec<EffectiveRates> = acc
                .locations
                .iter()
                .map(|id| {
                    rates_by_location
                        .get(id)
                        .copied()
                        .unwrap_or(EffectiveRates::ZERO)
                })
                .collect();
            let blended = rate_model.blended(&member_rates);
            let sms = sms_metrics(&acc.messages, &blended);
            let calls = call_metrics(&acc.calls, &blended);
            let combined = CombinedMetrics::from_families(&sms, &calls);
            CompanyUsageRow {
                company_name,
                locations_count: acc.locations.len() as i64,
                sms,
                calls,
                combined,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::{Decimal, dec};

    use crate::models::DefaultRates;

    use super::*;

    fn location(name: &str, company: Option<&str>) -> Location {
        Location {
            id: Uuid::new_v4(),
            name: name.to_string(),
            company_name: company.map(str::to_string),
            category: None,
            approved: true,
            created_at: Utc::now(),
        }
    }

    fn zero_defaults() -> DefaultRates {
        DefaultRates {
            inbound_msg_rate: Decimal::ZERO,
            outbound_msg_rate: Decimal::ZERO,
            inbound_call_rate: Decimal::ZERO,
            outbound_call_rate: Decimal::ZERO,
            call_price_ratio: Decimal::ONE,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn account_view_keeps_zero_usage_locations() {
        let quiet = location("Quiet Branch", Some("Acme"));
        let rows = compose_account_view(
            std::slice::from_ref(&quiet),
            &HashMap::new(),
            &HashMap::new(),
            &HashMap::new(),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sms.inbound_messages, 0);
        assert_eq!(rows[0].combined.total_usage, Decimal::ZERO);
    }

    #[test]
    fn account_view_sort_treats_null_company_as_empty() {
        let a = location("Zeta", None);
        let b = location("Alpha", Some("Acme"));
        let c = location("Beta", Some("Acme"));
        let rows = compose_account_view(
            &[b.clone(), a.clone(), c.clone()],
            &HashMap::new(),
            &HashMap::new(),
            &HashMap::new(),
        );
        let names: Vec<&str> = rows.iter().map(|r| r.location_name.as_str()).collect();
        // Null company sorts as "" and therefore first.
        assert_eq!(names, vec!["Zeta", "Alpha", "Beta"]);
    }

    #[test]
    fn company_sums_volumes_but_blends_rates() {
        // Location A: 10 inbound messages @ $0.05; location B: 0 @ $0.15.
        // Volumes sum to 10; the rate is the mean $0.10, so usage is $1.00,
        // not the per-location-then-summed $0.50.
        let a = location("A", Some("Acme"));
        let b = location("B", Some("Acme"));
        let mut msg_totals = HashMap::new();
        msg_totals.insert(
            a.id,
            MessageTotals {
                inbound_count: 10,
                inbound_segments: 10,
                ..Default::default()
            },
        );
        msg_totals.insert(b.id, MessageTotals::default());
        let mut rates = HashMap::new();
        rates.insert(
            a.id,
            EffectiveRates {
                inbound_msg_rate: dec!(0.05),
                ..EffectiveRates::ZERO
            },
        );
        rates.insert(
            b.id,
            EffectiveRates {
                inbound_msg_rate: dec!(0.15),
                ..EffectiveRates::ZERO
            },
        );
        let model = RateModel::new(zero_defaults());
        let rows = compose_company_view(
            &[a, b],
            &msg_totals,
            &HashMap::new(),
            &rates,
            &model,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].locations_count, 2);
        assert_eq!(rows[0].sms.inbound_messages, 10);
        assert_eq!(rows[0].sms.inbound_usage, dec!(1.00));
    }

    #[test]
    fn company_rows_sorted_by_name() {
        let rows = compose_company_view(
            &[
                location("L1", Some("Zebra")),
                location("L2", Some("Acme")),
            ],
            &HashMap::new(),
            &HashMap::new(),
            &HashMap::new(),
            &RateModel::new(zero_defaults()),
        );
        let names: Vec<&str> = rows.iter().map(|r| r.company_name.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Zebra"]);
    }

    #[test]
    fn locations_count_includes_zero_usage_members() {
        let rows = compose_company_view(
            &[
                location("L1", Some("Acme")),
                location("L2", Some("Acme")),
                location("L3", Some("Acme")),
            ],
            &HashMap::new(),
            &HashMap::new(),
            &HashMap::new(),
            &RateModel::new(zero_defaults()),
        );
        assert_eq!(rows[0].locations_count, 3);
    }
}
