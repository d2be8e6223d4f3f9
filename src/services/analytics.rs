//! Analytics read path and refresh entry point.
//!
//! Handlers call into this service, which validates parameters, consults
//! the cache, and falls back to a synchronous computation on a miss. The
//! computation itself is shared with the background refresh worker, so a
//! payload is identical whether it was served hot or precomputed.

use std::{collections::HashMap, sync::Arc};

use chrono::{Days, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    analytics::{
        aggregate_calls, aggregate_messages, bucketize, compose_account_view,
        compose_company_view, rates::RateModel,
    },
    cache::{AnalyticsCacheService, CacheError, CacheLookupResult},
    db::{DateRange, DbError, DbPool, EventFilter, LocationFilter},
    jobs::{RefreshJob, RefreshQueue},
    models::{
        BarGraphData, BarGraphMeta, CacheFilters, CacheType, CompanyUsageRow, DataType,
        EffectiveRates, Granularity, Location, LocationUsageRow, ViewType,
    },
};

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Parameters for the account (per-location) view.
#[derive(Debug, Clone, Default)]
pub struct AccountViewParams {
    pub category: Option<String>,
    pub location_ids: Option<Vec<Uuid>>,
    pub range: Option<DateRange>,
}

/// Parameters for the company (per-tenant) view.
#[derive(Debug, Clone, Default)]
pub struct CompanyViewParams {
    pub category: Option<String>,
    pub companies: Option<Vec<String>>,
    pub range: Option<DateRange>,
}

/// Parameters for the time-series bar graph.
#[derive(Debug, Clone)]
pub struct BarGraphParams {
    pub range: DateRange,
    pub granularity: Granularity,
    pub data_type: DataType,
    pub view_type: ViewType,
    pub location_ids: Option<Vec<Uuid>>,
    pub companies: Option<Vec<String>>,
}

/// Outcome of a refresh pass, one count per payload written.
#[derive(Debug, Default)]
pub struct RefreshRunResult {
    pub payloads_written: u64,
    pub payloads_failed: u64,
}

#[derive(Clone)]
pub struct AnalyticsService {
    db: Arc<DbPool>,
    cache: Arc<AnalyticsCacheService>,
    refresh_queue: RefreshQueue,
    max_age: chrono::Duration,
}

impl AnalyticsService {
    pub fn new(
        db: Arc<DbPool>,
        cache: Arc<AnalyticsCacheService>,
        refresh_queue: RefreshQueue,
        max_age: chrono::Duration,
    ) -> Self {
        Self {
            db,
            cache,
            refresh_queue,
            max_age,
        }
    }

    /// Account view: one row per approved location in scope.
    ///
    /// Cacheable requests (at most one scope dimension per cache slot) go
    /// through the cache; a miss computes synchronously, stores the result
    /// best-effort, and enqueues a background refresh of the view.
    pub async fn get_account_view(
        &self,
        params: &AccountViewParams,
    ) -> AnalyticsResult<Vec<LocationUsageRow>> {
        let cache_filters = account_cache_filters(params);

        if let Some(filters) = &cache_filters
            && let CacheLookupResult::Hit(entry) = self
                .cache
                .get(CacheType::AccountView, filters, self.max_age)
                .await
        {
            return serde_json::from_value(entry.payload)
                .map_err(|e| DbError::Json(e).into());
        }

        let rows = self.compute_account_view(params).await?;

        if let Some(filters) = cache_filters {
            let payload = serde_json::to_value(&rows).map_err(DbError::Json)?;
            let total = rows.len() as i64;
            if let Err(e) = self
                .cache
                .put(CacheType::AccountView, filters, payload, total)
                .await
            {
                tracing::warn!(error = %e, "Failed to store account view after cache miss");
            }
            self.refresh_queue
                .enqueue(RefreshJob::of(CacheType::AccountView));
        }

        Ok(rows)
    }

    /// Company view: member-location volumes summed, priced at the blended
    /// mean rate. Same cache contract as the account view.
    pub async fn get_company_view(
        &self,
        params: &CompanyViewParams,
    ) -> AnalyticsResult<Vec<CompanyUsageRow>> {
        let cache_filters = company_cache_filters(params);

        if let Some(filters) = &cache_filters
            && let CacheLookupResult::Hit(entry) = self
                .cache
                .get(CacheType::CompanyView, filters, self.max_age)
                .await
        {
            return serde_json::from_value(entry.payload)
                .map_err(|e| DbError::Json(e).into());
        }

        let rows = self.compute_company_view(params).await?;

        if let Some(filters) = cache_filters {
            let payload = serde_json::to_value(&rows).map_err(DbError::Json)?;
            let total = rows.len() as i64;
            if let Err(e) = self
                .cache
                .put(CacheType::CompanyView, filters, payload, total)
                .await
            {
                tracing::warn!(error = %e, "Failed to store company view after cache miss");
            }
            self.refresh_queue
                .enqueue(RefreshJob::of(CacheType::CompanyView));
        }

        Ok(rows)
    }

    /// Time-series buckets over the scoped events. The range is required
    /// and every period it touches is present in the output, zeros
    /// included.
    pub async fn get_bar_graph(&self, params: &BarGraphParams) -> AnalyticsResult<BarGraphData> {
        validate_bar_graph_scope(params)?;

        let cache_filters = bar_graph_cache_filters(params);

        if let Some(filters) = &cache_filters
            && let CacheLookupResult::Hit(entry) = self
                .cache
                .get(CacheType::BarGraph, filters, self.max_age)
                .await
        {
            return serde_json::from_value(entry.payload)
                .map_err(|e| DbError::Json(e).into());
        }

        let data = self.compute_bar_graph(params).await?;

        if let Some(filters) = cache_filters {
            let payload = serde_json::to_value(&data).map_err(DbError::Json)?;
            let total = data.buckets.len() as i64;
            if let Err(e) = self
                .cache
                .put(CacheType::BarGraph, filters, payload, total)
                .await
            {
                tracing::warn!(error = %e, "Failed to store bar graph after cache miss");
            }
            self.refresh_queue
                .enqueue(RefreshJob::of(CacheType::BarGraph));
        }

        Ok(data)
    }

    /// Queue a background refresh. Empty input refreshes every cache type.
    pub fn enqueue_refresh(&self, cache_types: Vec<CacheType>) {
        let job = if cache_types.is_empty() {
            RefreshJob::all()
        } else {
            RefreshJob { cache_types }
        };
        self.refresh_queue.enqueue(job);
    }

    /// Bulk-invalidate cache entries.
    pub async fn invalidate_cache(
        &self,
        cache_type: Option<CacheType>,
        filters: Option<&CacheFilters>,
    ) -> AnalyticsResult<u64> {
        Ok(self.cache.invalidate(cache_type, filters).await?)
    }

    /// Recompute and store the default payload for each cache type. Called
    /// from the refresh worker; failures are counted, not propagated, so
    /// one bad payload never stops the rest of the pass.
    pub async fn refresh(&self, cache_types: &[CacheType]) -> RefreshRunResult {
        let mut result = RefreshRunResult::default();
        for &cache_type in cache_types {
            match self.refresh_one(cache_type).await {
                Ok(()) => result.payloads_written += 1,
                Err(e) => {
                    tracing::error!(
                        cache_type = cache_type.as_str(),
                        error = %e,
                        "Failed to refresh analytics payload"
                    );
                    result.payloads_failed += 1;
                }
            }
        }
        result
    }

    async fn refresh_one(&self, cache_type: CacheType) -> AnalyticsResult<()> {
        match cache_type {
            CacheType::AccountView => {
                let params = AccountViewParams::default();
                let rows = self.compute_account_view(&params).await?;
                let filters = account_cache_filters(&params)
                    .unwrap_or_default();
                let payload = serde_json::to_value(&rows).map_err(DbError::Json)?;
                let total = rows.len() as i64;
                self.cache
                    .put(CacheType::AccountView, filters, payload, total)
                    .await?;
            }
            CacheType::CompanyView => {
                let params = CompanyViewParams::default();
                let rows = self.compute_company_view(&params).await?;
                let filters = company_cache_filters(&params)
                    .unwrap_or_default();
                let payload = serde_json::to_value(&rows).map_err(DbError::Json)?;
                let total = rows.len() as i64;
                self.cache
                    .put(CacheType::CompanyView, filters, payload, total)
                    .await?;
            }
            CacheType::BarGraph => {
                let params = default_bar_graph_params();
                let data = self.compute_bar_graph(&params).await?;
                let filters = bar_graph_cache_filters(&params)
                    .unwrap_or_default();
                let payload = serde_json::to_value(&data).map_err(DbError::Json)?;
                let total = data.buckets.len() as i64;
                self.cache
                    .put(CacheType::BarGraph, filters, payload, total)
                    .await?;
            }
        }
        Ok(())
    }

    async fn compute_account_view(
        &self,
        params: &AccountViewParams,
    ) -> AnalyticsResult<Vec<LocationUsageRow>> {
        let locations = self
            .db
            .locations()
            .list(&LocationFilter {
                location_ids: params.location_ids.clone(),
                company_name: None,
                category: params.category.clone(),
                approved_only: true,
            })
            .await?;

        let (msg_totals, call_totals) = self.aggregate_scope(&locations, params.range).await?;
        let (_, rates_by_location) = self.resolve_rates(&locations).await?;

        Ok(compose_account_view(
            &locations,
            &msg_totals,
            &call_totals,
            &rates_by_location,
        ))
    }

    async fn compute_company_view(
        &self,
        params: &CompanyViewParams,
    ) -> AnalyticsResult<Vec<CompanyUsageRow>> {
        let mut locations = self
            .db
            .locations()
            .list(&LocationFilter {
                location_ids: None,
                company_name: None,
                category: params.category.clone(),
                approved_only: true,
            })
            .await?;

        if let Some(companies) = &params.companies {
            locations.retain(|l| {
                companies
                    .iter()
                    .any(|c| l.company_name.as_deref() == Some(c.as_str()))
            });
        }

        let (msg_totals, call_totals) = self.aggregate_scope(&locations, params.range).await?;
        let (rate_model, rates_by_location) = self.resolve_rates(&locations).await?;

        Ok(compose_company_view(
            &locations,
            &msg_totals,
            &call_totals,
            &rates_by_location,
            &rate_model,
        ))
    }

    async fn compute_bar_graph(&self, params: &BarGraphParams) -> AnalyticsResult<BarGraphData> {
        let mut locations = self
            .db
            .locations()
            .list(&LocationFilter {
                location_ids: params.location_ids.clone(),
                company_name: None,
                category: None,
                approved_only: true,
            })
            .await?;

        if let Some(companies) = &params.companies {
            locations.retain(|l| {
                companies
                    .iter()
                    .any(|c| l.company_name.as_deref() == Some(c.as_str()))
            });
        }

        let roster: Vec<Uuid> = locations.iter().map(|l| l.id).collect();
        let filter = EventFilter {
            location_ids: Some(roster.clone()),
            range: Some(params.range),
        };
        let messages = self.db.events().query_messages(&filter).await?;
        let calls = self.db.events().query_calls(&filter).await?;

        let (rate_model, rates_by_location) = self.resolve_rates(&locations).await?;
        // A single-location scope prices at that location's rates; any
        // wider scope uses the blended mean.
        let scope_rates = if let [only] = roster.as_slice() {
            rates_by_location
                .get(only)
                .copied()
                .unwrap_or(EffectiveRates::ZERO)
        } else {
            let member_rates: Vec<EffectiveRates> =
                roster.iter().filter_map(|id| rates_by_location.get(id).copied()).collect();
            rate_model.blended(&member_rates)
        };

        let buckets = bucketize(
            &messages,
            &calls,
            params.granularity,
            Some(params.range),
            &scope_rates,
            params.data_type,
        );

        Ok(BarGraphData {
            buckets,
            meta: BarGraphMeta {
                granularity: params.granularity,
                data_type: params.data_type,
                view_type: params.view_type,
                range_start: params.range.start,
                range_end: params.range.end,
                locations_count: roster.len() as i64,
            },
        })
    }

    async fn aggregate_scope(
        &self,
        locations: &[Location],
        range: Option<DateRange>,
    ) -> AnalyticsResult<(
        HashMap<Uuid, crate::analytics::MessageTotals>,
        HashMap<Uuid, crate::analytics::CallTotals>,
    )> {
        let roster: Vec<Uuid> = locations.iter().map(|l| l.id).collect();
        let filter = EventFilter {
            location_ids: Some(roster.clone()),
            range,
        };
        let messages = self.db.events().query_messages(&filter).await?;
        let calls = self.db.events().query_calls(&filter).await?;
        Ok((
            aggregate_messages(&messages, &roster),
            aggregate_calls(&calls, &roster),
        ))
    }

    async fn resolve_rates(
        &self,
        locations: &[Location],
    ) -> AnalyticsResult<(RateModel, HashMap<Uuid, EffectiveRates>)> {
        let defaults = self.db.rate_configs().get_or_create_default().await?;
        let model = RateModel::new(defaults);

        let cards: HashMap<Uuid, _> = self
            .db
            .rate_configs()
            .list_rate_cards()
            .await?
            .into_iter()
            .map(|card| (card.location_id, card))
            .collect();

        let rates = locations
            .iter()
            .map(|l| (l.id, model.for_location(cards.get(&l.id))))
            .collect();
        Ok((model, rates))
    }
}

/// Cache slot for an account-view request, or `None` when the scope cannot
/// be keyed (multi-valued location filter).
fn account_cache_filters(params: &AccountViewParams) -> Option<CacheFilters> {
    let location_id = match params.location_ids.as_deref() {
        None => None,
        Some([only]) => Some(*only),
        Some(_) => return None,
    };
    Some(CacheFilters {
        category: params.category.clone(),
        location_id,
        range_start: params.range.map(|r| r.start),
        range_end: params.range.map(|r| r.end),
        ..CacheFilters::default()
    })
}

fn company_cache_filters(params: &CompanyViewParams) -> Option<CacheFilters> {
    let company = match params.companies.as_deref() {
        None => None,
        Some([only]) => Some(only.clone()),
        Some(_) => return None,
    };
    Some(CacheFilters {
        category: params.category.clone(),
        company,
        range_start: params.range.map(|r| r.start),
        range_end: params.range.map(|r| r.end),
        ..CacheFilters::default()
    })
}

fn bar_graph_cache_filters(params: &BarGraphParams) -> Option<CacheFilters> {
    let location_id = match params.location_ids.as_deref() {
        None => None,
        Some([only]) => Some(*only),
        Some(_) => return None,
    };
    let company = match params.companies.as_deref() {
        None => None,
        Some([only]) => Some(only.clone()),
        Some(_) => return None,
    };
    Some(CacheFilters {
        period_type: Some(params.granularity),
        data_type: Some(params.data_type),
        category: None,
        company,
        location_id,
        range_start: Some(params.range.start),
        range_end: Some(params.range.end),
    })
}

fn validate_bar_graph_scope(params: &BarGraphParams) -> AnalyticsResult<()> {
    match params.view_type {
        ViewType::Account if params.companies.is_some() => Err(AnalyticsError::Validation(
            "company filters are not valid for an account view".to_string(),
        )),
        ViewType::Company if params.location_ids.is_some() => Err(AnalyticsError::Validation(
            "location filters are not valid for a company view".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Default bar-graph payload for background refreshes: the trailing 30
/// days, daily, both traffic families, account scope.
fn default_bar_graph_params() -> BarGraphParams {
    let today = Utc::now().date_naive();
    let start = today.checked_sub_days(Days::new(29)).unwrap_or(today);
    BarGraphParams {
        // start <= today by construction
        range: DateRange { start, end: today },
        granularity: Granularity::Daily,
        data_type: DataType::Both,
        view_type: ViewType::Account,
        location_ids: None,
        companies: None,
    }
}
