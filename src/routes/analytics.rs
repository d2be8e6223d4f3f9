//! Analytics read and cache-control endpoints.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppState,
    db::DateRange,
    models::{BarGraphData, CacheFilters, CacheType, CompanyUsageRow, DataType, Granularity,
        LocationUsageRow, ViewType},
    services::{AccountViewParams, BarGraphParams, CompanyViewParams},
};

use super::error::ApiError;

/// Query string for the account view. List parameters are comma-separated.
#[derive(Debug, Deserialize)]
pub struct AccountViewQuery {
    pub category: Option<String>,
    pub location_ids: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub async fn get_account_view(
    State(state): State<AppState>,
    Query(query): Query<AccountViewQuery>,
) -> Result<Json<Vec<LocationUsageRow>>, ApiError> {
    let params = AccountViewParams {
        category: query.category,
        location_ids: parse_uuid_list(query.location_ids.as_deref())?,
        range: parse_range(query.start_date, query.end_date)?,
    };
    let rows = state.services.analytics.get_account_view(&params).await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct CompanyViewQuery {
    pub category: Option<String>,
    pub companies: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub async fn get_company_view(
    State(state): State<AppState>,
    Query(query): Query<CompanyViewQuery>,
) -> Result<Json<Vec<CompanyUsageRow>>, ApiError> {
    let params = CompanyViewParams {
        category: query.category,
        companies: parse_string_list(query.companies.as_deref()),
        range: parse_range(query.start_date, query.end_date)?,
    };
    let rows = state.services.analytics.get_company_view(&params).await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct BarGraphQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub granularity: Option<String>,
    pub data_type: Option<String>,
    pub view_type: Option<String>,
    pub location_ids: Option<String>,
    pub companies: Option<String>,
}

pub async fn get_bar_graph(
    State(state): State<AppState>,
    Query(query): Query<BarGraphQuery>,
) -> Result<Json<BarGraphData>, ApiError> {
    let range = DateRange::new(query.start_date, query.end_date)
        .map_err(ApiError::Validation)?;
    let params = BarGraphParams {
        range,
        granularity: parse_enum(query.granularity.as_deref(), Granularity::Daily, |s| {
            Granularity::from_str(s)
        })?,
        data_type: parse_enum(query.data_type.as_deref(), DataType::Both, |s| {
            DataType::from_str(s)
        })?,
        view_type: parse_enum(query.view_type.as_deref(), ViewType::Account, |s| {
            ViewType::from_str(s)
        })?,
        location_ids: parse_uuid_list(query.location_ids.as_deref())?,
        companies: parse_string_list(query.companies.as_deref()),
    };
    let data = state.services.analytics.get_bar_graph(&params).await?;
    Ok(Json(data))
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub cache_types: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub queued: bool,
    pub cache_types: Vec<&'static str>,
}

/// Queue a background refresh and return immediately.
pub async fn post_refresh(
    State(state): State<AppState>,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let cache_types = parse_cache_types(&request.cache_types)?;

    let queued = if cache_types.is_empty() {
        CacheType::ALL.to_vec()
    } else {
        cache_types
    };
    let names = queued.iter().map(|t| t.as_str()).collect();
    state.services.analytics.enqueue_refresh(queued);

    Ok((
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            queued: true,
            cache_types: names,
        }),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct InvalidateRequest {
    pub cache_type: Option<String>,
    pub period_type: Option<String>,
    pub data_type: Option<String>,
    pub category: Option<String>,
    pub company: Option<String>,
    pub location_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub invalidated: u64,
}

/// Bulk-invalidate cache entries. Absent fields match everything.
pub async fn post_invalidate(
    State(state): State<AppState>,
    body: Option<Json<InvalidateRequest>>,
) -> Result<Json<InvalidateResponse>, ApiError> {
    let request = body.map(|Json(b)| b).unwrap_or_default();

    let cache_type = match request.cache_type.as_deref() {
        None => None,
        Some(raw) => Some(
            CacheType::from_str(raw)
                .ok_or_else(|| ApiError::Validation(format!("unknown cache_type: {raw}")))?,
        ),
    };
    let period_type = match request.period_type.as_deref() {
        None => None,
        Some(raw) => Some(
            Granularity::from_str(raw)
                .ok_or_else(|| ApiError::Validation(format!("unknown period_type: {raw}")))?,
        ),
    };
    let data_type = match request.data_type.as_deref() {
        None => None,
        Some(raw) => Some(
            DataType::from_str(raw)
                .ok_or_else(|| ApiError::Validation(format!("unknown data_type: {raw}")))?,
        ),
    };

    let filters = CacheFilters {
        period_type,
        data_type,
        category: request.category,
        company: request.company,
        location_id: request.location_id,
        range_start: None,
        range_end: None,
    };
    let invalidated = state
        .services
        .analytics
        .invalidate_cache(cache_type, Some(&filters))
        .await?;

    Ok(Json(InvalidateResponse { invalidated }))
}

fn parse_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Option<DateRange>, ApiError> {
    match (start, end) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) => DateRange::new(start, end)
            .map(Some)
            .map_err(ApiError::Validation),
        _ => Err(ApiError::Validation(
            "start_date and end_date must be provided together".to_string(),
        )),
    }
}

fn parse_uuid_list(raw: Option<&str>) -> Result<Option<Vec<Uuid>>, ApiError> {
    let Some(raw) = raw else { return Ok(None) };
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s).map_err(|_| ApiError::Validation(format!("invalid location id: {s}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if ids.is_empty() {
        return Err(ApiError::Validation(
            "location_ids must contain at least one id".to_string(),
        ));
    }
    Ok(Some(ids))
}

fn parse_string_list(raw: Option<&str>) -> Option<Vec<String>> {
    let values: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if values.is_empty() { None } else { Some(values) }
}

fn parse_enum<T>(
    raw: Option<&str>,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ApiError> {
    match raw {
        None => Ok(default),
        Some(s) => parse(s).ok_or_else(|| ApiError::Validation(format!("unknown value: {s}"))),
    }
}

fn parse_cache_types(raw: &[String]) -> Result<Vec<CacheType>, ApiError> {
    raw.iter()
        .map(|s| {
            CacheType::from_str(s)
                .ok_or_else(|| ApiError::Validation(format!("unknown cache_type: {s}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_list_parses_and_rejects_garbage() {
        let id = Uuid::new_v4();
        let list = parse_uuid_list(Some(&format!("{id}, {id}"))).expect("parse");
        assert_eq!(list.unwrap().len(), 2);
        assert!(parse_uuid_list(Some("not-a-uuid")).is_err());
        assert!(parse_uuid_list(None).expect("none").is_none());
    }

    #[test]
    fn range_requires_both_endpoints() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(parse_range(Some(date), None).is_err());
        assert!(parse_range(None, None).expect("empty").is_none());
    }

    #[test]
    fn inverted_range_is_a_validation_error() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(parse_range(Some(start), Some(end)).is_err());
    }
}
