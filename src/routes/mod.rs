//! HTTP surface.
//!
//! All routes live under `/v1` except the health probe. The router carries
//! [`AppState`] and a permissive CORS layer for dashboard frontends.

mod analytics;
mod error;
mod health;
mod rates;

pub use error::{ApiError, ErrorResponse};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/v1/analytics/account", get(analytics::get_account_view))
        .route("/v1/analytics/company", get(analytics::get_company_view))
        .route("/v1/analytics/graph", get(analytics::get_bar_graph))
        .route("/v1/analytics/refresh", post(analytics::post_refresh))
        .route(
            "/v1/analytics/cache/invalidate",
            post(analytics::post_invalidate),
        )
        .route(
            "/v1/rates/default",
            get(rates::get_default_rates).put(rates::put_default_rates),
        )
        .route(
            "/v1/rates/{location_id}",
            get(rates::get_rate_card).put(rates::put_rate_card),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
