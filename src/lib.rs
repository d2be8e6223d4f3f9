//! Usage metering and billing analytics for communications platforms.
//!
//! Raw message and call events are priced against per-location rate cards
//! (with global defaults), aggregated into per-location "account" and
//! per-company views plus gap-filled time series, and served from a
//! database-backed cache that background workers keep warm.

use std::sync::Arc;

pub mod analytics;
pub mod cache;
pub mod config;
pub mod db;
pub mod jobs;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;

/// Shared state for every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::TollgateConfig>,
    pub db: Arc<db::DbPool>,
    pub services: services::Services,
}
