//! Usage analytics computation: rate resolution, directional aggregation,
//! period bucketing, and view composition.
//!
//! Everything in this module is pure and in-memory. Event rows and rate
//! configuration come in from the repositories; the results are transient
//! values owned by the caller (a request handler or a refresh job) and only
//! become durable when the cache layer stores them.

pub mod aggregator;
pub mod buckets;
pub mod rates;
pub mod views;

pub use aggregator::{CallTotals, MessageTotals, aggregate_calls, aggregate_messages};
pub use buckets::bucketize;
pub use rates::RateModel;
pub use views::{compose_account_view, compose_company_view};
