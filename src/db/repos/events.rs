use async_trait::async_trait;

use super::EventFilter;
use crate::{
    db::error::DbResult,
    models::{CallEvent, MessageEvent},
};

/// Read-mostly store of raw events. Events are written once by the
/// ingestion subsystem (here: the insert seam used by ingestion and tests)
/// and never mutated afterwards.
#[async_trait]
pub trait EventRepo: Send + Sync {
    /// Insert a message event. Duplicate ids are ignored so upstream
    /// re-syncs stay idempotent.
    async fn insert_message(&self, event: &MessageEvent) -> DbResult<()>;

    /// Insert a call event, same idempotency contract.
    async fn insert_call(&self, event: &CallEvent) -> DbResult<()>;

    /// Message events matching the filter.
    async fn query_messages(&self, filter: &EventFilter) -> DbResult<Vec<MessageEvent>>;

    /// Call events matching the filter.
    async fn query_calls(&self, filter: &EventFilter) -> DbResult<Vec<CallEvent>>;
}
