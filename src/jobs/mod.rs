//! Background workers.
//!
//! Three workers run for the lifetime of the process:
//!
//! - **Refresh worker**: drains the [`RefreshQueue`] and recomputes cached
//!   analytics payloads, one job at a time.
//! - **Periodic refresh**: feeds a full-refresh job into the queue at a
//!   fixed interval so dashboards stay warm without traffic.
//! - **Retention sweep**: physically deletes cache entries past the
//!   retention window.
//!
//! Workers follow a consistent pattern: a start function that loops
//! forever, a run function for a single pass, and a structured result type
//! logged with tracing fields. A failed pass is logged and never takes
//! down the worker or its siblings.

mod queue;
mod refresh;
mod retention;

pub use queue::{RefreshJob, RefreshQueue};
pub use refresh::{start_periodic_refresh_worker, start_refresh_worker};
pub use retention::start_retention_sweep_worker;
