//! Repository tests on an in-memory SQLite database with real migrations.

pub mod harness;

mod analytics_cache;
mod events;
