mod analytics;
mod cache_entry;
mod events;
mod location;
mod rate_card;

pub use analytics::*;
pub use cache_entry::*;
pub use events::*;
pub use location::*;
pub use rate_card::*;
