use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer location synced from the upstream CRM.
///
/// Locations anchor the account view: every approved location gets a row in
/// analytics output whether or not it has traffic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    /// Owning company, if the location belongs to one.
    pub company_name: Option<String>,
    /// Free-form category tag used for filtering (e.g. "dental", "hvac").
    pub category: Option<String>,
    /// Only approved locations appear in analytics views.
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a location record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLocation {
    pub name: String,
    pub company_name: Option<String>,
    pub category: Option<String>,
    #[serde(default = "default_approved")]
    pub approved: bool,
}

fn default_approved() -> bool {
    true
}
