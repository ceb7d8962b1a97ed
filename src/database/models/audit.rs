use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Action recorded for every committed cascade
pub const ACCOUNT_DELETION: &str = "ACCOUNT_DELETION";

/// Stored audit row. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    pub id: String,
    pub action: String,
    pub deleted_by_email: String,
    pub target_email: String,
    pub target_user_id: String,
    pub group_ids: Vec<String>,
    pub reason: Option<String>,
    pub deleted_groups: i32,
    pub deleted_companies: i32,
    pub deleted_locations: i32,
    pub created_at: DateTime<Utc>,
}

/// Audit row as written inside the deletion transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub action: &'static str,
    pub deleted_by_email: String,
    pub target_email: String,
    pub target_user_id: String,
    pub group_ids: Vec<String>,
    pub reason: Option<String>,
    pub deleted_groups: i32,
    pub deleted_companies: i32,
    pub deleted_locations: i32,
    pub created_at: DateTime<Utc>,
}
