//! Request and response shapes exchanged at the HTTP boundary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::AuditLogEntry;

#[derive(Debug, Clone, Deserialize)]
pub struct AccountLookupRequest {
    #[serde(default)]
    pub email: String,
}

/// Group preview with aggregate counts of what a deletion would touch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub id: String,
    pub name: String,
    pub company_count: i64,
    pub location_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLookupResponse {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub groups: Vec<GroupInfo>,
}

/// Deletion payload. `deleted_by` never comes from the wire; the handler
/// fills it from the authenticated caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteAccountRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub group_ids: Vec<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(skip)]
    pub deleted_by: String,
}

impl DeleteAccountRequest {
    /// Boundary checks, run before any database work
    pub fn validate(&self) -> Result<(), String> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err("email is required".to_string());
        }
        if !looks_like_email(email) {
            return Err(format!("invalid email: {}", email));
        }
        if self.user_id.trim().is_empty() {
            return Err("user_id is required".to_string());
        }
        if self.group_ids.is_empty() {
            return Err("group_ids must contain at least one group".to_string());
        }
        if self.group_ids.iter().any(|id| id.trim().is_empty()) {
            return Err("group_ids must not contain empty ids".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub message: String,
    pub deleted_groups: i32,
    pub deleted_companies: i32,
    pub deleted_locations: i32,
    pub deleted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditLogPage {
    pub logs: Vec<AuditLogEntry>,
    pub limit: i64,
    pub offset: i64,
}

/// Minimal shape check: one '@' with non-empty local part and a dotted domain
pub fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}
