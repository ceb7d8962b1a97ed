// handlers/protected/account/audit_logs.rs - GET /api/account/audit-logs handler

use axum::extract::{Query, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::HierarchyStore;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::AuditLogPage;

/// Raw query values; parsed leniently so junk falls back to defaults
#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

pub async fn audit_logs<S: HierarchyStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<AuditLogQuery>,
) -> ApiResult<AuditLogPage> {
    let (limit, offset) = state.audit.clamp(query.limit.as_deref(), query.offset.as_deref());

    let logs = state.accounts.list_audit_logs(limit, offset).await?;
    Ok(ApiResponse::success(AuditLogPage { logs, limit, offset }))
}
