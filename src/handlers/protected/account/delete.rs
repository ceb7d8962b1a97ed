// handlers/protected/account/delete.rs - POST /api/account/delete handler

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};

use crate::app::AppState;
use crate::database::HierarchyStore;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::types::{DeleteAccountRequest, DeleteAccountResponse};

/// Cascade soft-delete the selected groups and the user.
///
/// The acting administrator is always the JWT subject; the payload has no
/// say in `deleted_by`.
pub async fn delete<S: HierarchyStore>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<DeleteAccountRequest>, JsonRejection>,
) -> ApiResult<DeleteAccountResponse> {
    let Json(mut req) = payload?;

    req.validate().map_err(ApiError::bad_request)?;
    req.email = req.email.trim().to_string();
    req.deleted_by = user.email;

    tracing::info!(
        "{} requested deletion of {} ({}) with {} group(s)",
        req.deleted_by,
        req.email,
        req.user_id,
        req.group_ids.len()
    );

    let result = state.accounts.delete_account(&req).await?;
    Ok(ApiResponse::success(result))
}
