// handlers/protected/account/lookup.rs - POST /api/account/lookup handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::app::AppState;
use crate::database::HierarchyStore;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::{looks_like_email, AccountLookupRequest, AccountLookupResponse};

/// Find a user by email and preview the groups a deletion would cover
pub async fn lookup<S: HierarchyStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<AccountLookupRequest>, JsonRejection>,
) -> ApiResult<AccountLookupResponse> {
    let Json(req) = payload?;

    let email = req.email.trim();
    if email.is_empty() {
        return Err(ApiError::bad_request("email is required"));
    }
    if !looks_like_email(email) {
        return Err(ApiError::bad_request(format!("invalid email: {}", email)));
    }

    let account = state.accounts.lookup_account(email).await?;
    Ok(ApiResponse::success(account))
}
