// handlers/public/auth/login.rs - GET /api/auth/login handler

use axum::extract::State;
use serde::Serialize;

use crate::app::AppState;
use crate::database::HierarchyStore;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct LoginUrl {
    pub url: String,
}

/// Start the OAuth flow: mint a single-use state and return the consent URL
pub async fn login<S: HierarchyStore>(State(state): State<AppState<S>>) -> ApiResult<LoginUrl> {
    let csrf_state = state.oauth_states.issue().await;
    let url = state.google.login_url(&csrf_state)?;

    Ok(ApiResponse::success(LoginUrl { url }))
}
