// handlers/public/auth/callback.rs - GET /api/auth/callback handler

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::{generate_jwt, validate_email_domain, AuthError, Claims};
use crate::database::HierarchyStore;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub email: String,
    pub name: String,
    pub picture: String,
}

#[derive(Debug, Serialize)]
pub struct SessionToken {
    pub token: String,
    pub user: SessionUser,
}

/// Complete the OAuth flow and exchange Google's code for our JWT
pub async fn callback<S: HierarchyStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<SessionToken> {
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("missing authorization code"))?;

    // CSRF check; each state is accepted once
    let csrf_state = query.state.unwrap_or_default();
    if !state.oauth_states.consume(&csrf_state).await {
        return Err(AuthError::InvalidState.into());
    }

    let access_token = state.google.exchange_code(&code).await?;
    let info = state.google.user_info(&access_token).await?;

    if let Err(e) = validate_email_domain(&info.email, &state.security.allowed_email_domain) {
        tracing::warn!("Rejected sign-in from {}: {}", info.email, e);
        return Err(e.into());
    }
    if !info.verified_email {
        return Err(AuthError::EmailNotVerified.into());
    }

    let claims = Claims::new(
        info.email.clone(),
        info.name.clone(),
        info.picture.clone(),
        state.security.jwt_expiry_hours,
    );
    let token = generate_jwt(&claims, &state.security)?;

    tracing::info!("Administrator {} signed in", info.email);

    Ok(ApiResponse::success(SessionToken {
        token,
        user: SessionUser {
            email: info.email,
            name: info.name,
            picture: info.picture,
        },
    }))
}
