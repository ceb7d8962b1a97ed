// handlers/protected/auth/me.rs - GET /api/auth/me handler

use axum::Extension;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, AuthUser};

/// Identity of the signed-in administrator, straight from the JWT
pub async fn me(Extension(user): Extension<AuthUser>) -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "email": user.email,
        "name": user.name,
        "picture": user.picture,
    }))
}
