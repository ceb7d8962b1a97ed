// handlers/public/auth/logout.rs - POST /api/auth/logout handler
//
// Tokens are stateless; the client discards its copy.

use serde_json::{json, Value};

use crate::middleware::ApiResponse;

pub async fn logout() -> ApiResponse<Value> {
    ApiResponse::success(json!({ "message": "logged out successfully" }))
}
