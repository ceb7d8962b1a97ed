use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::HeaderValue,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{GoogleOAuth, OAuthStateStore};
use crate::config::{AppConfig, AuditConfig, SecurityConfig};
use crate::database::HierarchyStore;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, ApiResponse, ApiResult};
use crate::services::AccountService;

/// Shared handles given to every handler
pub struct AppState<S> {
    pub accounts: Arc<AccountService<S>>,
    pub security: Arc<SecurityConfig>,
    pub audit: AuditConfig,
    pub google: GoogleOAuth,
    pub oauth_states: OAuthStateStore,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            security: Arc::clone(&self.security),
            audit: self.audit.clone(),
            google: self.google.clone(),
            oauth_states: self.oauth_states.clone(),
        }
    }
}

impl<S: HierarchyStore> AppState<S> {
    pub fn new(store: S, config: &AppConfig) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(store)),
            security: Arc::new(config.security.clone()),
            audit: config.audit.clone(),
            google: GoogleOAuth::new(config.google.clone()),
            oauth_states: OAuthStateStore::new(Duration::from_secs(config.security.oauth_state_ttl_secs)),
        }
    }
}

pub fn app<S: HierarchyStore + 'static>(state: AppState<S>) -> Router {
    let cors = cors_layer(&state.security.cors_origins);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health::<S>))
        .merge(auth_public_routes::<S>())
        // Protected API
        .merge(protected_routes(state.clone()))
        .with_state(state)
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes<S: HierarchyStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/api/auth/login", get(public::auth::login::<S>))
        .route("/api/auth/callback", get(public::auth::callback::<S>))
        .route("/api/auth/logout", post(public::auth::logout))
}

fn protected_routes<S: HierarchyStore + 'static>(state: AppState<S>) -> Router<AppState<S>> {
    Router::new()
        .route("/api/auth/me", get(protected::auth::me))
        .route("/api/account/lookup", post(protected::account::lookup::<S>))
        .route("/api/account/delete", post(protected::account::delete::<S>))
        .route("/api/account/audit-logs", get(protected::account::audit_logs::<S>))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.security),
            jwt_auth_middleware,
        ))
}

/// Configured origins when given, otherwise permissive (local development)
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    if allowed.is_empty() {
        if crate::is_production!() {
            tracing::warn!("No CORS origins configured in production; allowing any origin");
        }
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Account Purge API",
            "version": version,
            "description": "Look up user accounts and cascade soft-delete their groups, companies and locations",
            "endpoints": {
                "health": "/health (public)",
                "auth": "/api/auth/login, /api/auth/callback, /api/auth/logout (public)",
                "me": "/api/auth/me (protected)",
                "lookup": "POST /api/account/lookup (protected)",
                "delete": "POST /api/account/delete (protected)",
                "audit": "GET /api/account/audit-logs?limit&offset (protected)",
            }
        }
    }))
}

async fn health<S: HierarchyStore>(State(state): State<AppState<S>>) -> ApiResult<Value> {
    state.accounts.store().ping().await.map_err(|e| {
        tracing::warn!("Health check failed: {}", e);
        ApiError::service_unavailable("database unavailable")
    })?;

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok"
    })))
}
