// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind jwt_auth_middleware, which injects AuthUser.

pub mod account;
pub mod auth;
