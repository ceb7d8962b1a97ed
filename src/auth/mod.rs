pub mod google;
pub mod state;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

pub use google::{GoogleOAuth, GoogleUserInfo};
pub use state::OAuthStateStore;

pub const JWT_ISSUER: &str = "admin-deletion-dashboard";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
}

impl Claims {
    pub fn new(email: String, name: String, picture: String, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            email,
            name,
            picture,
            iss: JWT_ISSUER.to_string(),
            exp,
            iat: now.timestamp(),
            nbf: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("only @{0} emails are allowed")]
    DomainNotAllowed(String),

    #[error("email not verified")]
    EmailNotVerified,

    #[error("invalid state parameter")]
    InvalidState,

    #[error("OAuth provider error: {0}")]
    Provider(String),
}

/// Accepts `user@domain` (case-insensitive) for the configured domain only
pub fn validate_email_domain(email: &str, allowed_domain: &str) -> Result<(), AuthError> {
    let suffix = format!("@{}", allowed_domain.trim_start_matches('@').to_lowercase());
    if email.to_lowercase().ends_with(&suffix) {
        Ok(())
    } else {
        Err(AuthError::DomainNotAllowed(allowed_domain.trim_start_matches('@').to_string()))
    }
}

pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verify signature, expiry and issuer, then re-check the email domain
pub fn validate_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[JWT_ISSUER]);
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    validate_email_domain(&token_data.claims.email, &security.allowed_email_domain)?;
    Ok(token_data.claims)
}
