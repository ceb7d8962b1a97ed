use serde::{Deserialize, Serialize};
use tracing::warn;

use super::AuthError;
use crate::config::GoogleConfig;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

/// Profile returned by Google's userinfo endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleUserInfo {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub verified_email: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub picture: String,
    /// Hosted domain
    #[serde(default)]
    pub hd: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Authorization-code flow against Google
#[derive(Clone)]
pub struct GoogleOAuth {
    config: GoogleConfig,
    http: reqwest::Client,
}

impl GoogleOAuth {
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Consent URL carrying the given CSRF state
    pub fn login_url(&self, state: &str) -> Result<String, AuthError> {
        let mut url = url::Url::parse(AUTH_ENDPOINT).map_err(|e| AuthError::Provider(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("state", state)
            .append_pair("access_type", "offline");
        Ok(url.into())
    }

    /// Exchange an authorization code for an access token
    pub async fn exchange_code(&self, code: &str) -> Result<String, AuthError> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let resp = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::Provider(format!("token exchange failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            warn!("Google token exchange returned {}", status);
            return Err(AuthError::Provider(format!("token exchange failed: status {}", status)));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("failed to decode token response: {}", e)))?;
        Ok(token.access_token)
    }

    pub async fn user_info(&self, access_token: &str) -> Result<GoogleUserInfo, AuthError> {
        let resp = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Provider(format!("failed to get user info: {}", e)))?;

        if !resp.status().is_success() {
            return Err(AuthError::Provider(format!(
                "failed to get user info: status {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| AuthError::Provider(format!("failed to decode user info: {}", e)))
    }
}
