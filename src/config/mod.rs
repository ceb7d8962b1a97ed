use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub google: GoogleConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// Only identities under this domain may sign in or call protected routes
    pub allowed_email_domain: String,
    pub cors_origins: Vec<String>,
    pub oauth_state_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a profile from `APP_ENV`, then apply per-key overrides
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let environment = match lookup("APP_ENV").or_else(|| lookup("ENVIRONMENT")).as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(lookup)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Server overrides
        if let Some(v) = lookup("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v).filter(|u| !u.is_empty());
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Some(v) = lookup("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Some(v) = lookup("SECURITY_ALLOWED_EMAIL_DOMAIN") {
            self.security.allowed_email_domain = v.trim().trim_start_matches('@').to_lowercase();
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("OAUTH_STATE_TTL_SECS") {
            self.security.oauth_state_ttl_secs = v.parse().unwrap_or(self.security.oauth_state_ttl_secs);
        }

        // Google OAuth overrides
        if let Some(v) = lookup("GOOGLE_CLIENT_ID") {
            self.google.client_id = v;
        }
        if let Some(v) = lookup("GOOGLE_CLIENT_SECRET") {
            self.google.client_secret = v;
        }
        if let Some(v) = lookup("GOOGLE_REDIRECT_URL") {
            self.google.redirect_url = v;
        }

        // Audit overrides
        if let Some(v) = lookup("AUDIT_DEFAULT_LIMIT") {
            self.audit.default_limit = v.parse().unwrap_or(self.audit.default_limit);
        }
        if let Some(v) = lookup("AUDIT_MAX_LIMIT") {
            self.audit.max_limit = v.parse().unwrap_or(self.audit.max_limit);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-change-me".to_string(),
                jwt_expiry_hours: 24,
                allowed_email_domain: "appointy.com".to_string(),
                cors_origins: Vec::new(),
                oauth_state_ttl_secs: 600,
            },
            google: GoogleConfig::default_local(),
            audit: AuditConfig {
                default_limit: 50,
                max_limit: 100,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                allowed_email_domain: "appointy.com".to_string(),
                cors_origins: Vec::new(),
                oauth_state_ttl_secs: 600,
            },
            google: GoogleConfig::default_local(),
            audit: AuditConfig {
                default_limit: 50,
                max_limit: 100,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 8,
                allowed_email_domain: "appointy.com".to_string(),
                cors_origins: Vec::new(),
                oauth_state_ttl_secs: 300,
            },
            google: GoogleConfig::default_local(),
            audit: AuditConfig {
                default_limit: 50,
                max_limit: 100,
            },
        }
    }
}

impl GoogleConfig {
    fn default_local() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: "http://localhost:8080/api/auth/callback".to_string(),
        }
    }
}

impl AuditConfig {
    /// Clamp raw pagination input. Anything unparsable, non-positive or above
    /// the ceiling falls back to the default limit; offsets floor at zero.
    pub fn clamp(&self, limit: Option<&str>, offset: Option<&str>) -> (i64, i64) {
        let limit = limit
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|l| *l > 0 && *l <= self.max_limit)
            .unwrap_or(self.default_limit);

        let offset = offset
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|o| *o >= 0)
            .unwrap_or(0);

        (limit, offset)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, 8080);
        assert!(!config.security.jwt_secret.is_empty());
        assert_eq!(config.audit.default_limit, 50);
        assert_eq!(config.audit.max_limit, 100);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::from_lookup(lookup_from(&[("APP_ENV", "production")]));
        assert_eq!(config.environment, Environment::Production);
        assert!(config.security.jwt_secret.is_empty());
        assert!(config.database.url.is_none());
    }

    #[test]
    fn env_overrides_apply() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("ENVIRONMENT", "staging"),
            ("PORT", "9090"),
            ("DATABASE_URL", "postgres://localhost/saastack"),
            ("JWT_SECRET", "s3cret"),
            ("SECURITY_ALLOWED_EMAIL_DOMAIN", "@Example.COM"),
            ("SECURITY_CORS_ORIGINS", "https://a.example.com, https://b.example.com,"),
            ("DATABASE_MAX_CONNECTIONS", "not-a-number"),
        ]));
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url.as_deref(), Some("postgres://localhost/saastack"));
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.security.jwt_secret, "s3cret");
        assert_eq!(config.security.allowed_email_domain, "example.com");
        assert_eq!(
            config.security.cors_origins,
            vec!["https://a.example.com".to_string(), "https://b.example.com".to_string()]
        );
    }

    #[test]
    fn audit_pagination_is_clamped() {
        let audit = AuditConfig { default_limit: 50, max_limit: 100 };
        assert_eq!(audit.clamp(None, None), (50, 0));
        assert_eq!(audit.clamp(Some("2"), Some("2")), (2, 2));
        assert_eq!(audit.clamp(Some("100"), Some("0")), (100, 0));
        assert_eq!(audit.clamp(Some("101"), Some("-1")), (50, 0));
        assert_eq!(audit.clamp(Some("0"), Some("abc")), (50, 0));
        assert_eq!(audit.clamp(Some("-5"), Some("7")), (50, 7));
    }
}
