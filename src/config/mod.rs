use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub oidc: OidcConfig,
    pub security: SecurityConfig,
    pub bulk: BulkConfig,
    pub listing: ListingConfig,
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
    pub frontend_url: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; when set it wins over the individual parts.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcConfig {
    pub issuer: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub session_secret: String,
    pub session_ttl_hours: u64,
    pub secure_cookies: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkConfig {
    pub request_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

const DEV_SESSION_SECRET: &str = "vkyc-development-session-secret";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").or_else(|_| env::var("NODE_ENV")).as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("FRONTEND_URL") {
            self.server.frontend_url = v.trim_end_matches('/').to_string();
            if env::var("SECURITY_CORS_ORIGINS").is_err() {
                self.security.cors_origins = vec![self.server.frontend_url.clone()];
            }
        }
        if let Ok(v) = env::var("MAX_UPLOAD_BYTES") {
            self.server.max_upload_bytes = v.parse().unwrap_or(self.server.max_upload_bytes);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DB_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = env::var("DB_PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Ok(v) = env::var("DB_USER") {
            self.database.user = v;
        }
        if let Ok(v) = env::var("DB_PASSWORD") {
            self.database.password = v;
        }
        if let Ok(v) = env::var("DB_NAME") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // OIDC overrides
        if let Ok(v) = env::var("OIDC_ISSUER") {
            self.oidc.issuer = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("OIDC_CLIENT_ID") {
            self.oidc.client_id = v;
        }
        if let Ok(v) = env::var("OIDC_CLIENT_SECRET") {
            self.oidc.client_secret = v;
        }
        if let Ok(v) = env::var("OIDC_REDIRECT_URI") {
            self.oidc.redirect_uri = v;
        }
        if let Ok(v) = env::var("OIDC_SCOPE") {
            self.oidc.scope = v;
        }

        // Security overrides
        if let Ok(v) = env::var("SESSION_SECRET") {
            self.security.session_secret = v;
        }
        if let Ok(v) = env::var("SESSION_TTL_HOURS") {
            self.security.session_ttl_hours = v.parse().unwrap_or(self.security.session_ttl_hours);
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Bulk overrides
        if let Ok(v) = env::var("BULK_REQUEST_TTL_SECS") {
            self.bulk.request_ttl_secs = v.parse().unwrap_or(self.bulk.request_ttl_secs);
        }
        if let Ok(v) = env::var("BULK_SWEEP_INTERVAL_SECS") {
            self.bulk.sweep_interval_secs = v.parse().unwrap_or(self.bulk.sweep_interval_secs);
        }

        // Listing overrides
        if let Ok(v) = env::var("LISTING_DEFAULT_LIMIT") {
            self.listing.default_limit = v.parse().unwrap_or(self.listing.default_limit);
        }
        if let Ok(v) = env::var("LISTING_MAX_LIMIT") {
            self.listing.max_limit = v.parse().unwrap_or(self.listing.max_limit);
        }

        self
    }

    /// Refuse to start a production server with placeholder secrets or a
    /// half-configured identity provider.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment != Environment::Production {
            return Ok(());
        }
        if self.security.session_secret.is_empty() {
            return Err(ConfigError::Missing("SESSION_SECRET"));
        }
        if self.oidc.issuer.is_empty() {
            return Err(ConfigError::Missing("OIDC_ISSUER"));
        }
        if self.oidc.client_id.is_empty() {
            return Err(ConfigError::Missing("OIDC_CLIENT_ID"));
        }
        if self.oidc.client_secret.is_empty() {
            return Err(ConfigError::Missing("OIDC_CLIENT_SECRET"));
        }
        if self.oidc.redirect_uri.is_empty() {
            return Err(ConfigError::Missing("OIDC_REDIRECT_URI"));
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                frontend_url: "http://localhost:5173".to_string(),
                max_upload_bytes: 1024 * 1024, // 1MB
            },
            database: DatabaseConfig::defaults(10, 30),
            oidc: OidcConfig::empty(),
            security: SecurityConfig {
                session_secret: DEV_SESSION_SECRET.to_string(),
                session_ttl_hours: 8,
                secure_cookies: false,
                cors_origins: vec!["http://localhost:5173".to_string()],
            },
            bulk: BulkConfig {
                request_ttl_secs: 15 * 60,
                sweep_interval_secs: 60,
            },
            listing: ListingConfig {
                default_limit: 10,
                max_limit: 100,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3000,
                frontend_url: "https://staging.example.com".to_string(),
                max_upload_bytes: 512 * 1024,
            },
            database: DatabaseConfig::defaults(20, 10),
            oidc: OidcConfig::empty(),
            security: SecurityConfig {
                session_secret: String::new(),
                session_ttl_hours: 8,
                secure_cookies: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            bulk: BulkConfig {
                request_ttl_secs: 15 * 60,
                sweep_interval_secs: 60,
            },
            listing: ListingConfig {
                default_limit: 10,
                max_limit: 100,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 3000,
                frontend_url: "https://app.example.com".to_string(),
                max_upload_bytes: 256 * 1024,
            },
            database: DatabaseConfig::defaults(50, 5),
            oidc: OidcConfig::empty(),
            security: SecurityConfig {
                session_secret: String::new(),
                session_ttl_hours: 4,
                secure_cookies: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            bulk: BulkConfig {
                request_ttl_secs: 10 * 60,
                sweep_interval_secs: 60,
            },
            listing: ListingConfig {
                default_limit: 10,
                max_limit: 100,
            },
        }
    }
}

impl DatabaseConfig {
    fn defaults(max_connections: u32, connection_timeout: u64) -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "vkyc".to_string(),
            max_connections,
            connection_timeout,
        }
    }
}

impl OidcConfig {
    fn empty() -> Self {
        Self {
            issuer: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            scope: "openid profile email".to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.issuer.is_empty() && !self.client_id.is_empty() && !self.redirect_uri.is_empty()
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
