use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub search: SearchConfig,
    pub security: SecurityConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub default_limit: i64,
    pub max_limit: i64,
    pub max_request_size_bytes: usize,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Trimmed queries shorter than this never reach storage
    pub min_query_len: usize,
    /// Shared per-entity cap for the aggregated search
    pub result_limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_resume_bytes: usize,
    pub max_logo_bytes: usize,
    pub resume_extensions: Vec<String>,
    pub image_extensions: Vec<String>,
}

const DEV_JWT_SECRET: &str = "jobboard-development-secret";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        if config.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }

        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(v) = parse_env("PORT")? {
            self.server.port = v;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = parse_env("DATABASE_MAX_CONNECTIONS")? {
            self.database.max_connections = v;
        }
        if let Some(v) = parse_env("DATABASE_CONNECTION_TIMEOUT")? {
            self.database.connection_timeout = v;
        }

        // API overrides
        if let Some(v) = parse_env("API_DEFAULT_LIMIT")? {
            self.api.default_limit = v;
        }
        if let Some(v) = parse_env("API_MAX_LIMIT")? {
            self.api.max_limit = v;
        }
        if let Some(v) = parse_env("API_MAX_REQUEST_SIZE_BYTES")? {
            self.api.max_request_size_bytes = v;
        }
        if let Some(v) = parse_env("API_ENABLE_REQUEST_LOGGING")? {
            self.api.enable_request_logging = v;
        }

        // Search overrides
        if let Some(v) = parse_env("SEARCH_MIN_QUERY_LEN")? {
            self.search.min_query_len = v;
        }
        if let Some(v) = parse_env("SEARCH_RESULT_LIMIT")? {
            self.search.result_limit = v;
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = parse_env("JWT_EXPIRY_HOURS")? {
            self.security.jwt_expiry_hours = v;
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.uploads.dir = PathBuf::from(v);
        }
        if let Some(v) = parse_env("UPLOAD_MAX_RESUME_BYTES")? {
            self.uploads.max_resume_bytes = v;
        }
        if let Some(v) = parse_env("UPLOAD_MAX_LOGO_BYTES")? {
            self.uploads.max_logo_bytes = v;
        }

        Ok(self)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                default_limit: 50,
                max_limit: 50_000,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                enable_request_logging: true,
            },
            search: SearchConfig {
                min_query_len: 2,
                result_limit: 10,
            },
            security: SecurityConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            uploads: UploadConfig::default(),
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.server.host = "0.0.0.0".to_string();
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.jwt_secret = String::new();
        config.security.jwt_expiry_hours = 24;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.server.host = "0.0.0.0".to_string();
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.api.enable_request_logging = false;
        config.api.max_request_size_bytes = 8 * 1024 * 1024; // 8MB
        config.security.jwt_secret = String::new();
        config.security.jwt_expiry_hours = 4;
        config.security.cors_origins = vec!["https://app.example.com".to_string()];
        config
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }

    /// Resolve a client supplied `limit` against the configured default and cap
    pub fn clamp_limit(&self, requested: Option<i64>) -> i64 {
        requested.unwrap_or(self.api.default_limit).clamp(1, self.api.max_limit)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_resume_bytes: 5 * 1024 * 1024,
            max_logo_bytes: 2 * 1024 * 1024,
            resume_extensions: split_list("pdf,doc,docx"),
            image_extensions: split_list("png,jpg,jpeg,gif,webp"),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(None),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
