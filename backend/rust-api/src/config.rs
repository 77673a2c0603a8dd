use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Mongo,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub storage_backend: StorageBackend,
    pub mongo_uri: String,
    pub mongo_database: String,
    pub redis_uri: String,
    pub jwt_secret: String,
    pub quizzes_per_page: u64,
    pub play_session_ttl_seconds: u64,
    pub cookie_secure: bool,
    pub metrics_auth: String,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Root .env first (two levels up), then the local one
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/*.toml + ENV overrides (prefix: APP_)
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", app_env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let lookup = |key: &str, fallback_env: &str| -> Option<String> {
            settings
                .get_string(key)
                .ok()
                .or_else(|| env::var(fallback_env).ok())
        };

        let bind_addr =
            lookup("server.bind_addr", "BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8081".to_string());

        let storage_backend = match lookup("storage.backend", "STORAGE_BACKEND") {
            Some(raw) => raw
                .parse::<StorageBackend>()
                .map_err(config::ConfigError::Message)?,
            None => StorageBackend::Mongo,
        };

        let mongo_uri = lookup("database.mongo_uri", "MONGO_URI")
            .unwrap_or_else(|| "mongodb://localhost:27017".to_string());

        let mongo_database = lookup("database.mongo_database", "MONGO_DATABASE")
            .unwrap_or_else(|| "quizplay".to_string());

        let redis_uri = lookup("redis.uri", "REDIS_URI")
            .unwrap_or_else(|| "redis://127.0.0.1:6379/0".to_string());

        let jwt_secret = match lookup("auth.jwt_secret", "JWT_SECRET") {
            Some(secret) => secret,
            None if app_env == "prod" => {
                return Err(config::ConfigError::Message(
                    "JWT_SECRET must be set in production".to_string(),
                ));
            }
            None => {
                eprintln!("WARNING: Using default JWT_SECRET (dev mode only!)");
                "dev-secret-only-for-local-testing".to_string()
            }
        };

        let quizzes_per_page = parse_number(
            lookup("quizzes.per_page", "QUIZZES_PER_PAGE"),
            "quizzes.per_page",
            10,
        )?;

        let play_session_ttl_seconds = parse_number(
            lookup("play.session_ttl_seconds", "PLAY_SESSION_TTL_SECONDS"),
            "play.session_ttl_seconds",
            86400,
        )?;

        let cookie_secure = lookup("cookie.secure", "COOKIE_SECURE")
            .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let metrics_auth = lookup("metrics.auth", "METRICS_AUTH")
            .unwrap_or_else(|| "admin:changeme".to_string());

        let otlp_endpoint = lookup("telemetry.otlp_endpoint", "OTEL_EXPORTER_OTLP_ENDPOINT")
            .filter(|value| !value.trim().is_empty());

        Ok(Config {
            bind_addr,
            storage_backend,
            mongo_uri,
            mongo_database,
            redis_uri,
            jwt_secret,
            quizzes_per_page,
            play_session_ttl_seconds,
            cookie_secure,
            metrics_auth,
            otlp_endpoint,
        })
    }

    /// Configuration for the in-memory backend, used by tests and local runs.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Config {
            bind_addr: "127.0.0.1:0".to_string(),
            storage_backend: StorageBackend::Memory,
            mongo_uri: String::new(),
            mongo_database: String::new(),
            redis_uri: String::new(),
            jwt_secret: jwt_secret.into(),
            quizzes_per_page: 10,
            play_session_ttl_seconds: 86400,
            cookie_secure: false,
            metrics_auth: "admin:changeme".to_string(),
            otlp_endpoint: None,
        }
    }
}

fn parse_number(raw: Option<String>, key: &str, default: u64) -> Result<u64, config::ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(parsed) if parsed > 0 => Ok(parsed),
            _ => Err(config::ConfigError::Message(format!(
                "{} must be a positive integer, got {:?}",
                key, value
            ))),
        },
    }
}
