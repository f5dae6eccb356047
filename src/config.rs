// src/config.rs

use std::env;
use std::path::PathBuf;
use dotenvy::dotenv;

/// Secret used when `JWT_SECRET` is not provided. Only suitable for local runs.
pub const DEV_JWT_SECRET: &str = "dev";

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the forum definition (templates, participant fields, branding).
    pub forum_config: PathBuf,
    /// Directory receiving one JSON file per finished session.
    pub results_dir: PathBuf,
    /// Session store location (sqlite).
    pub database_url: String,
    pub jwt_secret: String,
    /// Participant token lifetime in seconds.
    pub jwt_expiration: u64,
    /// Idle sessions older than this (seconds) are purged.
    pub session_ttl: u64,
    pub bind_addr: String,
    pub cors_origins: Vec<String>,
    pub rust_log: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let forum_config = env::var("FORUM_CONFIG")
            .unwrap_or_else(|_| "config/forum.json".to_string())
            .into();

        let results_dir = env::var("RESULTS_DIR")
            .unwrap_or_else(|_| "results".to_string())
            .into();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://forum.db".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| DEV_JWT_SECRET.to_string());

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let session_ttl = env::var("SESSION_TTL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://127.0.0.1:3000".to_string(),
                ]
            });

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let log_dir = env::var("LOG_DIR")
            .unwrap_or_else(|_| "logs".to_string());

        Self {
            forum_config,
            results_dir,
            database_url,
            jwt_secret,
            jwt_expiration,
            session_ttl,
            bind_addr,
            cors_origins,
            rust_log,
            log_dir,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
