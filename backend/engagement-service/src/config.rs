//! Configuration management for Engagement Service
//!
//! Loads configuration from environment variables.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Which entity store backs the service
    pub store: StoreBackend,
    /// Database configuration, present for the postgres backend
    pub database: Option<DatabaseConfig>,
    /// Engagement engine tuning
    pub engagement: EngagementConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub http_port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => bail!("unknown STORE_BACKEND '{}', expected postgres or memory", other),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

/// Engagement engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// Overall deadline for one service call
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Page size when the client sends none
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u32,
    /// Larger page sizes are clamped to this
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: u32,
    /// Whether a user may subscribe to their own channel
    #[serde(default = "default_allow_self_subscription")]
    pub allow_self_subscription: bool,
}

impl EngagementConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            default_page_limit: default_page_limit(),
            max_page_limit: default_max_page_limit(),
            allow_self_subscription: default_allow_self_subscription(),
        }
    }
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_page_limit() -> u32 {
    10
}

fn default_max_page_limit() -> u32 {
    100
}

fn default_allow_self_subscription() -> bool {
    true
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env_or("PORT", 8010),
        };

        let store = match std::env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Postgres,
        };

        let database = match std::env::var("DATABASE_URL") {
            Ok(url) => Some(DatabaseConfig {
                url,
                max_connections: env_or("DB_MAX_CONNECTIONS", default_max_connections()),
                min_connections: env_or("DB_MIN_CONNECTIONS", default_min_connections()),
                acquire_timeout_secs: env_or(
                    "DB_ACQUIRE_TIMEOUT_SECS",
                    default_acquire_timeout_secs(),
                ),
            }),
            Err(_) if store == StoreBackend::Postgres => {
                bail!("DATABASE_URL environment variable not set");
            }
            Err(_) => None,
        };

        let engagement = EngagementConfig {
            request_timeout_ms: env_or("ENGAGEMENT_REQUEST_TIMEOUT_MS", default_request_timeout_ms()),
            default_page_limit: env_or("ENGAGEMENT_DEFAULT_PAGE_LIMIT", default_page_limit()),
            max_page_limit: env_or("ENGAGEMENT_MAX_PAGE_LIMIT", default_max_page_limit()),
            allow_self_subscription: env_or(
                "ENGAGEMENT_ALLOW_SELF_SUBSCRIPTION",
                default_allow_self_subscription(),
            ),
        };

        if engagement.default_page_limit == 0 || engagement.max_page_limit == 0 {
            bail!("page limits must be greater than zero");
        }

        Ok(Config {
            app,
            store,
            database,
            engagement,
        })
    }
}
