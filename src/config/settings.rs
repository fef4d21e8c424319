//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use crate::services::history::DEFAULT_HISTORY_CAPACITY;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default upstream API root
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.gumroad.com/v2";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerConfig,
    /// Upstream API configuration
    pub upstream: UpstreamConfig,
    /// Call history configuration
    pub history: HistoryConfig,
    /// Request configuration
    pub request: RequestConfig,
    /// File locations
    pub storage: StorageConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
}

/// Upstream API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// API base URL
    pub base_url: String,
    /// Data fetch timeout in seconds
    pub timeout: u64,
    /// Credential check timeout in seconds
    pub verify_timeout: u64,
}

/// Call history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of calls kept
    pub capacity: usize,
}

/// Request configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Maximum inbound request body in bytes
    pub max_request_size: usize,
}

/// File locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Explicit token file path; searched for when unset
    pub token_file: Option<PathBuf>,
    /// Directory served under /static
    pub static_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8086,
            },
            upstream: UpstreamConfig {
                base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
                timeout: 30,
                verify_timeout: 10,
            },
            history: HistoryConfig {
                capacity: DEFAULT_HISTORY_CAPACITY,
            },
            request: RequestConfig {
                max_request_size: 1024 * 1024,
            },
            storage: StorageConfig {
                token_file: None,
                static_dir: PathBuf::from("./static"),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
            },
        }
    }
}

impl Settings {
    /// Create a new configuration instance from the environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let settings = Self {
            server: ServerConfig {
                host: get_env_or_default("SERVER_HOST", "0.0.0.0"),
                port: get_env_or_default("PORT", "8086")
                    .parse()
                    .context("Invalid port number")?,
            },
            upstream: UpstreamConfig {
                base_url: get_env_or_default("UPSTREAM_BASE_URL", DEFAULT_UPSTREAM_BASE_URL),
                timeout: get_env_or_default("REQUEST_TIMEOUT", "30")
                    .parse()
                    .context("Invalid request timeout")?,
                verify_timeout: get_env_or_default("VERIFY_TIMEOUT", "10")
                    .parse()
                    .context("Invalid verify timeout")?,
            },
            history: HistoryConfig {
                capacity: get_env_or_default("HISTORY_CAPACITY", "100")
                    .parse()
                    .context("Invalid history capacity")?,
            },
            request: RequestConfig {
                max_request_size: get_env_or_default("MAX_REQUEST_SIZE", "1048576")
                    .parse()
                    .context("Invalid maximum request size")?,
            },
            storage: StorageConfig {
                token_file: std::env::var("GUMDASH_CONFIG").ok().map(PathBuf::from),
                static_dir: PathBuf::from(get_env_or_default("STATIC_DIR", "./static")),
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }

        if !self.upstream.base_url.starts_with("http") {
            anyhow::bail!("Invalid upstream base URL format, should start with 'http'");
        }

        if self.upstream.timeout == 0 || self.upstream.verify_timeout == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        if self.history.capacity == 0 {
            anyhow::bail!("History capacity cannot be 0");
        }

        if self.request.max_request_size == 0 {
            anyhow::bail!("Maximum request size cannot be 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Listen address
    pub fn addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
