//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Persisted document store configuration
    pub store: StoreConfig,
    /// Audit log configuration
    pub audit: AuditConfig,
    /// Log streaming configuration
    pub stream: StreamConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Persisted document store configuration
#[derive(Debug, Clone, Serialize)]
pub struct StoreConfig {
    /// Directory holding the persisted JSON documents
    pub data_dir: PathBuf,
    /// Directory holding on-disk `.log` files served by the tail endpoint
    pub logs_dir: PathBuf,
}

/// Audit log configuration
#[derive(Debug, Clone, Serialize)]
pub struct AuditConfig {
    /// Maximum number of retained audit entries
    pub capacity: usize,
}

/// Log streaming configuration
#[derive(Debug, Clone, Serialize)]
pub struct StreamConfig {
    /// Rotation cap for the in-memory log line buffer
    pub buffer_capacity: usize,
    /// Subscriber wake fallback interval in milliseconds
    pub poll_interval_ms: u64,
}

impl StreamConfig {
    /// Subscriber wake fallback interval as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let data_dir = env::var("DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| {
            // Default to ~/.mission-control or current directory
            if let Some(home) = env::var_os("HOME") {
                PathBuf::from(home).join(".mission-control")
            } else {
                PathBuf::from(".mission-control")
            }
        });
        let logs_dir = env::var("LOGS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("logs"));

        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            store: StoreConfig { data_dir, logs_dir },
            audit: AuditConfig {
                capacity: env::var("AUDIT_LOG_CAPACITY")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(100),
            },
            stream: StreamConfig {
                buffer_capacity: env::var("LOG_BUFFER_CAPACITY")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10_000),
                poll_interval_ms: env::var("LOG_POLL_INTERVAL_MS")
                    .ok()
                    .and_then(|i| i.parse().ok())
                    .unwrap_or(100),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
