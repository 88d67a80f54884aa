//! Configuration settings structure
//!
//! Defines the main settings structure and loading logic for the service.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration settings for the Messenger Remote API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerSettings,
    /// Session lifecycle configuration
    pub session: SessionSettings,
    /// WebDriver endpoint configuration
    pub webdriver: WebDriverSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Request timeout duration
    pub timeout: Duration,
}

/// Session lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Session time-to-live in minutes; refreshed by every lookup/keep-alive
    pub ttl_minutes: i64,
    /// Expiry sweep period in seconds
    pub sweep_interval_secs: u64,
    /// Upper bound on a single automation step before it is failed
    pub operation_timeout_secs: u64,
}

/// WebDriver endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebDriverSettings {
    /// Base URL of the chromedriver-compatible remote end
    pub endpoint: String,
    /// Run the browser headless
    pub headless: bool,
    /// How long to keep polling for a page element before giving up, seconds
    pub element_wait_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "::".to_string(),
                port: 5000,
                timeout: Duration::from_secs(30),
            },
            session: SessionSettings {
                ttl_minutes: 5,
                sweep_interval_secs: 180,
                operation_timeout_secs: 120,
            },
            webdriver: WebDriverSettings {
                endpoint: "http://127.0.0.1:9515".to_string(),
                headless: true,
                element_wait_secs: 10,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                verbose: false,
            },
        }
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut settings = Self::default();

        // Load server settings from environment
        if let Ok(host) = std::env::var("MESSENGER_SERVER_HOST") {
            settings.server.host = host;
        }

        if let Ok(port) = std::env::var("MESSENGER_SERVER_PORT") {
            settings.server.port = port
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid port: {}", e)))?;
        }

        // Load session lifecycle settings from environment
        if let Ok(ttl) = std::env::var("SESSION_TTL_MINUTES") {
            settings.session.ttl_minutes = ttl
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid TTL: {}", e)))?;
        }

        if let Ok(interval) = std::env::var("SESSION_SWEEP_INTERVAL_SECS") {
            settings.session.sweep_interval_secs = interval
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid sweep interval: {}", e)))?;
        }

        if let Ok(timeout) = std::env::var("SESSION_OPERATION_TIMEOUT_SECS") {
            settings.session.operation_timeout_secs = timeout
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid operation timeout: {}", e)))?;
        }

        // Load WebDriver settings from environment
        if let Ok(endpoint) = std::env::var("WEBDRIVER_ENDPOINT") {
            url::Url::parse(&endpoint)
                .map_err(|e| crate::Error::Config(format!("Invalid WebDriver endpoint: {}", e)))?;
            settings.webdriver.endpoint = endpoint;
        }

        Ok(settings)
    }

    /// Session TTL as a chrono duration
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session.ttl_minutes)
    }

    /// Sweep period as a std duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session.sweep_interval_secs)
    }

    /// Per-operation timeout as a std duration
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.session.operation_timeout_secs)
    }
}
