//! Response type definitions
//!
//! Defines the structures returned by the REST endpoints.

use crate::types::SessionStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status payload returned by every session endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// Session token for follow-up requests
    pub token: Uuid,
    /// Current status of the session
    pub status: SessionStatus,
}

impl ServiceStatus {
    /// Create a new status payload
    pub fn new(token: Uuid, status: SessionStatus) -> Self {
        Self { token, status }
    }

    /// Payload for a token with no live session; carries the nil token
    pub fn not_found() -> Self {
        Self {
            token: Uuid::nil(),
            status: SessionStatus::NotFound,
        }
    }
}

/// Ping response for health checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    /// Server uptime in seconds
    pub server_uptime: u64,

    /// Server version
    pub version: String,
}

impl PingResponse {
    /// Create a new ping response
    pub fn new(server_uptime: u64, version: impl Into<String>) -> Self {
        Self {
            server_uptime,
            version: version.into(),
        }
    }
}

/// Error response for API errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
