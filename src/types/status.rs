//! Externally visible session status values
//!
//! These five values are the stable external surface of the API; every
//! endpoint reports exactly one of them.

use serde::{Deserialize, Serialize};

/// Current status of a session as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// An automation step is currently executing
    InProgress,
    /// The last operation finished; the session is ready for the next one
    Completed,
    /// The last operation could not complete; a retry re-enters InProgress
    Failed,
    /// The token has no live session
    NotFound,
    /// Login succeeded but the site asked for an out-of-band code
    ConfirmationRequired,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::NotFound => "NotFound",
            Self::ConfirmationRequired => "ConfirmationRequired",
        };
        f.write_str(name)
    }
}
