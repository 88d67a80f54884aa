//! Request type definitions
//!
//! Defines the structures accepted by the REST endpoints.

use serde::{Deserialize, Serialize};

/// Credentials submitted to start a login flow
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account username (email)
    pub username: String,
    /// Account password
    pub password: String,
}

impl LoginRequest {
    /// Create a new login request
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Whether both fields are present and non-empty
    pub fn is_valid(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

// Credentials must never leak into logs.
impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Confirmation code submitted to complete a login flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmRequest {
    /// Out-of-band confirmation code from the user's code generator
    pub code: String,
}

impl ConfirmRequest {
    /// Create a new confirmation request
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Query parameters for the send endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendQuery {
    /// Recipient display name to search for
    pub to: String,
    /// Message text to deliver
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        assert!(LoginRequest::new("user@example.com", "hunter2").is_valid());
        assert!(!LoginRequest::new("", "hunter2").is_valid());
        assert!(!LoginRequest::new("user@example.com", "").is_valid());
        assert!(!LoginRequest::new("   ", "hunter2").is_valid());
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let request = LoginRequest::new("user@example.com", "hunter2");
        let debug = format!("{:?}", request);
        assert!(debug.contains("user@example.com"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_login_request_deserialization() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"username":"u","password":"p"}"#).unwrap();
        assert_eq!(request.username, "u");
        assert_eq!(request.password, "p");
    }

    #[test]
    fn test_confirm_request() {
        let request = ConfirmRequest::new("123456");
        assert_eq!(request.code, "123456");
    }

    #[test]
    fn test_send_query_deserialization() {
        let query: SendQuery =
            serde_json::from_str(r#"{"to":"Alice","message":"hello"}"#).unwrap();
        assert_eq!(query.to, "Alice");
        assert_eq!(query.message, "hello");
    }
}
