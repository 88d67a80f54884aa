//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

/// Test helper functions
pub mod helpers {
    use messenger_remote::config::Settings;

    /// Create test settings; the server port is never bound by router-level
    /// tests but keeping it explicit avoids clashing with a local instance
    pub fn create_test_settings(port: u16) -> Settings {
        let mut settings = Settings::default();
        settings.server.port = port;
        settings
    }
}
