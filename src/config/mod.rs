//! Configuration management for the Messenger Remote API
//!
//! This module handles loading and managing configuration settings
//! for the HTTP server, session lifecycle and WebDriver endpoint.

pub mod settings;

pub use settings::Settings;
