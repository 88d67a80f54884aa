//! HTTP server layer
//!
//! Maps the REST surface onto registry and session operations.

pub mod app;
pub mod handlers;

pub use app::{AppState, create_app, create_app_with_registry};
