//! Messenger Remote API
//!
//! A REST service that remote-controls automated browser sessions which log
//! into messenger.com and send messages on a user's behalf.
//!
//! # Architecture
//!
//! The core of the service is the session lifecycle manager:
//! - **SessionRegistry**: a concurrency-safe map from opaque token to
//!   session; creates sessions on demand, looks them up, and evicts the
//!   expired ones.
//! - **Session**: one per logical user connection; owns a single automation
//!   driver handle, a lifecycle state machine, and a renewable expiry.
//! - **Expiry sweeper**: a recurring background task that removes sessions
//!   whose expiry has passed and releases their browser resources.
//! - **AutomationDriver**: the capability boundary towards the browser; the
//!   default implementation speaks the W3C WebDriver wire protocol.
//!
//! # Usage
//!
//! ```bash
//! messenger-remote-server --port 5000 --host ::
//! ```
//!
//! Callers then drive a session through the REST surface: `POST
//! /api/messenger/login` mints a session token and starts the login flow;
//! the remaining endpoints (`confirmLogin`, `send`, `status`, `keepAlive`)
//! take that token and report the session's current status. Automation steps
//! run asynchronously; completion is observed by polling `status`.
//!
//! # Examples
//!
//! ```rust
//! use messenger_remote::{SessionRegistry, Settings};
//! use uuid::Uuid;
//!
//! # tokio_test::block_on(async {
//! let registry = SessionRegistry::new(Settings::default());
//! let session = registry.get_or_create(Uuid::new_v4()).await;
//! println!("created session {}", session.token());
//! # });
//! ```

pub mod config;
pub mod error;
pub mod server;
pub mod session;
pub mod types;
pub mod utils;

pub use config::Settings;
pub use error::{Error, Result};
pub use session::{SessionRegistry, spawn_sweeper};
pub use types::{ErrorResponse, PingResponse, ServiceStatus, SessionStatus};
