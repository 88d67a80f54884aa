//! # Session lifecycle management
//!
//! This module is the core of the service. It owns the registry of live
//! automation sessions, the per-session state machine that serializes
//! multi-step operations (login → confirmation → ready → send), the
//! recurring sweep that evicts expired sessions, and the driver boundary
//! towards the browser.
//!
//! ## Lifecycle
//!
//! A session is created by the first `get_or_create` call for its token and
//! destroyed only by the sweeper once its expiry has passed. Every lookup
//! renews the expiry (default TTL: 5 minutes). Operations run on spawned
//! workers and report back by mutating the session state; callers observe
//! completion by polling status.
//!
//! ## Examples
//!
//! ```rust
//! use messenger_remote::{SessionRegistry, Settings, SessionStatus};
//! use uuid::Uuid;
//!
//! # tokio_test::block_on(async {
//! let registry = SessionRegistry::new(Settings::default());
//! let token = Uuid::new_v4();
//!
//! let session = registry.get_or_create(token).await;
//! assert_eq!(session.status().await, SessionStatus::Completed);
//! assert_eq!(registry.status(Uuid::new_v4()).await, SessionStatus::NotFound);
//! # });
//! ```

pub mod driver;
pub mod registry;
pub mod session;
pub mod sweeper;
pub mod webdriver;

pub use driver::{AutomationDriver, DriverFactory, StepOutcome};
pub use registry::SessionRegistry;
pub use session::{Session, SessionState};
pub use sweeper::spawn_sweeper;
pub use webdriver::{WebDriverClient, WebDriverFactory};
