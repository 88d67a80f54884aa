//! Automation driver capability interface
//!
//! The seam between the session lifecycle and the browser. Sessions only see
//! these traits; the concrete WebDriver implementation lives in
//! [`crate::session::webdriver`] and tests substitute scripted drivers.

use async_trait::async_trait;

use crate::Result;

/// Outcome of a single automation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step finished and landed where it was supposed to
    Completed,
    /// The step could not be completed
    Failed,
    /// The site asked for an out-of-band confirmation code
    ConfirmationRequired,
}

/// A browser automation capability bound to one remote browser.
///
/// Implementations may be slow (seconds) and may fail; they must never be
/// shared between sessions. `release` is idempotent and best-effort.
#[async_trait]
pub trait AutomationDriver: Send + Sync {
    /// Navigate to the login page and submit credentials.
    async fn attempt_login(&self, username: &str, password: &str) -> Result<StepOutcome>;

    /// Submit a confirmation code on the checkpoint page.
    async fn attempt_confirmation(&self, code: &str) -> Result<StepOutcome>;

    /// Look up a recipient and deliver a message.
    async fn attempt_send(&self, recipient: &str, message: &str) -> Result<StepOutcome>;

    /// Tear down the underlying browser resources. Idempotent; never fails.
    async fn release(&self);
}

/// Creates automation drivers on demand.
///
/// A session constructs its driver lazily on the first operation that needs
/// one, so factories must be cheap to hold and safe to share.
#[async_trait]
pub trait DriverFactory: Send + Sync + 'static {
    /// Create a fresh driver owning its own browser resources.
    async fn create(&self) -> Result<Box<dyn AutomationDriver>>;
}
