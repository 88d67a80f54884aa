//! Per-user automation session and its lifecycle state machine
//!
//! A [`Session`] owns one automation driver, a lifecycle state and a
//! renewable expiry. The three operations (login, confirm, send) share a
//! single entry path: claim the `InProgress` state in a short critical
//! section, then hand the slow automation work to a spawned worker. A call
//! arriving while a step is already in flight is dropped silently; the
//! caller polls status instead of queueing work, which keeps exactly one
//! automation sequence per browser at all times.
//!
//! The state lock is held only for the claim and for recording the terminal
//! state; the driver has its own session-private lock held for the duration
//! of the step, so registry operations never wait on automation I/O.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::session::driver::{AutomationDriver, DriverFactory, StepOutcome};
use crate::types::SessionStatus;
use crate::{Error, Result};

/// Internal lifecycle state of a session.
///
/// `Idle` and `Completed` are equivalent for re-entry purposes; a fresh
/// session starts `Idle` and reports the wire status `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No operation pending
    Idle,
    /// An automation step is executing against the driver
    InProgress,
    /// Login succeeded but the site wants a confirmation code
    AwaitingConfirmation,
    /// The last operation succeeded
    Completed,
    /// The last operation failed; a retry re-enters InProgress
    Failed,
}

impl SessionState {
    /// Map the internal state onto the wire status enumeration.
    pub fn as_status(self) -> SessionStatus {
        match self {
            Self::Idle | Self::Completed => SessionStatus::Completed,
            Self::InProgress => SessionStatus::InProgress,
            Self::AwaitingConfirmation => SessionStatus::ConfirmationRequired,
            Self::Failed => SessionStatus::Failed,
        }
    }
}

/// One multi-step operation, with everything the worker needs to run it.
enum Operation {
    Login { username: String, password: String },
    Confirm { code: String },
    Send { recipient: String, message: String },
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Confirm { .. } => "confirm",
            Self::Send { .. } => "send",
        }
    }
}

/// A per-user automation session.
pub struct Session {
    token: Uuid,
    state: Mutex<SessionState>,
    expires_at: RwLock<DateTime<Utc>>,
    driver: Mutex<Option<Box<dyn AutomationDriver>>>,
    factory: Arc<dyn DriverFactory>,
    retired: AtomicBool,
    ttl: chrono::Duration,
    operation_timeout: Duration,
}

impl Session {
    /// Create a session bound to `token`. The driver is created lazily by
    /// the first operation that needs it.
    pub(crate) fn new(
        token: Uuid,
        factory: Arc<dyn DriverFactory>,
        ttl: chrono::Duration,
        operation_timeout: Duration,
    ) -> Self {
        Self {
            token,
            state: Mutex::new(SessionState::Idle),
            expires_at: RwLock::new(Utc::now() + ttl),
            driver: Mutex::new(None),
            factory,
            retired: AtomicBool::new(false),
            ttl,
            operation_timeout,
        }
    }

    /// The session's immutable identity.
    pub fn token(&self) -> Uuid {
        self.token
    }

    /// Current wire status.
    pub async fn status(&self) -> SessionStatus {
        self.state.lock().await.as_status()
    }

    /// Current internal lifecycle state.
    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    /// When the sweeper may evict this session.
    pub async fn expires_at(&self) -> DateTime<Utc> {
        *self.expires_at.read().await
    }

    /// Push the expiry one TTL into the future.
    pub async fn keep_alive(&self) {
        *self.expires_at.write().await = Utc::now() + self.ttl;
    }

    #[cfg(test)]
    pub(crate) async fn set_expires_at(&self, when: DateTime<Utc>) {
        *self.expires_at.write().await = when;
    }

    /// Start the login sequence. Returns the status observed at call time;
    /// a call made while another step is in flight is dropped.
    pub async fn login(self: Arc<Self>, username: &str, password: &str) -> SessionStatus {
        self.begin(Operation::Login {
            username: username.to_owned(),
            password: password.to_owned(),
        })
        .await
    }

    /// Submit a confirmation code. Same claim/drop semantics as `login`.
    pub async fn confirm(self: Arc<Self>, code: &str) -> SessionStatus {
        self.begin(Operation::Confirm {
            code: code.to_owned(),
        })
        .await
    }

    /// Send a message to a recipient. Same claim/drop semantics as `login`.
    pub async fn send(self: Arc<Self>, recipient: &str, message: &str) -> SessionStatus {
        self.begin(Operation::Send {
            recipient: recipient.to_owned(),
            message: message.to_owned(),
        })
        .await
    }

    /// Mark the session as evicted and release the driver if no worker owns
    /// it. Called by the registry exactly once per eviction; an in-flight
    /// worker holds the driver lock and will release the driver itself once
    /// it observes the retired flag.
    pub(crate) async fn retire(&self) {
        self.retired.store(true, Ordering::SeqCst);
        if let Ok(mut slot) = self.driver.try_lock() {
            if let Some(driver) = slot.take() {
                driver.release().await;
            }
        }
    }

    /// Claim the InProgress state and hand the step to a worker.
    async fn begin(self: Arc<Self>, operation: Operation) -> SessionStatus {
        {
            let mut state = self.state.lock().await;
            if *state == SessionState::InProgress {
                tracing::debug!(token = %self.token, operation = operation.name(),
                    "dropping call, a step is already in flight");
                return state.as_status();
            }
            if self.retired.load(Ordering::SeqCst) {
                tracing::debug!(token = %self.token, operation = operation.name(),
                    "dropping call, session already evicted");
                return state.as_status();
            }
            *state = SessionState::InProgress;
        }

        tracing::info!(token = %self.token, operation = operation.name(), "automation step started");
        let session = Arc::clone(&self);
        tokio::spawn(async move { session.run(operation).await });
        SessionStatus::InProgress
    }

    /// Worker body: run the step, then record the terminal state. If the
    /// session was evicted underneath us the result is discarded and the
    /// driver torn down here instead.
    async fn run(&self, operation: Operation) {
        let name = operation.name();
        let terminal = match self.execute(operation).await {
            Ok(StepOutcome::Completed) => SessionState::Completed,
            Ok(StepOutcome::ConfirmationRequired) => SessionState::AwaitingConfirmation,
            Ok(StepOutcome::Failed) => SessionState::Failed,
            Err(e) => {
                tracing::warn!(token = %self.token, operation = name, error = %e,
                    "automation step errored");
                SessionState::Failed
            }
        };

        if self.retired.load(Ordering::SeqCst) {
            let mut slot = self.driver.lock().await;
            if let Some(driver) = slot.take() {
                driver.release().await;
            }
            tracing::debug!(token = %self.token, operation = name,
                "discarding result for evicted session");
            return;
        }

        *self.state.lock().await = terminal;
        tracing::info!(token = %self.token, operation = name, state = ?terminal,
            "automation step settled");
    }

    /// Run one step against the driver, bounded by the per-operation timeout
    /// and insulated against panics so a crash can never leave the session
    /// stuck InProgress.
    async fn execute(&self, operation: Operation) -> Result<StepOutcome> {
        let mut slot = self.driver.lock().await;
        if self.retired.load(Ordering::SeqCst) {
            return Err(Error::session("session evicted before the step started"));
        }
        if slot.is_none() {
            *slot = Some(self.factory.create().await?);
        }
        let driver = slot
            .as_deref()
            .ok_or_else(|| Error::internal("driver slot empty after creation"))?;

        let step = async {
            match &operation {
                Operation::Login { username, password } => {
                    driver.attempt_login(username, password).await
                }
                Operation::Confirm { code } => driver.attempt_confirmation(code).await,
                Operation::Send { recipient, message } => {
                    driver.attempt_send(recipient, message).await
                }
            }
        };

        match AssertUnwindSafe(tokio::time::timeout(self.operation_timeout, step))
            .catch_unwind()
            .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::session(format!(
                "automation step exceeded {}s",
                self.operation_timeout.as_secs()
            ))),
            Err(_) => Err(Error::internal("automation step panicked")),
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::Result;
    use crate::session::driver::{AutomationDriver, DriverFactory, StepOutcome};

    /// Call and lifecycle counters shared with the test body
    #[derive(Default)]
    pub(crate) struct MockCounters {
        pub login: AtomicUsize,
        pub confirm: AtomicUsize,
        pub send: AtomicUsize,
        pub creates: AtomicUsize,
        pub releases: AtomicUsize,
    }

    impl MockCounters {
        pub fn count(&self, counter: &AtomicUsize) -> usize {
            counter.load(Ordering::SeqCst)
        }
    }

    struct MockDriver {
        login_outcome: StepOutcome,
        confirm_outcome: StepOutcome,
        send_outcome: StepOutcome,
        delay: Duration,
        panic_on_login: bool,
        counters: Arc<MockCounters>,
    }

    #[async_trait]
    impl AutomationDriver for MockDriver {
        async fn attempt_login(&self, _username: &str, _password: &str) -> Result<StepOutcome> {
            self.counters.login.fetch_add(1, Ordering::SeqCst);
            if self.panic_on_login {
                panic!("mock driver crash");
            }
            tokio::time::sleep(self.delay).await;
            Ok(self.login_outcome)
        }

        async fn attempt_confirmation(&self, _code: &str) -> Result<StepOutcome> {
            self.counters.confirm.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(self.confirm_outcome)
        }

        async fn attempt_send(&self, _recipient: &str, _message: &str) -> Result<StepOutcome> {
            self.counters.send.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(self.send_outcome)
        }

        async fn release(&self) {
            self.counters.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Factory producing scripted drivers for tests
    pub(crate) struct MockFactory {
        pub login_outcome: StepOutcome,
        pub confirm_outcome: StepOutcome,
        pub send_outcome: StepOutcome,
        pub delay: Duration,
        pub fail_create: bool,
        pub panic_on_login: bool,
        pub counters: Arc<MockCounters>,
    }

    impl Default for MockFactory {
        fn default() -> Self {
            Self {
                login_outcome: StepOutcome::Completed,
                confirm_outcome: StepOutcome::Completed,
                send_outcome: StepOutcome::Completed,
                delay: Duration::ZERO,
                fail_create: false,
                panic_on_login: false,
                counters: Arc::new(MockCounters::default()),
            }
        }
    }

    #[async_trait]
    impl DriverFactory for MockFactory {
        async fn create(&self) -> Result<Box<dyn AutomationDriver>> {
            self.counters.creates.fetch_add(1, Ordering::SeqCst);
            if self.fail_create {
                return Err(crate::Error::driver("mock driver refused to start"));
            }
            Ok(Box::new(MockDriver {
                login_outcome: self.login_outcome,
                confirm_outcome: self.confirm_outcome,
                send_outcome: self.send_outcome,
                delay: self.delay,
                panic_on_login: self.panic_on_login,
                counters: Arc::clone(&self.counters),
            }))
        }
    }
}
