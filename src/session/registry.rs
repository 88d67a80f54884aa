//! # Session Registry
//!
//! The single authoritative map from session token to live session. All
//! request handling goes through here: sessions are created on demand,
//! looked up (which renews their expiry) and periodically evicted by the
//! sweep once their expiry has passed.
//!
//! ## Concurrency
//!
//! The map is guarded by an async `RwLock`; every critical section is a map
//! mutation only and never waits on automation I/O. Creation is atomic: two
//! concurrent `get_or_create` calls with the same never-before-seen token
//! observe exactly one session. Eviction happens in three bounded phases:
//! scan under a read lock, re-check and remove under a write lock (so a
//! racing keep-alive wins), then retire the evicted sessions outside any map
//! lock.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Settings;
use crate::session::driver::DriverFactory;
use crate::session::session::Session;
use crate::session::webdriver::WebDriverFactory;
use crate::types::SessionStatus;

/// Registry of live automation sessions keyed by token.
pub struct SessionRegistry {
    settings: Arc<Settings>,
    factory: Arc<dyn DriverFactory>,
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
}

impl SessionRegistry {
    /// Create a registry backed by the WebDriver endpoint from `settings`.
    pub fn new(settings: Settings) -> Self {
        let factory = Arc::new(WebDriverFactory::new(settings.webdriver.clone()));
        Self::new_with_factory(settings, factory)
    }

    /// Create a registry with a custom driver factory.
    pub fn new_with_factory(settings: Settings, factory: Arc<dyn DriverFactory>) -> Self {
        Self {
            settings: Arc::new(settings),
            factory,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Return the live session for `token`, creating it if none exists.
    /// Refreshes the session's expiry either way.
    pub async fn get_or_create(&self, token: Uuid) -> Arc<Session> {
        if let Some(session) = self.sessions.read().await.get(&token).cloned() {
            session.keep_alive().await;
            return session;
        }

        let session = {
            let mut sessions = self.sessions.write().await;
            sessions
                .entry(token)
                .or_insert_with(|| {
                    tracing::info!(%token, "creating session");
                    Arc::new(Session::new(
                        token,
                        Arc::clone(&self.factory),
                        self.settings.session_ttl(),
                        self.settings.operation_timeout(),
                    ))
                })
                .clone()
        };
        session.keep_alive().await;
        session
    }

    /// Return the live session for `token` without creating one, refreshing
    /// its expiry when found. `None` means NotFound.
    pub async fn get(&self, token: Uuid) -> Option<Arc<Session>> {
        let session = self.sessions.read().await.get(&token).cloned()?;
        session.keep_alive().await;
        Some(session)
    }

    /// Refresh the expiry for an existing session. Returns whether one
    /// existed. No state-machine transition.
    pub async fn keep_alive(&self, token: Uuid) -> bool {
        self.get(token).await.is_some()
    }

    /// Current wire status for `token`.
    pub async fn status(&self, token: Uuid) -> SessionStatus {
        match self.get(token).await {
            Some(session) => session.status().await,
            None => SessionStatus::NotFound,
        }
    }

    /// Remove every session whose expiry has passed and release its driver.
    /// Returns the number of evicted sessions. Safe to call concurrently
    /// with any other registry operation; a session with a step still in
    /// flight is torn down too, and the worker's late result is discarded.
    pub async fn sweep_expired(&self) -> usize {
        let now = Utc::now();

        let mut doomed = Vec::new();
        {
            let sessions = self.sessions.read().await;
            for (token, session) in sessions.iter() {
                if session.expires_at().await <= now {
                    doomed.push(*token);
                }
            }
        }
        if doomed.is_empty() {
            return 0;
        }

        let mut evicted = Vec::new();
        {
            let mut sessions = self.sessions.write().await;
            for token in doomed {
                let Some(session) = sessions.get(&token).cloned() else {
                    continue;
                };
                // re-check under the write lock: a keep-alive may have raced
                // the scan
                if session.expires_at().await <= now {
                    sessions.remove(&token);
                    evicted.push(session);
                }
            }
        }

        for session in &evicted {
            tracing::info!(token = %session.token(), "evicting expired session");
            session.retire().await;
        }
        evicted.len()
    }

    /// Tear down every session. Used on server shutdown.
    pub async fn shutdown(&self) {
        let sessions: Vec<_> = {
            let mut map = self.sessions.write().await;
            map.drain().map(|(_, session)| session).collect()
        };
        for session in &sessions {
            session.retire().await;
        }
        if !sessions.is_empty() {
            tracing::info!(count = sessions.len(), "released all sessions on shutdown");
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are live.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
