use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use cares_core::admin::AdminGate;
use cares_core::config::CaresConfig;
use cares_core::notify::{self, Notifier};
use cares_core::{CaresResult, EventStore, Session};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Sessions untouched for this long are dropped on the next login
const SESSION_IDLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct SessionEntry {
    session: Session,
    last_seen: Instant,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    // Events are re-read on each request to pick up edits made by the CLI
    pub store: EventStore,
    pub admin: AdminGate,
    pub notifier: Arc<dyn Notifier>,
    pub notify_timeout: Duration,
    session_ttl: Duration,
    // Only logged-in visitors have an entry
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
}

impl AppState {
    pub fn new(
        store: EventStore,
        admin: AdminGate,
        notifier: Arc<dyn Notifier>,
        notify_timeout: Duration,
    ) -> Self {
        AppState {
            store,
            admin,
            notifier,
            notify_timeout,
            session_ttl: SESSION_IDLE_TTL,
            sessions: Arc::default(),
        }
    }

    pub fn from_config(config: &CaresConfig) -> Result<Self> {
        Ok(Self::new(
            EventStore::from_config(config),
            AdminGate::new(config.admin_password.clone()),
            notify::from_config(config)?,
            config.notify_timeout(),
        ))
    }

    #[cfg(test)]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Snapshot of a session. Visitors who never logged in get an empty
    /// session that is not stored.
    pub async fn session(&self, id: Uuid) -> Session {
        self.update_session(id, |session| session.clone())
            .await
            .unwrap_or_default()
    }

    /// Log the visitor in, creating their session. Idle sessions are
    /// evicted first.
    pub async fn login(&self, id: Uuid, name: &str, email: &str) -> CaresResult<Session> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        let ttl = self.session_ttl;
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < ttl);

        let mut session = sessions
            .get(&id)
            .map(|entry| entry.session.clone())
            .unwrap_or_default();
        session.login(name, email)?;

        sessions.insert(
            id,
            SessionEntry {
                session: session.clone(),
                last_seen: now,
            },
        );
        Ok(session)
    }

    /// Mutate an existing session. Returns None if the visitor has none.
    pub async fn update_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(f(&mut entry.session))
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
